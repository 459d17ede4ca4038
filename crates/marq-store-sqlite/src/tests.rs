//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use marq_core::{
  goal::{GoalPeriod, NewGoal},
  metric::{Metric, MonthlyValues},
  range::DateRange,
  source::{InsightRow, InsightSource},
  store::MetricStore,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

async fn account(s: &SqliteStore) -> Uuid {
  s.add_account("Acme Dental".into(), Some("act_1234".into()))
    .await
    .unwrap()
    .account_id
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_account() {
  let s = store().await;

  let created = s
    .add_account("Acme Dental".into(), Some("act_1234".into()))
    .await
    .unwrap();
  assert_eq!(created.name, "Acme Dental");
  assert!(!created.share_token.is_empty());

  let fetched = s.get_account(created.account_id).await.unwrap();
  assert_eq!(fetched, Some(created));
}

#[tokio::test]
async fn get_account_missing_returns_none() {
  let s = store().await;
  let result = s.get_account(Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn list_accounts_returns_all() {
  let s = store().await;
  s.add_account("A".into(), None).await.unwrap();
  s.add_account("B".into(), None).await.unwrap();

  let all = s.list_accounts().await.unwrap();
  assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn share_token_resolves_and_rotates() {
  let s = store().await;
  let created = s.add_account("Acme".into(), None).await.unwrap();

  let resolved = s
    .account_by_share_token(&created.share_token)
    .await
    .unwrap();
  assert_eq!(resolved.as_ref().map(|a| a.account_id), Some(created.account_id));

  let rotated = s.rotate_share_token(created.account_id).await.unwrap();
  assert_ne!(rotated.share_token, created.share_token);

  // The old token no longer resolves.
  let stale = s
    .account_by_share_token(&created.share_token)
    .await
    .unwrap();
  assert!(stale.is_none());
}

#[tokio::test]
async fn rotate_share_token_missing_account_errors() {
  let s = store().await;
  let err = s.rotate_share_token(Uuid::new_v4()).await;
  assert!(matches!(err, Err(Error::AccountNotFound(_))));
}

// ─── Monthly metrics ─────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_monthly_inserts_then_overwrites() {
  let s = store().await;
  let account_id = account(&s).await;
  let month = d(2025, 1, 1);

  s.upsert_monthly(account_id, month, MonthlyValues {
    new_followers: Some(30.0),
    ..Default::default()
  })
  .await
  .unwrap();

  // Second upsert replaces the row wholesale, including clearing a field.
  let updated = s
    .upsert_monthly(account_id, month, MonthlyValues {
      new_followers: None,
      appointments_scheduled: Some(5.0),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.new_followers, None);

  let range = DateRange::new(d(2025, 1, 1), d(2025, 1, 31)).unwrap();
  let rows = s.monthly_in_range(account_id, range).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].new_followers, None);
  assert_eq!(rows[0].appointments_scheduled, Some(5.0));
}

#[tokio::test]
async fn upsert_monthly_rejects_mid_month_dates() {
  let s = store().await;
  let account_id = account(&s).await;

  let err = s
    .upsert_monthly(account_id, d(2025, 1, 15), MonthlyValues::default())
    .await;
  assert!(matches!(err, Err(Error::Core(_))));
}

#[tokio::test]
async fn monthly_in_range_includes_partially_covered_months() {
  let s = store().await;
  let account_id = account(&s).await;

  for (month, followers) in [
    (d(2025, 10, 1), 10.0),
    (d(2025, 11, 1), 30.0),
    (d(2025, 12, 1), 62.0),
    (d(2026, 1, 1), 99.0),
  ] {
    s.upsert_monthly(account_id, month, MonthlyValues {
      new_followers: Some(followers),
      ..Default::default()
    })
    .await
    .unwrap();
  }

  // Nov 20 – Dec 10 touches November and December only.
  let range = DateRange::new(d(2025, 11, 20), d(2025, 12, 10)).unwrap();
  let rows = s.monthly_in_range(account_id, range).await.unwrap();
  let months: Vec<_> = rows.iter().map(|r| r.month).collect();
  assert_eq!(months, vec![d(2025, 11, 1), d(2025, 12, 1)]);
}

#[tokio::test]
async fn monthly_in_range_is_scoped_to_the_account() {
  let s = store().await;
  let first = account(&s).await;
  let second = account(&s).await;

  s.upsert_monthly(first, d(2025, 1, 1), MonthlyValues {
    new_followers: Some(1.0),
    ..Default::default()
  })
  .await
  .unwrap();

  let range = DateRange::new(d(2025, 1, 1), d(2025, 1, 31)).unwrap();
  assert!(s.monthly_in_range(second, range).await.unwrap().is_empty());
}

// ─── Insights cache ──────────────────────────────────────────────────────────

#[tokio::test]
async fn period_sum_over_recorded_days() {
  let s = store().await;
  let account_id = account(&s).await;

  s.record_insights(account_id, vec![
    InsightRow { metric: Metric::Impressions, day: d(2025, 3, 1), value: 100.0 },
    InsightRow { metric: Metric::Impressions, day: d(2025, 3, 2), value: 50.0 },
    // Outside the queried range.
    InsightRow { metric: Metric::Impressions, day: d(2025, 3, 9), value: 999.0 },
    // Different metric, same days.
    InsightRow { metric: Metric::Reach, day: d(2025, 3, 1), value: 7.0 },
  ])
  .await
  .unwrap();

  let range = DateRange::new(d(2025, 3, 1), d(2025, 3, 5)).unwrap();
  let sum = s
    .period_sum(account_id, Metric::Impressions, range)
    .await
    .unwrap();
  assert_eq!(sum, 150.0);
}

#[tokio::test]
async fn period_sum_with_no_data_is_zero() {
  let s = store().await;
  let account_id = account(&s).await;

  let range = DateRange::new(d(2025, 3, 1), d(2025, 3, 31)).unwrap();
  let sum = s.period_sum(account_id, Metric::Spend, range).await.unwrap();
  assert_eq!(sum, 0.0);
}

#[tokio::test]
async fn re_syncing_a_day_overwrites_it() {
  let s = store().await;
  let account_id = account(&s).await;
  let day = d(2025, 3, 1);

  s.record_insights(account_id, vec![InsightRow {
    metric: Metric::Reach,
    day,
    value: 10.0,
  }])
  .await
  .unwrap();
  s.record_insights(account_id, vec![InsightRow {
    metric: Metric::Reach,
    day,
    value: 12.0,
  }])
  .await
  .unwrap();

  let range = DateRange::new(day, day).unwrap();
  let sum = s.period_sum(account_id, Metric::Reach, range).await.unwrap();
  assert_eq!(sum, 12.0);
}

// ─── Goals ───────────────────────────────────────────────────────────────────

fn new_goal(account_id: Uuid, target: f64) -> NewGoal {
  NewGoal {
    account_id,
    metric: Metric::AppointmentsScheduled,
    target,
    period: GoalPeriod::Total,
    start_date: Some(d(2025, 1, 1)),
  }
}

#[tokio::test]
async fn add_and_get_goal() {
  let s = store().await;
  let account_id = account(&s).await;

  let created = s.add_goal(new_goal(account_id, 10.0)).await.unwrap();
  assert!(!created.archived);
  assert_eq!(created.completed_at, None);

  let fetched = s.get_goal(created.goal_id).await.unwrap();
  assert_eq!(fetched, Some(created));
}

#[tokio::test]
async fn list_goals_hides_archived_by_default() {
  let s = store().await;
  let account_id = account(&s).await;

  let keep = s.add_goal(new_goal(account_id, 10.0)).await.unwrap();
  let hide = s.add_goal(new_goal(account_id, 20.0)).await.unwrap();
  s.archive_goal(hide.goal_id).await.unwrap();

  let visible = s.list_goals(account_id, false).await.unwrap();
  assert_eq!(visible.len(), 1);
  assert_eq!(visible[0].goal_id, keep.goal_id);

  let all = s.list_goals(account_id, true).await.unwrap();
  assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn archive_goal_missing_errors() {
  let s = store().await;
  let err = s.archive_goal(Uuid::new_v4()).await;
  assert!(matches!(err, Err(Error::GoalNotFound(_))));
}

#[tokio::test]
async fn complete_goal_freezes_the_snapshot() {
  let s = store().await;
  let account_id = account(&s).await;
  let goal = s.add_goal(new_goal(account_id, 10.0)).await.unwrap();

  let completed = s
    .complete_goal(goal.goal_id, d(2025, 2, 28), 13.0)
    .await
    .unwrap();
  assert_eq!(completed.completed_at, Some(d(2025, 2, 28)));
  assert_eq!(completed.final_value, Some(13.0));
}

#[tokio::test]
async fn complete_goal_is_idempotent() {
  let s = store().await;
  let account_id = account(&s).await;
  let goal = s.add_goal(new_goal(account_id, 10.0)).await.unwrap();

  s.complete_goal(goal.goal_id, d(2025, 2, 28), 13.0)
    .await
    .unwrap();

  // A second detection with different values must not change the snapshot.
  let second = s
    .complete_goal(goal.goal_id, d(2025, 3, 31), 99.0)
    .await
    .unwrap();
  assert_eq!(second.completed_at, Some(d(2025, 2, 28)));
  assert_eq!(second.final_value, Some(13.0));
}

#[tokio::test]
async fn complete_goal_missing_errors() {
  let s = store().await;
  let err = s.complete_goal(Uuid::new_v4(), d(2025, 2, 28), 1.0).await;
  assert!(matches!(err, Err(Error::GoalNotFound(_))));
}

#[tokio::test]
async fn archive_is_independent_of_completion() {
  let s = store().await;
  let account_id = account(&s).await;
  let goal = s.add_goal(new_goal(account_id, 10.0)).await.unwrap();

  s.complete_goal(goal.goal_id, d(2025, 2, 28), 13.0)
    .await
    .unwrap();
  let archived = s.archive_goal(goal.goal_id).await.unwrap();

  assert!(archived.archived);
  assert_eq!(archived.completed_at, Some(d(2025, 2, 28)));
}
