//! [`SqliteStore`] — the SQLite implementation of [`MetricStore`] and
//! [`InsightSource`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use marq_core::{
  account::Account,
  goal::{Goal, NewGoal},
  metric::{Metric, MonthlyMetrics, MonthlyValues},
  range::{DateRange, ensure_month_start, month_start},
  source::{InsightRow, InsightSource},
  store::MetricStore,
};

use crate::{
  Error, Result,
  encode::{
    RawAccount, RawGoal, RawMonthly, encode_date, encode_dt, encode_metric,
    encode_period, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Marq metrics store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Point read of one account by an arbitrary column predicate.
  async fn account_where(
    &self,
    condition: &'static str,
    param: String,
  ) -> Result<Option<Account>> {
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT account_id, name, platform_ref, share_token, created_at
           FROM accounts WHERE {condition} = ?1"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![param], |row| {
              Ok(RawAccount {
                account_id:   row.get(0)?,
                name:         row.get(1)?,
                platform_ref: row.get(2)?,
                share_token:  row.get(3)?,
                created_at:   row.get(4)?,
              })
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn goal_by_id(&self, id: Uuid) -> Result<Option<Goal>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawGoal> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT goal_id, account_id, metric, target, period, start_date,
                      archived, completed_at, final_value, created_at
               FROM goals WHERE goal_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawGoal {
                  goal_id:      row.get(0)?,
                  account_id:   row.get(1)?,
                  metric:       row.get(2)?,
                  target:       row.get(3)?,
                  period:       row.get(4)?,
                  start_date:   row.get(5)?,
                  archived:     row.get(6)?,
                  completed_at: row.get(7)?,
                  final_value:  row.get(8)?,
                  created_at:   row.get(9)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawGoal::into_goal).transpose()
  }
}

// ─── MetricStore impl ────────────────────────────────────────────────────────

impl MetricStore for SqliteStore {
  type Error = Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn add_account(
    &self,
    name: String,
    platform_ref: Option<String>,
  ) -> Result<Account> {
    let account = Account {
      account_id: Uuid::new_v4(),
      name,
      platform_ref,
      share_token: new_share_token(),
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(account.account_id);
    let at_str = encode_dt(account.created_at);
    let name_str = account.name.clone();
    let platform = account.platform_ref.clone();
    let token = account.share_token.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO accounts (account_id, name, platform_ref, share_token, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name_str, platform, token, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(account)
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
    self.account_where("account_id", encode_uuid(id)).await
  }

  async fn list_accounts(&self) -> Result<Vec<Account>> {
    let raws: Vec<RawAccount> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT account_id, name, platform_ref, share_token, created_at
           FROM accounts ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawAccount {
              account_id:   row.get(0)?,
              name:         row.get(1)?,
              platform_ref: row.get(2)?,
              share_token:  row.get(3)?,
              created_at:   row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAccount::into_account).collect()
  }

  async fn account_by_share_token(&self, token: &str) -> Result<Option<Account>> {
    self.account_where("share_token", token.to_owned()).await
  }

  async fn rotate_share_token(&self, id: Uuid) -> Result<Account> {
    let id_str = encode_uuid(id);
    let token = new_share_token();

    let updated: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE accounts SET share_token = ?1 WHERE account_id = ?2",
          rusqlite::params![token, id_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::AccountNotFound(id));
    }
    self
      .get_account(id)
      .await?
      .ok_or(Error::AccountNotFound(id))
  }

  // ── Monthly manual metrics ────────────────────────────────────────────────

  async fn upsert_monthly(
    &self,
    account_id: Uuid,
    month: NaiveDate,
    values: MonthlyValues,
  ) -> Result<MonthlyMetrics> {
    ensure_month_start(month).map_err(Error::Core)?;

    let row = MonthlyMetrics {
      account_id,
      month,
      new_followers: values.new_followers,
      appointments_scheduled: values.appointments_scheduled,
      appointments_showed: values.appointments_showed,
      updated_at: Utc::now(),
    };

    let id_str = encode_uuid(account_id);
    let month_str = encode_date(month);
    let at_str = encode_dt(row.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO monthly_metrics (
             account_id, month, new_followers, appointments_scheduled,
             appointments_showed, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (account_id, month) DO UPDATE SET
             new_followers          = excluded.new_followers,
             appointments_scheduled = excluded.appointments_scheduled,
             appointments_showed    = excluded.appointments_showed,
             updated_at             = excluded.updated_at",
          rusqlite::params![
            id_str,
            month_str,
            values.new_followers,
            values.appointments_scheduled,
            values.appointments_showed,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(row)
  }

  async fn monthly_in_range(
    &self,
    account_id: Uuid,
    range: DateRange,
  ) -> Result<Vec<MonthlyMetrics>> {
    let id_str = encode_uuid(account_id);
    // A month overlaps the range iff its first day lies between the first
    // day of the range's start month and the range's end (ISO strings
    // compare correctly as TEXT).
    let lo = encode_date(month_start(range.since()));
    let hi = encode_date(range.until());

    let raws: Vec<RawMonthly> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT account_id, month, new_followers, appointments_scheduled,
                  appointments_showed, updated_at
           FROM monthly_metrics
           WHERE account_id = ?1 AND month >= ?2 AND month <= ?3
           ORDER BY month",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, lo, hi], |row| {
            Ok(RawMonthly {
              account_id:             row.get(0)?,
              month:                  row.get(1)?,
              new_followers:          row.get(2)?,
              appointments_scheduled: row.get(3)?,
              appointments_showed:    row.get(4)?,
              updated_at:             row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMonthly::into_monthly).collect()
  }

  // ── Insights cache ────────────────────────────────────────────────────────

  async fn record_insights(
    &self,
    account_id: Uuid,
    rows: Vec<InsightRow>,
  ) -> Result<()> {
    let id_str = encode_uuid(account_id);
    let fetched_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO insights (account_id, metric, day, value, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (account_id, metric, day) DO UPDATE SET
               value      = excluded.value,
               fetched_at = excluded.fetched_at",
          )?;
          for row in &rows {
            stmt.execute(rusqlite::params![
              id_str,
              encode_metric(row.metric),
              encode_date(row.day),
              row.value,
              fetched_str,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Goals ─────────────────────────────────────────────────────────────────

  async fn add_goal(&self, input: NewGoal) -> Result<Goal> {
    let goal = Goal {
      goal_id:      Uuid::new_v4(),
      account_id:   input.account_id,
      metric:       input.metric,
      target:       input.target,
      period:       input.period,
      start_date:   input.start_date,
      archived:     false,
      completed_at: None,
      final_value:  None,
      created_at:   Utc::now(),
    };

    let goal_id_str = encode_uuid(goal.goal_id);
    let account_id_str = encode_uuid(goal.account_id);
    let metric_str = encode_metric(goal.metric);
    let period_str = encode_period(goal.period);
    let start_str = goal.start_date.map(encode_date);
    let at_str = encode_dt(goal.created_at);
    let target = goal.target;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO goals (
             goal_id, account_id, metric, target, period, start_date,
             archived, completed_at, final_value, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, NULL, NULL, ?7)",
          rusqlite::params![
            goal_id_str,
            account_id_str,
            metric_str,
            target,
            period_str,
            start_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(goal)
  }

  async fn get_goal(&self, id: Uuid) -> Result<Option<Goal>> {
    self.goal_by_id(id).await
  }

  async fn list_goals(
    &self,
    account_id: Uuid,
    include_archived: bool,
  ) -> Result<Vec<Goal>> {
    let id_str = encode_uuid(account_id);

    let raws: Vec<RawGoal> = self
      .conn
      .call(move |conn| {
        let sql = if include_archived {
          "SELECT goal_id, account_id, metric, target, period, start_date,
                  archived, completed_at, final_value, created_at
           FROM goals WHERE account_id = ?1 ORDER BY created_at"
        } else {
          "SELECT goal_id, account_id, metric, target, period, start_date,
                  archived, completed_at, final_value, created_at
           FROM goals WHERE account_id = ?1 AND archived = 0
           ORDER BY created_at"
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawGoal {
              goal_id:      row.get(0)?,
              account_id:   row.get(1)?,
              metric:       row.get(2)?,
              target:       row.get(3)?,
              period:       row.get(4)?,
              start_date:   row.get(5)?,
              archived:     row.get(6)?,
              completed_at: row.get(7)?,
              final_value:  row.get(8)?,
              created_at:   row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGoal::into_goal).collect()
  }

  async fn archive_goal(&self, id: Uuid) -> Result<Goal> {
    let id_str = encode_uuid(id);

    let updated: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE goals SET archived = 1 WHERE goal_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::GoalNotFound(id));
    }
    self.goal_by_id(id).await?.ok_or(Error::GoalNotFound(id))
  }

  async fn complete_goal(
    &self,
    id: Uuid,
    at: NaiveDate,
    final_value: f64,
  ) -> Result<Goal> {
    let id_str = encode_uuid(id);
    let at_str = encode_date(at);

    // The IS NULL guard makes the transition one-way and the call
    // idempotent: re-detecting the same crossing is a no-op.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE goals SET completed_at = ?1, final_value = ?2
           WHERE goal_id = ?3 AND completed_at IS NULL",
          rusqlite::params![at_str, final_value, id_str],
        )?;
        Ok(())
      })
      .await?;

    self.goal_by_id(id).await?.ok_or(Error::GoalNotFound(id))
  }
}

// ─── InsightSource impl ──────────────────────────────────────────────────────

impl InsightSource for SqliteStore {
  type Error = Error;

  async fn period_sum(
    &self,
    account_id: Uuid,
    metric: Metric,
    range: DateRange,
  ) -> Result<f64> {
    let id_str = encode_uuid(account_id);
    let metric_str = encode_metric(metric);
    let lo = encode_date(range.since());
    let hi = encode_date(range.until());

    let sum: f64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(SUM(value), 0)
           FROM insights
           WHERE account_id = ?1 AND metric = ?2 AND day >= ?3 AND day <= ?4",
          rusqlite::params![id_str, metric_str, lo, hi],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(sum)
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Opaque capability token for the public share view. Not a credential;
/// rotation is the revocation mechanism.
fn new_share_token() -> String { Uuid::new_v4().simple().to_string() }
