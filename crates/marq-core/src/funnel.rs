//! The aggregated funnel snapshot served to dashboards and share views.
//!
//! The top of the funnel (impressions, reach, profile views) comes from the
//! cached insight source; the tail (followers, scheduled, showed) comes from
//! the proportional manual aggregation. The null discipline holds through to
//! the output: an insight outage renders as zero, a missing manual entry as
//! `null`.

use serde::Serialize;
use uuid::Uuid;

use crate::{
  aggregate::aggregate_manual,
  metric::{Metric, MonthlyMetrics},
  range::DateRange,
  source::{InsightSource, period_sum_or_zero},
};

/// One funnel view over a date range, ordered top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FunnelSnapshot {
  pub range:                  DateRange,
  pub impressions:            i64,
  pub reach:                  i64,
  pub profile_views:          i64,
  pub new_followers:          Option<i64>,
  pub appointments_scheduled: Option<i64>,
  pub appointments_showed:    Option<i64>,
}

/// Assemble the funnel for `account_id` over `range`.
///
/// Partial by design: if some insight metrics are unavailable they count as
/// zero (logged), and the manual stages are still returned.
pub async fn funnel_snapshot<S: InsightSource>(
  account_id: Uuid,
  range: DateRange,
  records: &[MonthlyMetrics],
  source: &S,
) -> FunnelSnapshot {
  let sourced = |metric| period_sum_or_zero(source, account_id, metric, range);

  let impressions = sourced(Metric::Impressions).await.round() as i64;
  let reach = sourced(Metric::Reach).await.round() as i64;
  let profile_views = sourced(Metric::ProfileViews).await.round() as i64;

  let manual = aggregate_manual(range, records);

  FunnelSnapshot {
    range,
    impressions,
    reach,
    profile_views,
    new_followers: manual.new_followers,
    appointments_scheduled: manual.appointments_scheduled,
    appointments_showed: manual.appointments_showed,
  }
}

#[cfg(test)]
mod tests {
  use std::convert::Infallible;

  use chrono::{NaiveDate, Utc};

  use super::*;

  struct FixedSource(f64);

  impl InsightSource for FixedSource {
    type Error = Infallible;

    async fn period_sum(
      &self,
      _account_id: Uuid,
      _metric: Metric,
      _range: DateRange,
    ) -> Result<f64, Infallible> {
      Ok(self.0)
    }
  }

  struct DownSource;

  impl InsightSource for DownSource {
    type Error = std::io::Error;

    async fn period_sum(
      &self,
      _account_id: Uuid,
      _metric: Metric,
      _range: DateRange,
    ) -> Result<f64, std::io::Error> {
      Err(std::io::Error::other("platform unreachable"))
    }
  }

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  #[tokio::test]
  async fn snapshot_combines_sourced_and_manual_stages() {
    let account = Uuid::new_v4();
    let range = DateRange::new(d(2025, 12, 1), d(2025, 12, 31)).unwrap();
    let records = [MonthlyMetrics {
      account_id:             account,
      month:                  d(2025, 12, 1),
      new_followers:          Some(62.0),
      appointments_scheduled: None,
      appointments_showed:    Some(4.0),
      updated_at:             Utc::now(),
    }];

    let snap = funnel_snapshot(account, range, &records, &FixedSource(100.0)).await;

    assert_eq!(snap.impressions, 100);
    assert_eq!(snap.reach, 100);
    assert_eq!(snap.new_followers, Some(62));
    assert_eq!(snap.appointments_scheduled, None);
    assert_eq!(snap.appointments_showed, Some(4));
  }

  #[tokio::test]
  async fn source_outage_yields_partial_snapshot() {
    let account = Uuid::new_v4();
    let range = DateRange::new(d(2025, 12, 1), d(2025, 12, 31)).unwrap();
    let records = [MonthlyMetrics {
      account_id:             account,
      month:                  d(2025, 12, 1),
      new_followers:          Some(62.0),
      appointments_scheduled: None,
      appointments_showed:    None,
      updated_at:             Utc::now(),
    }];

    let snap = funnel_snapshot(account, range, &records, &DownSource).await;

    // Sourced stages degrade to zero, manual stages still flow through.
    assert_eq!(snap.impressions, 0);
    assert_eq!(snap.new_followers, Some(62));
    assert_eq!(snap.appointments_scheduled, None);
  }
}
