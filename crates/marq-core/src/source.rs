//! The injected external metric source.
//!
//! Insight metrics (impressions, reach, profile views, …) come from a cached
//! copy of ad-platform data, not from operator entry. The source is injected
//! behind a trait so the computation layer never touches the platform client
//! or the database directly.

use std::future::Future;

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{metric::Metric, range::DateRange};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A period-bounded sum provider for insight metrics.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait InsightSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Sum of the cached per-day values for `metric` over `range`, inclusive
  /// on both ends. An account or period with no cached data sums to zero.
  fn period_sum(
    &self,
    account_id: Uuid,
    metric: Metric,
    range: DateRange,
  ) -> impl Future<Output = Result<f64, Self::Error>> + Send + '_;
}

/// Sum over `range`, degrading to zero when the source is unavailable.
///
/// Source failures are logged and swallowed here so a platform outage never
/// aborts an aggregation — manual metrics must still flow through.
pub async fn period_sum_or_zero<S: InsightSource>(
  source: &S,
  account_id: Uuid,
  metric: Metric,
  range: DateRange,
) -> f64 {
  match source.period_sum(account_id, metric, range).await {
    Ok(sum) => sum,
    Err(error) => {
      tracing::warn!(
        %account_id,
        %metric,
        %error,
        "insight source unavailable; counting 0 for this period"
      );
      0.0
    }
  }
}

// ─── Cached rows ─────────────────────────────────────────────────────────────

/// One cached per-day insight value, as written by the platform sync job.
/// Input to [`crate::store::MetricStore::record_insights`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InsightRow {
  pub metric: Metric,
  pub day:    NaiveDate,
  pub value:  f64,
}
