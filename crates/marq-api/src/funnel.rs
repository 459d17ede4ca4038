//! Handler for `/accounts/:id/funnel` — the aggregated funnel view.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::NaiveDate;
use marq_core::{
  funnel::{FunnelSnapshot, funnel_snapshot},
  range::DateRange,
  source::InsightSource,
  store::MetricStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// Query parameters shared by every range-bounded endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RangeParams {
  pub since: NaiveDate,
  pub until: NaiveDate,
}

impl RangeParams {
  /// Validate into a [`DateRange`]; reversed endpoints are a 400.
  pub fn into_range(self) -> Result<DateRange, ApiError> {
    DateRange::new(self.since, self.until)
      .map_err(|e| ApiError::BadRequest(e.to_string()))
  }
}

/// `GET /accounts/:id/funnel?since=YYYY-MM-DD&until=YYYY-MM-DD`
///
/// Always answers for an existing account: insight outages degrade the
/// sourced stages to zero and missing manual entries render as `null`.
pub async fn snapshot<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<RangeParams>,
) -> Result<Json<FunnelSnapshot>, ApiError>
where
  S: MetricStore + InsightSource,
{
  store
    .get_account(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("account {id} not found")))?;

  let snap = snapshot_for(&*store, id, params.into_range()?).await?;
  Ok(Json(snap))
}

/// Fetch the monthly rows for `range` and assemble the funnel. Shared with
/// the public share-view handler.
pub(crate) async fn snapshot_for<S>(
  store: &S,
  account_id: Uuid,
  range: DateRange,
) -> Result<FunnelSnapshot, ApiError>
where
  S: MetricStore + InsightSource,
{
  let records = store
    .monthly_in_range(account_id, range)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(funnel_snapshot(account_id, range, &records, store).await)
}
