//! Handler for `/share/:token/funnel` — the public read-only client view.
//!
//! The share token is a bearer capability: whoever holds it can read the
//! funnel for its account, nothing else. An unknown token and a revoked
//! token look identical (404), so the endpoint leaks no account existence
//! information.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use marq_core::{funnel::FunnelSnapshot, source::InsightSource, store::MetricStore};

use crate::{
  error::ApiError,
  funnel::{RangeParams, snapshot_for},
};

/// `GET /share/:token/funnel?since=YYYY-MM-DD&until=YYYY-MM-DD`
pub async fn funnel<S>(
  State(store): State<Arc<S>>,
  Path(token): Path<String>,
  Query(params): Query<RangeParams>,
) -> Result<Json<FunnelSnapshot>, ApiError>
where
  S: MetricStore + InsightSource,
{
  let account = store
    .account_by_share_token(&token)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound("unknown share token".into()))?;

  let snap =
    snapshot_for(&*store, account.account_id, params.into_range()?).await?;
  Ok(Json(snap))
}
