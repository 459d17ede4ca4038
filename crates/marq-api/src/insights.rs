//! Handler for `/accounts/:id/insights` — the cached-insight ingest surface
//! used by the platform sync job.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use marq_core::{source::InsightRow, store::MetricStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// JSON body accepted by `PUT /accounts/:id/insights`.
#[derive(Debug, Deserialize)]
pub struct IngestBody {
  pub rows: Vec<InsightRow>,
}

/// `PUT /accounts/:id/insights` — batch-upserts per-day values; re-syncing a
/// day overwrites it. Returns 204.
pub async fn ingest<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<IngestBody>,
) -> Result<StatusCode, ApiError>
where
  S: MetricStore,
{
  store
    .get_account(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("account {id} not found")))?;

  store
    .record_insights(id, body.rows)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(StatusCode::NO_CONTENT)
}
