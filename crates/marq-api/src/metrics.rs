//! Handlers for `/accounts/:id/metrics` — the operator-edited monthly rows.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/accounts/:id/metrics?since&until` | Rows for months touching the range |
//! | `PUT` | `/accounts/:id/metrics` | Body: [`MonthBody`]; upserts one month |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::NaiveDate;
use marq_core::{
  metric::{MonthlyMetrics, MonthlyValues},
  range::ensure_month_start,
  store::MetricStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::ApiError, funnel::RangeParams};

/// `GET /accounts/:id/metrics?since=YYYY-MM-DD&until=YYYY-MM-DD`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<MonthlyMetrics>>, ApiError>
where
  S: MetricStore,
{
  let range = params.into_range()?;
  let rows = store
    .monthly_in_range(id, range)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(rows))
}

/// JSON body accepted by `PUT /accounts/:id/metrics`. Replaces the whole
/// month: omitted fields become "no manual entry", not "keep the old value".
#[derive(Debug, Deserialize)]
pub struct MonthBody {
  /// First day of the calendar month being edited.
  pub month:                  NaiveDate,
  pub new_followers:          Option<f64>,
  pub appointments_scheduled: Option<f64>,
  pub appointments_showed:    Option<f64>,
}

/// `PUT /accounts/:id/metrics`
pub async fn upsert<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<MonthBody>,
) -> Result<Json<MonthlyMetrics>, ApiError>
where
  S: MetricStore,
{
  ensure_month_start(body.month)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let values = MonthlyValues {
    new_followers:          body.new_followers,
    appointments_scheduled: body.appointments_scheduled,
    appointments_showed:    body.appointments_showed,
  };
  let row = store
    .upsert_monthly(id, body.month, values)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(row))
}
