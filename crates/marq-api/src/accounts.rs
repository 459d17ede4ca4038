//! Handlers for `/accounts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/accounts` | All connected accounts |
//! | `POST` | `/accounts` | Body: [`NewAccountBody`]; returns 201 + account |
//! | `GET`  | `/accounts/:id` | Single account |
//! | `POST` | `/accounts/:id/share-token` | Rotate the public share token |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use marq_core::{account::Account, store::MetricStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List / get ───────────────────────────────────────────────────────────────

/// `GET /accounts`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Account>>, ApiError>
where
  S: MetricStore,
{
  let accounts = store
    .list_accounts()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(accounts))
}

/// `GET /accounts/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Account>, ApiError>
where
  S: MetricStore,
{
  let account = store
    .get_account(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("account {id} not found")))?;
  Ok(Json(account))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /accounts`.
#[derive(Debug, Deserialize)]
pub struct NewAccountBody {
  pub name:         String,
  pub platform_ref: Option<String>,
}

/// `POST /accounts` — returns 201 + the stored [`Account`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewAccountBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MetricStore,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("account name must not be empty".into()));
  }
  let account = store
    .add_account(body.name, body.platform_ref)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(account)))
}

// ─── Share token ──────────────────────────────────────────────────────────────

/// `POST /accounts/:id/share-token` — revokes previously shared links and
/// returns the account with its fresh token.
pub async fn rotate_token<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Account>, ApiError>
where
  S: MetricStore,
{
  store
    .get_account(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("account {id} not found")))?;

  let account = store
    .rotate_share_token(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(account))
}
