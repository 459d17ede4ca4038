//! Handlers for goal endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/accounts/:id/goals` | `?include_archived=true` to show hidden goals |
//! | `POST` | `/accounts/:id/goals` | Body: [`NewGoalBody`]; returns 201 + goal |
//! | `GET`  | `/goals/:id` | Single goal |
//! | `POST` | `/goals/:id/archive` | Soft hide |
//! | `GET`  | `/goals/:id/progress` | Evaluate; persists a newly detected completion |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use marq_core::{
  evaluate::{GoalEvaluation, evaluate_goal, fetch_range},
  goal::{Goal, GoalPeriod, NewGoal},
  metric::Metric,
  source::InsightSource,
  store::MetricStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// If `true`, also return archived goals. Default `false`.
  #[serde(default)]
  pub include_archived: bool,
}

/// `GET /accounts/:id/goals[?include_archived=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Goal>>, ApiError>
where
  S: MetricStore,
{
  let goals = store
    .list_goals(id, params.include_archived)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(goals))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /goals/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Goal>, ApiError>
where
  S: MetricStore,
{
  let goal = fetch_goal(&*store, id).await?;
  Ok(Json(goal))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /accounts/:id/goals`.
#[derive(Debug, Deserialize)]
pub struct NewGoalBody {
  pub metric:     Metric,
  pub target:     f64,
  pub period:     GoalPeriod,
  pub start_date: Option<NaiveDate>,
}

/// `POST /accounts/:id/goals` — returns 201 + the stored [`Goal`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewGoalBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MetricStore,
{
  if !body.target.is_finite() || body.target <= 0.0 {
    return Err(ApiError::BadRequest(
      "goal target must be a positive number".into(),
    ));
  }

  store
    .get_account(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("account {id} not found")))?;

  let goal = store
    .add_goal(NewGoal {
      account_id: id,
      metric:     body.metric,
      target:     body.target,
      period:     body.period,
      start_date: body.start_date,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(goal)))
}

// ─── Archive ──────────────────────────────────────────────────────────────────

/// `POST /goals/:id/archive`
pub async fn archive<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Goal>, ApiError>
where
  S: MetricStore,
{
  fetch_goal(&*store, id).await?;
  let goal = store
    .archive_goal(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(goal))
}

// ─── Progress ─────────────────────────────────────────────────────────────────

/// `GET /goals/:id/progress`
///
/// Evaluates the goal against the pre-fetched monthly rows and the cached
/// insight source. When the evaluation first detects the target being
/// crossed, the frozen snapshot is persisted; a failed write is logged and
/// the computed result is still returned — the goal simply stays open and
/// the next evaluation retries the (idempotent) write.
pub async fn progress<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<GoalEvaluation>, ApiError>
where
  S: MetricStore + InsightSource,
{
  let goal = fetch_goal(&*store, id).await?;
  let today = Utc::now().date_naive();

  let records = store
    .monthly_in_range(goal.account_id, fetch_range(&goal, today))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let evaluation = evaluate_goal(&goal, &records, &*store, today).await;

  if evaluation.newly_completed {
    if let Some(completion) = evaluation.completion {
      let written = store
        .complete_goal(id, completion.at, completion.final_value)
        .await;
      if let Err(error) = written {
        tracing::warn!(
          goal_id = %id,
          %error,
          "failed to persist goal completion; will retry on next evaluation"
        );
      }
    }
  }

  Ok(Json(evaluation))
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn fetch_goal<S>(store: &S, id: Uuid) -> Result<Goal, ApiError>
where
  S: MetricStore,
{
  store
    .get_goal(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("goal {id} not found")))
}
