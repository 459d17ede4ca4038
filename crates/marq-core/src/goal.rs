//! Goal types and the one-way completion state machine.
//!
//! A goal is OPEN until the evaluator first detects its target being crossed,
//! at which point `completed_at` and `final_value` are written together and
//! frozen. Completion is terminal: later corrections to historical manual
//! data do not reopen or revalue a completed goal. Archiving is a soft hide,
//! independent of completion.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metric::Metric;

// ─── Period ──────────────────────────────────────────────────────────────────

/// How a goal's accumulated value is windowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPeriod {
  /// Measured over one fixed calendar month (the month of `start_date`).
  Monthly,
  /// Cumulative month by month since `start_date`.
  Total,
}

/// Default start month for `Total` goals created without a `start_date`.
pub fn total_epoch() -> NaiveDate {
  NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

// ─── Goal ────────────────────────────────────────────────────────────────────

/// A target for one metric on one account.
///
/// Invariant: `completed_at` and `final_value` are either both `None` or both
/// `Some`, and once set they never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
  pub goal_id:      Uuid,
  pub account_id:   Uuid,
  pub metric:       Metric,
  pub target:       f64,
  pub period:       GoalPeriod,
  pub start_date:   Option<NaiveDate>,
  pub archived:     bool,
  pub completed_at: Option<NaiveDate>,
  pub final_value:  Option<f64>,
  pub created_at:   DateTime<Utc>,
}

impl Goal {
  /// The goal's lifecycle status, computed from the frozen columns.
  pub fn status(&self) -> GoalStatus {
    match (self.completed_at, self.final_value) {
      (Some(at), Some(final_value)) => GoalStatus::Completed { at, final_value },
      _ => GoalStatus::Open,
    }
  }
}

/// Computed lifecycle status of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GoalStatus {
  Open,
  Completed { at: NaiveDate, final_value: f64 },
}

impl GoalStatus {
  pub fn is_open(&self) -> bool { matches!(self, Self::Open) }
}

// ─── NewGoal ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::MetricStore::add_goal`].
/// `goal_id` and `created_at` are always set by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewGoal {
  pub account_id: Uuid,
  pub metric:     Metric,
  pub target:     f64,
  pub period:     GoalPeriod,
  pub start_date: Option<NaiveDate>,
}
