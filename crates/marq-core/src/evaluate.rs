//! Goal-progress evaluation.
//!
//! The evaluator is pure over its inputs: the goal, a pre-fetched slice of
//! monthly records, an injected [`InsightSource`], and an explicit `today`.
//! It never writes — a detected completion is reported through
//! [`GoalEvaluation::newly_completed`] and persisted by the caller via
//! [`crate::store::MetricStore::complete_goal`], which is idempotent. A
//! failed write therefore just leaves the goal open for the next pass.

use chrono::{Months, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  aggregate::manual_sum,
  goal::{Goal, GoalPeriod, GoalStatus, total_epoch},
  metric::MonthlyMetrics,
  range::{DateRange, month_end, month_start},
  source::{InsightSource, period_sum_or_zero},
};

// ─── Result types ────────────────────────────────────────────────────────────

/// The frozen completion snapshot of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Completion {
  /// End of the month in which the target was first crossed.
  pub at:          NaiveDate,
  /// The accumulated value at the moment of crossing.
  pub final_value: f64,
}

/// Outcome of evaluating one goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalEvaluation {
  pub goal_id:         Uuid,
  pub target:          f64,
  /// Accumulated value: the frozen `final_value` for completed goals, the
  /// running total so far for open ones.
  pub current:         f64,
  pub completion:      Option<Completion>,
  /// `true` only on the evaluation that first detects the crossing — the
  /// caller's cue to persist the transition.
  pub newly_completed: bool,
}

// ─── Evaluation ──────────────────────────────────────────────────────────────

/// The widest record range an evaluation of `goal` can consult; callers use
/// this to pre-fetch monthly rows before invoking [`evaluate_goal`].
pub fn fetch_range(goal: &Goal, today: NaiveDate) -> DateRange {
  match goal.period {
    // A monthly goal only ever reads its anchor month.
    GoalPeriod::Monthly => DateRange::month_of(goal.start_date.unwrap_or(today)),
    // A total goal reads from its start month through the current month.
    GoalPeriod::Total => {
      let since = month_start(goal.start_date.unwrap_or_else(total_epoch));
      let until = month_end(since.max(today));
      DateRange::new(since, until)
        .unwrap_or_else(|_| DateRange::month_of(since))
    }
  }
}

/// Evaluate one goal against the pre-fetched `records` and the injected
/// insight source.
///
/// Completed goals are a pure read of the frozen snapshot — no recomputation
/// occurs even if the underlying data has since changed. Insight-source
/// failures count as zero for the affected period (logged inside
/// [`period_sum_or_zero`]); the manual contribution is still computed.
pub async fn evaluate_goal<S: InsightSource>(
  goal: &Goal,
  records: &[MonthlyMetrics],
  source: &S,
  today: NaiveDate,
) -> GoalEvaluation {
  if let GoalStatus::Completed { at, final_value } = goal.status() {
    return GoalEvaluation {
      goal_id:         goal.goal_id,
      target:          goal.target,
      current:         final_value,
      completion:      Some(Completion { at, final_value }),
      newly_completed: false,
    };
  }

  match goal.period {
    GoalPeriod::Monthly => evaluate_monthly(goal, records, source, today).await,
    GoalPeriod::Total => evaluate_total(goal, records, source, today).await,
  }
}

/// Manual plus insight contribution for one calendar month.
async fn month_total<S: InsightSource>(
  goal: &Goal,
  records: &[MonthlyMetrics],
  source: &S,
  month: DateRange,
) -> f64 {
  let manual = manual_sum(month, records, goal.metric).unwrap_or(0.0);
  let sourced =
    period_sum_or_zero(source, goal.account_id, goal.metric, month).await;
  manual + sourced
}

/// Monthly goals measure one fixed calendar month: the month containing the
/// goal's `start_date` (the month of `today` when no start date was set).
async fn evaluate_monthly<S: InsightSource>(
  goal: &Goal,
  records: &[MonthlyMetrics],
  source: &S,
  today: NaiveDate,
) -> GoalEvaluation {
  let month = DateRange::month_of(goal.start_date.unwrap_or(today));
  let accumulated = month_total(goal, records, source, month).await;

  finishing(goal, accumulated, month.until())
}

/// Total goals accumulate month by month from the start month and stop at
/// the first month whose running total crosses the target — later months
/// must not inflate the frozen value.
async fn evaluate_total<S: InsightSource>(
  goal: &Goal,
  records: &[MonthlyMetrics],
  source: &S,
  today: NaiveDate,
) -> GoalEvaluation {
  let mut cursor = month_start(goal.start_date.unwrap_or_else(total_epoch));
  let last = month_start(today);
  let mut running = 0.0;

  while cursor <= last {
    let month = DateRange::month_of(cursor);
    running += month_total(goal, records, source, month).await;

    if running >= goal.target {
      return finishing(goal, running, month.until());
    }

    match cursor.checked_add_months(Months::new(1)) {
      Some(next) => cursor = next,
      None => break,
    }
  }

  GoalEvaluation {
    goal_id:         goal.goal_id,
    target:          goal.target,
    current:         running,
    completion:      None,
    newly_completed: false,
  }
}

/// Wrap an accumulated value, marking a fresh completion when it crosses the
/// target.
fn finishing(goal: &Goal, accumulated: f64, period_end: NaiveDate) -> GoalEvaluation {
  let crossed = accumulated >= goal.target;
  GoalEvaluation {
    goal_id:         goal.goal_id,
    target:          goal.target,
    current:         accumulated,
    completion:      crossed.then_some(Completion {
      at:          period_end,
      final_value: accumulated,
    }),
    newly_completed: crossed,
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
