//! Metric names and the manually-entered monthly metric record.
//!
//! A monthly record holds the three funnel stages an operator types in by
//! hand. Absent values stay `None` end to end — "no entry yet" is not the
//! same thing as an explicit zero, and downstream consumers render the two
//! differently.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

// ─── Metric ──────────────────────────────────────────────────────────────────

/// The enumerated set of trackable metric names. The snake_case string form
/// doubles as the database discriminant and the wire name.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
  Impressions,
  Reach,
  ProfileViews,
  Followers,
  Conversations,
  Spend,
  AppointmentsScheduled,
  AppointmentsShowed,
}

impl Metric {
  /// Whether this metric has a manually-entered monthly column. The rest are
  /// only available through the cached insight source.
  pub fn is_manual(self) -> bool {
    matches!(
      self,
      Self::Followers | Self::AppointmentsScheduled | Self::AppointmentsShowed
    )
  }
}

// ─── MonthlyMetrics ──────────────────────────────────────────────────────────

/// One operator-entered row per (account, calendar month).
///
/// `month` is always the first day of its month. A `None` field means "no
/// manual data for this metric this month" and must never be coerced to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMetrics {
  pub account_id:             Uuid,
  /// First day of the calendar month this row describes.
  pub month:                  NaiveDate,
  pub new_followers:          Option<f64>,
  pub appointments_scheduled: Option<f64>,
  pub appointments_showed:    Option<f64>,
  /// Store-assigned; bumped on every upsert.
  pub updated_at:             DateTime<Utc>,
}

impl MonthlyMetrics {
  /// The manual value for `metric`, or `None` for metrics with no manual
  /// column (or no entry this month).
  pub fn manual_value(&self, metric: Metric) -> Option<f64> {
    match metric {
      Metric::Followers => self.new_followers,
      Metric::AppointmentsScheduled => self.appointments_scheduled,
      Metric::AppointmentsShowed => self.appointments_showed,
      _ => None,
    }
  }
}

/// The operator-editable fields of a monthly row; input to
/// [`crate::store::MetricStore::upsert_monthly`].
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MonthlyValues {
  pub new_followers:          Option<f64>,
  pub appointments_scheduled: Option<f64>,
  pub appointments_showed:    Option<f64>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
