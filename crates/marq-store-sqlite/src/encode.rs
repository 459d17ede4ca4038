//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as ISO
//! `YYYY-MM-DD` strings (which sort and range-compare correctly as TEXT).
//! Metric and period discriminants are the snake_case wire names. UUIDs are
//! stored as hyphenated lowercase strings.

use std::str::FromStr as _;

use chrono::{DateTime, NaiveDate, Utc};
use marq_core::{
  account::Account,
  goal::{Goal, GoalPeriod},
  metric::{Metric, MonthlyMetrics},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate
// ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Metric ──────────────────────────────────────────────────────────────────

pub fn encode_metric(m: Metric) -> String { m.to_string() }

pub fn decode_metric(s: &str) -> Result<Metric> {
  Metric::from_str(s)
    .map_err(|_| marq_core::Error::UnknownMetric(s.to_owned()).into())
}

// ─── GoalPeriod
// ───────────────────────────────────────────────────────────────

pub fn encode_period(p: GoalPeriod) -> &'static str {
  match p {
    GoalPeriod::Monthly => "monthly",
    GoalPeriod::Total => "total",
  }
}

pub fn decode_period(s: &str) -> Result<GoalPeriod> {
  match s {
    "monthly" => Ok(GoalPeriod::Monthly),
    "total" => Ok(GoalPeriod::Total),
    other => Err(marq_core::Error::UnknownPeriod(other.to_owned()).into()),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `accounts` row.
pub struct RawAccount {
  pub account_id:   String,
  pub name:         String,
  pub platform_ref: Option<String>,
  pub share_token:  String,
  pub created_at:   String,
}

impl RawAccount {
  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id:   decode_uuid(&self.account_id)?,
      name:         self.name,
      platform_ref: self.platform_ref,
      share_token:  self.share_token,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `monthly_metrics` row.
pub struct RawMonthly {
  pub account_id:             String,
  pub month:                  String,
  pub new_followers:          Option<f64>,
  pub appointments_scheduled: Option<f64>,
  pub appointments_showed:    Option<f64>,
  pub updated_at:             String,
}

impl RawMonthly {
  pub fn into_monthly(self) -> Result<MonthlyMetrics> {
    Ok(MonthlyMetrics {
      account_id:             decode_uuid(&self.account_id)?,
      month:                  decode_date(&self.month)?,
      new_followers:          self.new_followers,
      appointments_scheduled: self.appointments_scheduled,
      appointments_showed:    self.appointments_showed,
      updated_at:             decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `goals` row.
pub struct RawGoal {
  pub goal_id:      String,
  pub account_id:   String,
  pub metric:       String,
  pub target:       f64,
  pub period:       String,
  pub start_date:   Option<String>,
  pub archived:     bool,
  pub completed_at: Option<String>,
  pub final_value:  Option<f64>,
  pub created_at:   String,
}

impl RawGoal {
  pub fn into_goal(self) -> Result<Goal> {
    Ok(Goal {
      goal_id:      decode_uuid(&self.goal_id)?,
      account_id:   decode_uuid(&self.account_id)?,
      metric:       decode_metric(&self.metric)?,
      target:       self.target,
      period:       decode_period(&self.period)?,
      start_date:   self.start_date.as_deref().map(decode_date).transpose()?,
      archived:     self.archived,
      completed_at: self.completed_at.as_deref().map(decode_date).transpose()?,
      final_value:  self.final_value,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}
