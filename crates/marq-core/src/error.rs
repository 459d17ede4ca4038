//! Error types for `marq-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid date range: since {since} is after until {until}")]
  InvalidRange { since: NaiveDate, until: NaiveDate },

  #[error("{0} is not the first day of a calendar month")]
  NotMonthStart(NaiveDate),

  #[error("unknown metric name: {0:?}")]
  UnknownMetric(String),

  #[error("unknown goal period: {0:?}")]
  UnknownPeriod(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
