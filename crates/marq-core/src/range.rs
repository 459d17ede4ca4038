//! Calendar-date ranges and month arithmetic.
//!
//! Everything here operates on [`NaiveDate`] — never on datetime instants —
//! so no part of the aggregation can shift by a day under a DST or UTC
//! conversion. Both range endpoints are inclusive, and day counts are
//! inclusive on both ends.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::{Error, Result};

// ─── DateRange ───────────────────────────────────────────────────────────────

/// An inclusive range of calendar dates, `since ≤ until` by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
  since: NaiveDate,
  until: NaiveDate,
}

impl DateRange {
  /// Build a range, failing fast when `since > until`.
  pub fn new(since: NaiveDate, until: NaiveDate) -> Result<Self> {
    if since > until {
      return Err(Error::InvalidRange { since, until });
    }
    Ok(Self { since, until })
  }

  /// The full calendar month containing `date`.
  pub fn month_of(date: NaiveDate) -> Self {
    Self {
      since: month_start(date),
      until: month_end(date),
    }
  }

  pub fn since(&self) -> NaiveDate { self.since }

  pub fn until(&self) -> NaiveDate { self.until }

  /// Number of calendar days in the range, counting both endpoints.
  pub fn days(&self) -> i64 { (self.until - self.since).num_days() + 1 }

  /// Inclusive day-count intersection with `[other_start, other_end]`.
  /// Zero when the intervals are disjoint.
  pub fn overlap_days(&self, other_start: NaiveDate, other_end: NaiveDate) -> i64 {
    let start = self.since.max(other_start);
    let end = self.until.min(other_end);
    if start > end { 0 } else { (end - start).num_days() + 1 }
  }

  /// Iterate over the first days of every calendar month the range touches.
  pub fn months(&self) -> MonthIter {
    MonthIter {
      next: Some(month_start(self.since)),
      last: month_start(self.until),
    }
  }
}

/// Iterator over month-start dates; see [`DateRange::months`].
pub struct MonthIter {
  next: Option<NaiveDate>,
  last: NaiveDate,
}

impl Iterator for MonthIter {
  type Item = NaiveDate;

  fn next(&mut self) -> Option<NaiveDate> {
    let current = self.next?;
    if current > self.last {
      self.next = None;
      return None;
    }
    self.next = current.checked_add_months(Months::new(1));
    Some(current)
  }
}

// ─── Month helpers ───────────────────────────────────────────────────────────

/// The first day of the calendar month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
  date.with_day(1).unwrap_or(date)
}

/// The last day of the calendar month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
  let first = month_start(date);
  first
    .checked_add_months(Months::new(1))
    .and_then(|next| next.pred_opt())
    .unwrap_or(first)
}

/// Total calendar days in the month containing `date` (28–31).
pub fn days_in_month(date: NaiveDate) -> i64 {
  (month_end(date) - month_start(date)).num_days() + 1
}

/// Fail with [`Error::NotMonthStart`] unless `date` is the first of a month.
pub fn ensure_month_start(date: NaiveDate) -> Result<()> {
  if date.day() == 1 {
    Ok(())
  } else {
    Err(Error::NotMonthStart(date))
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  #[test]
  fn range_rejects_reversed_endpoints() {
    let err = DateRange::new(d(2025, 3, 2), d(2025, 3, 1));
    assert!(matches!(err, Err(Error::InvalidRange { .. })));
  }

  #[test]
  fn single_day_range_counts_one_day() {
    let r = DateRange::new(d(2025, 3, 5), d(2025, 3, 5)).unwrap();
    assert_eq!(r.days(), 1);
  }

  #[test]
  fn month_end_handles_leap_february() {
    assert_eq!(month_end(d(2024, 2, 10)), d(2024, 2, 29));
    assert_eq!(month_end(d(2025, 2, 10)), d(2025, 2, 28));
    assert_eq!(days_in_month(d(2024, 2, 1)), 29);
  }

  #[test]
  fn month_end_handles_december_rollover() {
    assert_eq!(month_end(d(2025, 12, 15)), d(2025, 12, 31));
  }

  #[test]
  fn overlap_is_zero_for_disjoint_intervals() {
    let r = DateRange::new(d(2025, 1, 1), d(2025, 1, 31)).unwrap();
    assert_eq!(r.overlap_days(d(2025, 2, 1), d(2025, 2, 28)), 0);
  }

  #[test]
  fn overlap_is_inclusive_on_both_ends() {
    let r = DateRange::new(d(2025, 12, 15), d(2025, 12, 31)).unwrap();
    assert_eq!(r.overlap_days(d(2025, 12, 1), d(2025, 12, 31)), 17);
  }

  #[test]
  fn months_iterates_every_touched_month() {
    let r = DateRange::new(d(2025, 11, 20), d(2026, 1, 10)).unwrap();
    let months: Vec<_> = r.months().collect();
    assert_eq!(months, vec![d(2025, 11, 1), d(2025, 12, 1), d(2026, 1, 1)]);
  }

  #[test]
  fn ensure_month_start_accepts_only_day_one() {
    assert!(ensure_month_start(d(2025, 4, 1)).is_ok());
    assert!(matches!(
      ensure_month_start(d(2025, 4, 2)),
      Err(Error::NotMonthStart(_))
    ));
  }
}
