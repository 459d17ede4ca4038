//! Proportional range aggregation of monthly manual metrics.
//!
//! A monthly total is allocated to an arbitrary day range in proportion to
//! how many of that month's days the range covers. Contributions accumulate
//! as fractional values across every month the range touches; rounding
//! happens exactly once, at the very end, so per-month rounding error cannot
//! compound.
//!
//! Null discipline: a field whose records contain no numeric value anywhere
//! in the range stays `None`. Months that do not intersect the range are
//! excluded from that determination entirely.

use serde::Serialize;

use crate::{
  metric::{Metric, MonthlyMetrics},
  range::{DateRange, days_in_month, month_end, month_start},
};

// ─── Output ──────────────────────────────────────────────────────────────────

/// Range-allocated totals for the three manually-tracked funnel stages.
/// `None` means no manual entry contributed anywhere in the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ManualTotals {
  pub new_followers:          Option<i64>,
  pub appointments_scheduled: Option<i64>,
  pub appointments_showed:    Option<i64>,
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Fractional range-weighted sum of one manual metric over `records`.
///
/// Each record contributes `value * overlap_days / days_in_month` when its
/// month intersects the range and its field is present. Returns `None` when
/// no record contributed. The result is deliberately unrounded — the goal
/// evaluator accumulates these across months before comparing to a target.
pub fn manual_sum(
  range: DateRange,
  records: &[MonthlyMetrics],
  metric: Metric,
) -> Option<f64> {
  let mut acc: Option<f64> = None;

  for record in records {
    let overlap =
      range.overlap_days(month_start(record.month), month_end(record.month));
    if overlap == 0 {
      continue;
    }
    let Some(value) = record.manual_value(metric) else {
      continue;
    };
    let proportion = overlap as f64 / days_in_month(record.month) as f64;
    *acc.get_or_insert(0.0) += value * proportion;
  }

  acc
}

/// All three manual funnel stages over the range, each rounded once at the
/// end, with per-field `None` propagation.
pub fn aggregate_manual(
  range: DateRange,
  records: &[MonthlyMetrics],
) -> ManualTotals {
  let rounded = |metric| {
    manual_sum(range, records, metric).map(|sum: f64| sum.round() as i64)
  };

  ManualTotals {
    new_followers:          rounded(Metric::Followers),
    appointments_scheduled: rounded(Metric::AppointmentsScheduled),
    appointments_showed:    rounded(Metric::AppointmentsShowed),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, Utc};
  use uuid::Uuid;

  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn record(
    month: NaiveDate,
    followers: Option<f64>,
    scheduled: Option<f64>,
    showed: Option<f64>,
  ) -> MonthlyMetrics {
    MonthlyMetrics {
      account_id:             Uuid::new_v4(),
      month,
      new_followers:          followers,
      appointments_scheduled: scheduled,
      appointments_showed:    showed,
      updated_at:             Utc::now(),
    }
  }

  #[test]
  fn full_month_range_takes_the_whole_value() {
    let range = DateRange::new(d(2025, 12, 1), d(2025, 12, 31)).unwrap();
    let records = [record(d(2025, 12, 1), Some(62.0), None, None)];

    assert_eq!(manual_sum(range, &records, Metric::Followers), Some(62.0));
  }

  #[test]
  fn partial_month_allocates_by_day_fraction() {
    // 17 of December's 31 days: 62 * 17/31 = 34 exactly.
    let range = DateRange::new(d(2025, 12, 15), d(2025, 12, 31)).unwrap();
    let records = [record(d(2025, 12, 1), Some(62.0), None, None)];

    let totals = aggregate_manual(range, &records);
    assert_eq!(totals.new_followers, Some(34));
  }

  #[test]
  fn cross_month_range_sums_per_month_fractions() {
    // Nov 20–Dec 10: 30 * 11/30 = 11 from November, 62 * 10/31 = 20 from
    // December.
    let range = DateRange::new(d(2025, 11, 20), d(2025, 12, 10)).unwrap();
    let records = [
      record(d(2025, 11, 1), Some(30.0), None, None),
      record(d(2025, 12, 1), Some(62.0), None, None),
    ];

    let totals = aggregate_manual(range, &records);
    assert_eq!(totals.new_followers, Some(31));
  }

  #[test]
  fn disjoint_months_contribute_nothing() {
    let range = DateRange::new(d(2025, 3, 1), d(2025, 3, 31)).unwrap();
    let records = [record(d(2025, 1, 1), Some(99.0), Some(99.0), Some(99.0))];

    let totals = aggregate_manual(range, &records);
    assert_eq!(totals.new_followers, None);
    assert_eq!(totals.appointments_scheduled, None);
    assert_eq!(totals.appointments_showed, None);
  }

  #[test]
  fn absent_fields_stay_null_while_present_ones_sum() {
    let range = DateRange::new(d(2025, 1, 1), d(2025, 2, 28)).unwrap();
    let records = [
      record(d(2025, 1, 1), None, Some(5.0), None),
      record(d(2025, 2, 1), None, Some(8.0), None),
    ];

    let totals = aggregate_manual(range, &records);
    assert_eq!(totals.appointments_scheduled, Some(13));
    assert_eq!(totals.new_followers, None);
    assert_eq!(totals.appointments_showed, None);
  }

  #[test]
  fn explicit_zero_is_not_null() {
    let range = DateRange::new(d(2025, 1, 1), d(2025, 1, 31)).unwrap();
    let records = [record(d(2025, 1, 1), Some(0.0), None, None)];

    let totals = aggregate_manual(range, &records);
    assert_eq!(totals.new_followers, Some(0));
  }

  #[test]
  fn rounding_applies_once_at_the_end() {
    // Two months each contributing 10 * 14/28 = 0.4999.. of 1.4-style
    // fractions would drift if rounded per month. 1.4 + 1.4 = 2.8 → 3, not
    // 1 + 1 = 2.
    let range = DateRange::new(d(2025, 4, 24), d(2025, 5, 7)).unwrap();
    let records = [
      record(d(2025, 4, 1), Some(6.0), None, None), // 6 * 7/30 = 1.4
      record(d(2025, 5, 1), Some(6.2), None, None), // 6.2 * 7/31 = 1.4
    ];

    let totals = aggregate_manual(range, &records);
    assert_eq!(totals.new_followers, Some(3));
  }

  #[test]
  fn aggregation_is_a_pure_function() {
    let range = DateRange::new(d(2025, 11, 20), d(2025, 12, 10)).unwrap();
    let records = [
      record(d(2025, 11, 1), Some(30.0), Some(4.0), None),
      record(d(2025, 12, 1), Some(62.0), None, Some(2.0)),
    ];

    assert_eq!(
      aggregate_manual(range, &records),
      aggregate_manual(range, &records)
    );
  }
}
