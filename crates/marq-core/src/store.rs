//! The `MetricStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `marq-store-sqlite`).
//! Higher layers (`marq-api`, the server binary) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  account::Account,
  goal::{Goal, NewGoal},
  metric::{MonthlyMetrics, MonthlyValues},
  range::DateRange,
  source::InsightRow,
};

/// Abstraction over a Marq metrics store backend.
///
/// Monthly rows are upserted in place; goals mutate only along the one-way
/// open → completed transition plus the independent archived flag.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait MetricStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Create and persist an account; the store assigns the UUID, the share
  /// token, and `created_at`.
  fn add_account(
    &self,
    name: String,
    platform_ref: Option<String>,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  /// Retrieve an account by UUID. Returns `None` if not found.
  fn get_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  fn list_accounts(
    &self,
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + '_;

  /// Resolve the public share token to its account, for the read-only view.
  fn account_by_share_token<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Replace the account's share token, revoking previously shared links.
  /// Returns the updated account; errors if the account does not exist.
  fn rotate_share_token(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  // ── Monthly manual metrics ────────────────────────────────────────────

  /// Create or overwrite the row for (`account_id`, `month`). `month` must
  /// be the first day of a calendar month; `updated_at` is store-assigned.
  fn upsert_monthly(
    &self,
    account_id: Uuid,
    month: NaiveDate,
    values: MonthlyValues,
  ) -> impl Future<Output = Result<MonthlyMetrics, Self::Error>> + Send + '_;

  /// All monthly rows whose month intersects `range`, ordered by month.
  fn monthly_in_range(
    &self,
    account_id: Uuid,
    range: DateRange,
  ) -> impl Future<Output = Result<Vec<MonthlyMetrics>, Self::Error>> + Send + '_;

  // ── Insights cache ────────────────────────────────────────────────────

  /// Batch-upsert cached per-day insight values, keyed on
  /// (account, metric, day). Re-syncing a day overwrites it.
  fn record_insights(
    &self,
    account_id: Uuid,
    rows: Vec<InsightRow>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Goals ─────────────────────────────────────────────────────────────

  fn add_goal(
    &self,
    input: NewGoal,
  ) -> impl Future<Output = Result<Goal, Self::Error>> + Send + '_;

  fn get_goal(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Goal>, Self::Error>> + Send + '_;

  /// Goals for an account; archived ones are hidden unless requested.
  fn list_goals(
    &self,
    account_id: Uuid,
    include_archived: bool,
  ) -> impl Future<Output = Result<Vec<Goal>, Self::Error>> + Send + '_;

  /// Soft-hide a goal. Independent of completion.
  fn archive_goal(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Goal, Self::Error>> + Send + '_;

  /// Record the one-way open → completed transition. Idempotent: if the
  /// goal already has a frozen snapshot the write is a no-op and the stored
  /// row is returned unchanged. Errors if the goal does not exist.
  fn complete_goal(
    &self,
    id: Uuid,
    at: NaiveDate,
    final_value: f64,
  ) -> impl Future<Output = Result<Goal, Self::Error>> + Send + '_;
}
