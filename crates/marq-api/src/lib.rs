//! JSON REST API for Marq.
//!
//! Exposes an axum [`Router`] backed by any backend implementing both
//! [`marq_core::store::MetricStore`] and [`marq_core::source::InsightSource`].
//! Auth, TLS, and transport concerns are the caller's responsibility, except
//! for the `/share` surface which is public by design (capability token in
//! the path).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(marq_api::api_router(store.clone()))
//! ```

pub mod accounts;
pub mod error;
pub mod funnel;
pub mod goals;
pub mod insights;
pub mod metrics;
pub mod share;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use marq_core::{source::InsightSource, store::MetricStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: MetricStore + InsightSource + Send + Sync + 'static,
{
  Router::new()
    // Accounts
    .route("/accounts", get(accounts::list::<S>).post(accounts::create::<S>))
    .route("/accounts/{id}", get(accounts::get_one::<S>))
    .route("/accounts/{id}/share-token", post(accounts::rotate_token::<S>))
    // Monthly manual metrics
    .route(
      "/accounts/{id}/metrics",
      get(metrics::list::<S>).put(metrics::upsert::<S>),
    )
    // Cached insights ingest
    .route("/accounts/{id}/insights", put(insights::ingest::<S>))
    // Funnel view
    .route("/accounts/{id}/funnel", get(funnel::snapshot::<S>))
    // Goals
    .route("/accounts/{id}/goals", get(goals::list::<S>).post(goals::create::<S>))
    .route("/goals/{id}", get(goals::get_one::<S>))
    .route("/goals/{id}/archive", post(goals::archive::<S>))
    .route("/goals/{id}/progress", get(goals::progress::<S>))
    // Public read-only share view
    .route("/share/{token}/funnel", get(share::funnel::<S>))
    .with_state(store)
}
