//! Core types and computation for the Marq funnel-metrics service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.
//!
//! The two load-bearing pieces live in [`aggregate`] (proportional allocation
//! of manually-entered monthly metrics across arbitrary day ranges) and
//! [`evaluate`] (goal-progress computation with one-way completion). Both are
//! pure over their inputs; persistence and the external insight source are
//! injected through the traits in [`store`] and [`source`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod aggregate;
pub mod error;
pub mod evaluate;
pub mod funnel;
pub mod goal;
pub mod metric;
pub mod range;
pub mod source;
pub mod store;

pub use error::{Error, Result};
