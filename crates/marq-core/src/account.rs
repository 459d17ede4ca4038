//! Account — the thin envelope metrics and goals hang off.
//!
//! An account represents one connected ad-platform account. The platform
//! client itself lives outside this system; the core only keeps the external
//! reference string needed to correlate cached insights.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A connected marketing account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
  pub account_id:   Uuid,
  pub name:         String,
  /// External ad-platform account identifier, if connected.
  pub platform_ref: Option<String>,
  /// Opaque capability token for the public read-only funnel view.
  /// Rotating it revokes every previously shared link.
  pub share_token:  String,
  pub created_at:   DateTime<Utc>,
}
