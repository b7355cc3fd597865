//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod call_repo;
pub mod campaign_repo;
pub mod contact_repo;
pub mod metrics_repo;
pub mod script_file_repo;
pub mod script_repo;

pub use call_repo::CallRepo;
pub use campaign_repo::CampaignRepo;
pub use contact_repo::ContactRepo;
pub use metrics_repo::MetricsRepo;
pub use script_file_repo::ScriptFileRepo;
pub use script_repo::ScriptRepo;

/// Default page size for list endpoints.
pub const DEFAULT_LIMIT: i64 = 50;

/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 200;

/// Clamp a requested page size into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp a requested offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
