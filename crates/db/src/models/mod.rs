//! Row types and DTOs, one module per table family.

pub mod call;
pub mod campaign;
pub mod contact;
pub mod metrics;
pub mod script;
pub mod script_file;
