//! Domain logic for outbound telesales calls.
//!
//! Two independent halves live here: the structured call script (model,
//! validation and compilation into a single document) and the call flow
//! (session timing, result capture and the navigation decision made once a
//! result is saved). Persistence and transport are behind the traits in
//! [`collaborators`].

pub mod call_result;
pub mod call_session;
pub mod collaborators;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod script;
pub mod script_compiler;
pub mod types;
