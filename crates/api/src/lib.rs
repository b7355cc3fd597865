//! Telesales API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes, the
//! call-session registry) so integration tests and the binary entrypoint can
//! both access them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod sessions;
pub mod state;
