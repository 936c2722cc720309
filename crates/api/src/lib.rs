//! Quotes widget HTTP server library.
//!
//! Exposes the building blocks (config, state, error handling, routes, the
//! refresh client) so integration tests and the binary entrypoint can both
//! access them.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod locale;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
