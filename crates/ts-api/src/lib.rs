//! # ts-api
//!
//! HTTP API server for Threat Sentinel: route handlers, DTOs, error
//! mapping, middleware, and the axum server wiring.

pub mod auth;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use server::{ApiServer, ApiServerConfig};
pub use state::AppState;
