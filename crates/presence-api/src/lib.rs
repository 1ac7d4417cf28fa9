//! # presence-api
//!
//! HTTP API layer for the presence engine built on Axum.
//!
//! Provides the presence endpoints, health probes, the change-marker
//! WebSocket, middleware (logging, CORS), the authenticated-caller
//! extractor, DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
