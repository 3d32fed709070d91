//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (real preflights answered here, origin headers on the rest)
//!     → auth.rs (pass-through or bearer token check)
//!     → handlers / dispatcher
//! ```
//!
//! # Design Decisions
//! - The dispatcher never re-validates credentials
//! - Rejections use the same JSON error envelope as the rest of the gateway

pub mod auth;
pub mod cors;

pub use auth::{auth_middleware, AuthPolicy};
pub use cors::{apply_cors, cors_layer};
