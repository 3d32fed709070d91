//! HTTP surface of the gateway.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, split /{service}/{subpath...}, read body)
//!     → handlers.rs
//!         registry routes → registry / health checker
//!         proxy routes    → proxy::Dispatcher
//!     → response.rs (JSON envelope for gateway-owned routes)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::UuidRequestId;
pub use server::{AppState, HttpServer};
