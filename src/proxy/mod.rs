//! Proxy dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! ProxyRequest {service, subpath, method, headers, query, body}
//!     → dispatcher.rs: registry lookup (unknown → 404, unhealthy → 503)
//!     → dispatcher.rs: method check (unsupported → 405)
//!     → headers.rs: strip Host / Content-Length
//!     → client.rs: single outbound call under a timeout
//!         connect/transport failure → 502, timeout → 504
//!     → headers.rs + body.rs: translate response
//!     → ProxyResponse {status, headers, body}
//! ```

pub mod body;
pub mod client;
pub mod dispatcher;
pub mod headers;

pub use body::UpstreamBody;
pub use client::{build_client, HttpClient};
pub use dispatcher::{Dispatcher, ProxyRequest, ProxyResponse};
