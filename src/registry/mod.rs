//! Service registry subsystem.
//!
//! # Data Flow
//! ```text
//! Static config (startup)        ──┐
//! POST /services/register         ─┼─▶ store.rs (name → descriptor)
//! DELETE /services/{name}         ─┘        │
//!                                           ├─▶ dispatcher: get(name) snapshot per request
//! Health checker ── set_status ────────────▶│
//!                                           └─▶ GET /services: list() snapshot
//! ```
//!
//! # Design Decisions
//! - The registry is an explicit object owned by the server, not a global
//! - State is process-local and rebuilt from configuration on every start

pub mod descriptor;
pub mod store;

pub use descriptor::{HealthStatus, ServiceDescriptor, ServiceRegistration};
pub use store::ServiceRegistry;
