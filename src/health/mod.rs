//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! On demand (POST /services/{name}/health, POST /services/health/all)
//! or periodically (monitor.rs):
//!     → checker.rs probes health_url (bounded timeout)
//!     → 200 = healthy, anything else or transport error = unhealthy
//!     → registry.set_status(name, status, now)
//!
//! Dispatcher reads the status on every request:
//!     unhealthy → refused without an outbound call
//! ```
//!
//! # Design Decisions
//! - Probes never raise; failures become an unhealthy status
//! - Fan-out: one task per service, joined with per-task isolation
//! - A probe for a service removed mid-flight is discarded

pub mod checker;
pub mod monitor;

pub use checker::{HealthChecker, ProbeOutcome, ProbeReport};
pub use monitor::HealthMonitor;
