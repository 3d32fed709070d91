//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher / health checker / registry produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty for development, JSON for aggregation)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Observability never influences control flow
//! - Request ID flows through logs and onto backend calls
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
