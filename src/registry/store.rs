//! In-memory service registry.
//!
//! # Responsibilities
//! - Map service name → descriptor
//! - Register, unregister, look up and enumerate services
//! - Accept health status updates from the health checker
//!
//! # Design Decisions
//! - Backed by `DashMap`: per-key atomicity, no global lock on the request path
//! - Readers always get an owned snapshot, never a guard into the map
//! - Enumeration follows insertion order; re-registration keeps the original slot

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::ServiceConfig;
use crate::error::GatewayError;
use crate::observability::metrics;
use crate::registry::descriptor::{HealthStatus, ServiceDescriptor};

#[derive(Debug)]
struct Slot {
    seq: u64,
    descriptor: ServiceDescriptor,
}

/// Process-wide registry of backend services.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: DashMap<String, Slot>,
    next_seq: AtomicU64,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a registry from static configuration.
    ///
    /// Entries that fail validation are logged and skipped; the config
    /// validator normally rejects them before this point.
    pub fn from_config(services: &[ServiceConfig]) -> Self {
        let registry = Self::new();
        for service in services {
            match service.to_descriptor() {
                Ok(descriptor) => {
                    tracing::info!(
                        service = %descriptor.name,
                        base_url = %descriptor.base_url,
                        status = %descriptor.status,
                        "Registered static service"
                    );
                    registry.register(descriptor);
                }
                Err(e) => {
                    tracing::warn!(service = %service.name, error = %e, "Skipping invalid static service");
                }
            }
        }
        registry
    }

    /// Insert or replace the descriptor for `descriptor.name`.
    ///
    /// Returns the descriptor that was replaced, if any.
    pub fn register(&self, descriptor: ServiceDescriptor) -> Option<ServiceDescriptor> {
        let mut previous = None;
        self.services
            .entry(descriptor.name.clone())
            .and_modify(|slot| {
                previous = Some(std::mem::replace(&mut slot.descriptor, descriptor.clone()));
            })
            .or_insert_with(|| Slot {
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                descriptor,
            });

        metrics::set_registered_services(self.len());
        previous
    }

    /// Remove a service. Unknown names are reported, not ignored.
    pub fn unregister(&self, name: &str) -> Result<ServiceDescriptor, GatewayError> {
        let removed = self
            .services
            .remove(name)
            .map(|(_, slot)| slot.descriptor)
            .ok_or_else(|| GatewayError::NotFound(name.to_string()))?;

        metrics::clear_service_health(name);
        metrics::set_registered_services(self.len());
        Ok(removed)
    }

    /// Snapshot of one descriptor.
    pub fn get(&self, name: &str) -> Result<ServiceDescriptor, GatewayError> {
        self.services
            .get(name)
            .map(|slot| slot.descriptor.clone())
            .ok_or_else(|| GatewayError::NotFound(name.to_string()))
    }

    /// Snapshot of every descriptor in insertion order.
    pub fn list(&self) -> Vec<ServiceDescriptor> {
        let mut slots: Vec<(u64, ServiceDescriptor)> = self
            .services
            .iter()
            .map(|entry| (entry.seq, entry.descriptor.clone()))
            .collect();
        slots.sort_by_key(|(seq, _)| *seq);
        slots.into_iter().map(|(_, descriptor)| descriptor).collect()
    }

    /// Record a probe result. A no-op when the service has been removed
    /// while the probe was in flight.
    pub fn set_status(&self, name: &str, status: HealthStatus, checked_at: DateTime<Utc>) {
        match self.services.get_mut(name) {
            Some(mut slot) => {
                let previous = slot.descriptor.status;
                slot.descriptor.status = status;
                slot.descriptor.last_check = Some(checked_at);
                if previous != status {
                    tracing::info!(service = %name, from = %previous, to = %status, "Service health changed");
                }
            }
            None => {
                tracing::debug!(service = %name, "Dropping status update for unregistered service");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
