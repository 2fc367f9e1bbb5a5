//! Free-port discovery for supervisor and executor startup.
//!
//! An explicit, injectable service instance rather than process-global
//! state, so tests and production stay reproducible. Allocation is a
//! bind-and-release probe plus a short memory of recently issued ports;
//! best effort, not a hard reservation.

use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::trace;

const MAX_PROBE_ATTEMPTS: u32 = 16;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("no free tcp port found after {0} probes: {1}")]
    Exhausted(u32, String),
}

/// Hands out free ephemeral TCP ports.
pub struct PortAllocator {
    /// How long an issued port is withheld from re-issue.
    hold: Duration,
    recent: Mutex<HashMap<u16, Instant>>,
}

impl PortAllocator {
    pub fn new() -> Self {
        Self::with_hold(Duration::from_secs(30))
    }

    pub fn with_hold(hold: Duration) -> Self {
        Self {
            hold,
            recent: Mutex::new(HashMap::new()),
        }
    }

    /// Find one free port, skipping ports issued within the hold window.
    pub fn allocate(&self) -> Result<u16, PortError> {
        let mut last_error = String::new();

        for _ in 0..MAX_PROBE_ATTEMPTS {
            let port = match TcpListener::bind(("127.0.0.1", 0)) {
                Ok(listener) => match listener.local_addr() {
                    Ok(addr) => addr.port(),
                    Err(e) => {
                        last_error = e.to_string();
                        continue;
                    }
                },
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            let mut recent = self.recent.lock().unwrap();
            let now = Instant::now();
            recent.retain(|_, issued| now.duration_since(*issued) < self.hold);

            if recent.contains_key(&port) {
                last_error = format!("port {port} was issued recently");
                continue;
            }
            recent.insert(port, now);
            trace!(target: "ward_core::port", port, "allocated port");
            return Ok(port);
        }

        Err(PortError::Exhausted(MAX_PROBE_ATTEMPTS, last_error))
    }
}

impl Default for PortAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocated_port_is_bindable() {
        let allocator = PortAllocator::new();
        let port = allocator.allocate().unwrap();
        assert!(TcpListener::bind(("127.0.0.1", port)).is_ok());
    }

    #[test]
    fn quick_succession_yields_distinct_ports() {
        let allocator = PortAllocator::new();
        let a = allocator.allocate().unwrap();
        let b = allocator.allocate().unwrap();
        let c = allocator.allocate().unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn independent_allocators_do_not_share_state() {
        // Collisions between independent instances are tolerated (best
        // effort); they just must both keep working.
        let a = PortAllocator::new().allocate().unwrap();
        let b = PortAllocator::new().allocate().unwrap();
        assert!(a > 0 && b > 0);
    }

    #[test]
    fn zero_hold_allows_immediate_reuse() {
        let allocator = PortAllocator::with_hold(Duration::ZERO);
        for _ in 0..4 {
            allocator.allocate().unwrap();
        }
    }
}
