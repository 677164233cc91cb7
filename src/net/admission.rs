//! Admission gate bounding concurrently processed client connections.
//!
//! Accepting is never throttled; each accepted connection waits here for a
//! permit before any processing. Excess connections queue, they are never
//! rejected.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::observability::metrics;

/// Counting gate with a fixed number of permits.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    permits: Arc<Semaphore>,
    active: Arc<AtomicUsize>,
    capacity: usize,
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            active: Arc::new(AtomicUsize::new(0)),
            capacity,
        }
    }

    /// Wait until a slot is free.
    ///
    /// Returns `None` only once the gate has been closed for shutdown.
    pub async fn acquire(&self) -> Option<AdmissionPermit> {
        let permit = self.permits.clone().acquire_owned().await.ok()?;
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::record_active_handlers(active);
        Some(AdmissionPermit {
            _permit: permit,
            active: self.active.clone(),
        })
    }

    /// Stop admitting. Handlers still waiting are turned away.
    pub fn close(&self) {
        self.permits.close();
    }

    /// Number of handlers currently past the gate.
    pub fn in_flight(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A held admission slot.
///
/// When dropped, the slot is released back to the gate. This holds on every
/// exit path, including a panicking handler.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
    active: Arc<AtomicUsize>,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        // The count drops before `_permit` returns the slot, so it never
        // exceeds capacity.
        let active = self.active.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::record_active_handlers(active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_bounds_in_flight() {
        let gate = AdmissionGate::new(2);
        let a = gate.acquire().await.unwrap();
        let _b = gate.acquire().await.unwrap();
        assert_eq!(gate.in_flight(), 2);

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.acquire().await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished(), "third acquire must queue");

        drop(a);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("queued acquire should proceed once a slot frees")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_permit_released_on_panic() {
        let gate = AdmissionGate::new(1);
        let task_gate = gate.clone();
        let result = tokio::spawn(async move {
            let _permit = task_gate.acquire().await.unwrap();
            panic!("handler failure");
        })
        .await;
        assert!(result.is_err());
        assert_eq!(gate.in_flight(), 0);
        assert!(gate.acquire().await.is_some());
    }

    #[tokio::test]
    async fn test_in_flight_tracks_permits_across_clones() {
        let gate = AdmissionGate::new(3);
        let other = gate.clone();
        let a = gate.acquire().await.unwrap();
        let b = other.acquire().await.unwrap();
        assert_eq!(gate.in_flight(), 2);
        assert_eq!(other.in_flight(), 2);

        drop(a);
        assert_eq!(other.in_flight(), 1);
        drop(b);
        assert_eq!(gate.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_closed_gate_refuses() {
        let gate = AdmissionGate::new(1);
        gate.close();
        assert!(gate.acquire().await.is_none());
        assert_eq!(gate.capacity(), 1);
    }
}
