// ABOUTME: In-process per-connection sync lease map with RAII release
// ABOUTME: Guards against concurrent sync_connection calls for the same connection
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use reviewsync_core::errors::SyncError;

/// In-process map of in-flight syncs keyed by connection id.
///
/// This complements the persisted `sync_status = "syncing"` marker: the marker
/// is the cross-process advisory signal, the lease is the in-process hard
/// guarantee. Acquisition is atomic through the map's entry API.
#[derive(Clone, Default)]
pub struct SyncLeases {
    inflight: Arc<DashMap<i64, Instant>>,
}

impl SyncLeases {
    /// Create an empty lease map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lease for a connection.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::AlreadySyncing`] when another task holds the
    /// lease.
    pub fn acquire(&self, connection_id: i64) -> Result<SyncLeaseGuard, SyncError> {
        match self.inflight.entry(connection_id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(SyncError::AlreadySyncing { connection_id })
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(Instant::now());
                Ok(SyncLeaseGuard {
                    inflight: Arc::clone(&self.inflight),
                    connection_id,
                })
            }
        }
    }

    /// True if a lease is currently held for the connection.
    #[must_use]
    pub fn is_held(&self, connection_id: i64) -> bool {
        self.inflight.contains_key(&connection_id)
    }

    /// Number of in-flight syncs.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }
}

/// RAII guard releasing the lease on drop, covering every exit path of a sync
/// including panics and task cancellation.
#[derive(Debug)]
pub struct SyncLeaseGuard {
    inflight: Arc<DashMap<i64, Instant>>,
    connection_id: i64,
}

impl Drop for SyncLeaseGuard {
    fn drop(&mut self) {
        self.inflight.remove(&self.connection_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_drop() {
        let leases = SyncLeases::new();
        let guard = leases.acquire(7).expect("first acquire");
        assert!(leases.is_held(7));

        let err = leases.acquire(7).unwrap_err();
        assert!(matches!(err, SyncError::AlreadySyncing { connection_id: 7 }));

        drop(guard);
        assert!(!leases.is_held(7));
        leases.acquire(7).expect("reacquire after drop");
    }

    #[test]
    fn leases_are_per_connection() {
        let leases = SyncLeases::new();
        let _a = leases.acquire(1).expect("acquire 1");
        let _b = leases.acquire(2).expect("acquire 2");
        assert_eq!(leases.in_flight(), 2);
    }
}
