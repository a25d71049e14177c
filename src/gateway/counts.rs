//! Per-address connection accounting.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::metrics::GateMetrics;

/// Active connection count per source address.
///
/// Entries exist only while the count is at least 1. Check-and-increment
/// and decrement both run under the entry's shard lock.
#[derive(Debug, Default)]
pub struct ConnectionCounts {
    counts: DashMap<String, usize>,
}

impl ConnectionCounts {
    pub fn new() -> Self {
        Self {
            counts: DashMap::new(),
        }
    }

    /// Take one slot for `address` unless it already holds `max`.
    ///
    /// On refusal returns the current count and leaves the mapping untouched.
    pub fn try_acquire(self: &Arc<Self>, address: &str, max: usize) -> Result<ConnectionPermit, usize> {
        match self.counts.entry(address.to_string()) {
            Entry::Occupied(mut entry) => {
                let current = *entry.get();
                if current >= max {
                    return Err(current);
                }
                *entry.get_mut() = current + 1;
            }
            Entry::Vacant(entry) => {
                if max == 0 {
                    return Err(0);
                }
                entry.insert(1);
            }
        }

        GateMetrics::record_accepted();
        GateMetrics::set_tracked_addresses(self.counts.len());

        Ok(ConnectionPermit {
            counts: Arc::clone(self),
            address: address.to_string(),
        })
    }

    /// Give back one slot for `address`, dropping the entry at zero.
    fn release(&self, address: &str) {
        match self.counts.entry(address.to_string()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() <= 1 {
                    entry.remove();
                } else {
                    *entry.get_mut() -= 1;
                }
            }
            Entry::Vacant(_) => {
                tracing::warn!(address = %address, "Released a connection slot that was not held");
                return;
            }
        }

        GateMetrics::record_released();
        GateMetrics::set_tracked_addresses(self.counts.len());
    }

    /// Current count for `address` (0 when absent)
    pub fn get(&self, address: &str) -> usize {
        self.counts.get(address).map(|c| *c).unwrap_or(0)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.counts.contains_key(address)
    }

    /// Number of addresses with at least one connection
    pub fn tracked_addresses(&self) -> usize {
        self.counts.len()
    }

    /// Total admitted connections across all addresses
    pub fn total(&self) -> usize {
        self.counts.iter().map(|entry| *entry.value()).sum()
    }
}

/// One admitted connection's hold on its address slot.
///
/// Dropping the permit releases the slot, so it is returned exactly once no
/// matter how the connection ends.
#[derive(Debug)]
pub struct ConnectionPermit {
    counts: Arc<ConnectionCounts>,
    address: String,
}

impl ConnectionPermit {
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Drop for ConnectionPermit {
    fn drop(&mut self) {
        self.counts.release(&self.address);
    }
}
