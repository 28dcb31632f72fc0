//! Shared resource model.
//!
//! A resource is something processes contend for. Capacity 1 gives
//! mutex semantics; a larger capacity behaves like a counting semaphore.

use serde::{Deserialize, Serialize};

/// A shared resource with a bounded number of concurrent holders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique resource name.
    pub name: String,
    /// Number of simultaneous holders (1 = mutex, >1 = semaphore).
    pub capacity: i64,
}

impl Resource {
    /// Creates a resource with the given capacity.
    pub fn new(name: impl Into<String>, capacity: i64) -> Self {
        Self {
            name: name.into(),
            capacity,
        }
    }

    /// Creates a capacity-1 resource.
    pub fn mutex(name: impl Into<String>) -> Self {
        Self::new(name, 1)
    }

    /// Creates a counting-semaphore resource.
    pub fn semaphore(name: impl Into<String>, capacity: i64) -> Self {
        Self::new(name, capacity)
    }

    /// Whether the declared capacity gives exclusive access.
    pub fn is_mutex(&self) -> bool {
        self.capacity == 1
    }

    /// Whether at least one holder can ever acquire this resource.
    pub fn is_usable(&self) -> bool {
        self.capacity > 0
    }
}
