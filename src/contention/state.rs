//! Per-resource bookkeeping for the contention simulator.

use crate::heap::MinHeap;
use crate::models::Resource;

/// Live state of one resource during a simulation run.
#[derive(Debug, Clone)]
pub(crate) struct ResourceState {
    /// Capacity as declared in the resource table.
    pub original_capacity: i64,
    /// Capacity actually enforced (1 in mutex mode).
    pub capacity: i64,
    /// Cycles at which current holders release (`access + 1`).
    releases: MinHeap<i64>,
}

/// When a request can be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Grant {
    /// Cycle the ACCESS block starts.
    pub access: i64,
    /// Cycles spent waiting before access (0 = immediate).
    pub waited: i64,
}

impl ResourceState {
    pub fn new(resource: &Resource, mutex: bool) -> Self {
        Self {
            original_capacity: resource.capacity,
            capacity: if mutex { 1 } else { resource.capacity },
            releases: MinHeap::new(),
        }
    }

    /// Whether mutex mode lowered the declared capacity.
    pub fn is_clamped(&self) -> bool {
        self.capacity < self.original_capacity
    }

    /// Number of holds not yet released as of the last request.
    pub fn held(&self) -> usize {
        self.releases.len()
    }

    /// Serves a request made at `cycle` and records the resulting hold.
    ///
    /// 1. Drops holds released strictly before `cycle`.
    /// 2. If every slot is taken, claims the slot that frees first and
    ///    starts there (or at `cycle`, whichever is later).
    /// 3. Records a one-cycle hold from the access cycle.
    pub fn request(&mut self, cycle: i64) -> Grant {
        while let Ok(release) = self.releases.pop() {
            if release >= cycle {
                self.releases.insert(release);
                break;
            }
        }

        let mut access = cycle;
        if self.held() as i64 >= self.capacity {
            if let Ok(next_free) = self.releases.pop() {
                access = next_free.max(cycle);
            }
        }

        self.releases.insert(access + 1);
        Grant {
            access,
            waited: access - cycle,
        }
    }
}
