//! Array-backed binary min-heap.
//!
//! Orders items by an integer key supplied through [`HeapKey`]. The
//! preemptive scheduler keys processes by remaining burst time; the
//! contention simulator keys plain cycle numbers by themselves.
//!
//! # Tie-breaking
//! Sift-down descends into the right child only when its key is strictly
//! smaller than the left child's, and keeps swapping while the parent's
//! key is not strictly smaller than the chosen child's. Equal keys carry
//! no stability guarantee beyond that rule.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 6 (Heapsort)

use crate::error::SimError;
use crate::models::Process;

/// Supplies the ordering key of a heap item.
pub trait HeapKey {
    /// Smaller keys surface first.
    fn heap_key(&self) -> i64;
}

impl HeapKey for i64 {
    fn heap_key(&self) -> i64 {
        *self
    }
}

/// Binary min-heap over `T`, ordered by [`HeapKey::heap_key`].
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    items: Vec<T>,
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: HeapKey> MinHeap<T> {
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty heap with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Inserts an item. O(log n).
    pub fn insert(&mut self, item: T) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    /// Returns the minimum item without removing it.
    pub fn peek(&self) -> Result<&T, SimError> {
        self.items.first().ok_or(SimError::EmptyQueue)
    }

    /// Removes and returns the minimum item. O(log n).
    pub fn pop(&mut self) -> Result<T, SimError> {
        if self.items.is_empty() {
            return Err(SimError::EmptyQueue);
        }
        let top = self.items.swap_remove(0);
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        Ok(top)
    }

    /// Removes the first item (in array order) matching `pred`.
    ///
    /// The hole is filled with the last item, which is then sifted up if
    /// it is smaller than its new parent, otherwise down. O(n).
    pub fn remove_where<F>(&mut self, mut pred: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let index = self.items.iter().position(|item| pred(item))?;
        let removed = self.items.swap_remove(index);
        if index < self.items.len() {
            match parent(index) {
                Some(p) if self.key(p) > self.key(index) => self.sift_up(index),
                _ => self.sift_down(index),
            }
        }
        Some(removed)
    }

    /// Whether the heap holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Removes all items.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Items in internal array order (not sorted).
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    #[inline]
    fn key(&self, index: usize) -> i64 {
        self.items[index].heap_key()
    }

    fn sift_up(&mut self, mut index: usize) {
        while let Some(p) = parent(index) {
            if self.key(p) <= self.key(index) {
                break;
            }
            self.items.swap(p, index);
            index = p;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut child = left;
            if right < len && self.key(right) < self.key(left) {
                child = right;
            }
            if self.key(index) < self.key(child) {
                break;
            }
            self.items.swap(index, child);
            index = child;
        }
    }
}

impl MinHeap<Process> {
    /// Removes the process with the given pid. Returns whether it was found.
    pub fn remove_by_pid(&mut self, pid: &str) -> bool {
        self.remove_where(|p| p.pid == pid).is_some()
    }
}

#[inline]
fn parent(index: usize) -> Option<usize> {
    if index == 0 {
        None
    } else {
        Some((index - 1) / 2)
    }
}
