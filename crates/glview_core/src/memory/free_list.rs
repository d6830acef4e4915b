//! # Free List
//!
//! A locked stack of reusable objects. Allocation pops before creating, and
//! release pushes back instead of dropping.

use parking_lot::Mutex;

/// Thread-safe free list for one size class.
///
/// # Example
///
/// ```rust
/// use glview_core::memory::FreeList;
///
/// let list: FreeList<Vec<u8>> = FreeList::new();
/// let buf = list.obtain_or_else(|| Vec::with_capacity(256));
/// list.recycle(buf);
/// assert_eq!(list.len(), 1);
/// ```
#[derive(Debug)]
pub struct FreeList<T> {
    items: Mutex<Vec<T>>,
}

impl<T> Default for FreeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FreeList<T> {
    /// Creates an empty free list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    /// Pops a pooled object, if any.
    #[must_use]
    pub fn obtain(&self) -> Option<T> {
        self.items.lock().pop()
    }

    /// Pops a pooled object or creates a fresh one.
    pub fn obtain_or_else(&self, create: impl FnOnce() -> T) -> T {
        // Create outside the lock.
        match self.obtain() {
            Some(item) => item,
            None => create(),
        }
    }

    /// Returns an object to the pool.
    pub fn recycle(&self, item: T) {
        self.items.lock().push(item);
    }

    /// Returns many objects under one lock acquisition.
    pub fn recycle_all(&self, items: impl IntoIterator<Item = T>) {
        self.items.lock().extend(items);
    }

    /// Number of pooled objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns true if nothing is pooled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Drops every pooled object.
    pub fn clear(&self) {
        self.items.lock().clear();
    }
}
