//! # Pooled Memory
//!
//! Objects that are expensive to create (GPU-backed tiles) are recycled
//! through per-size-class free lists instead of being dropped.

mod free_list;

pub use free_list::FreeList;
