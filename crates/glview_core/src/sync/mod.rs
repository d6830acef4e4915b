//! # Synchronization Primitives
//!
//! ```text
//! UI thread         Render thread              Decode workers
//!    │                   │                          │
//!    │ recycle() ───► ResourceGuard ◄─── advance ───┤
//!    │                   │                          │
//!    │                   │            AdmissionGate (N permits)
//!    │                   │                          │
//!    └─── execute() ────────────────────────► WorkerPool
//! ```
//!
//! - [`AdmissionGate`] bounds simultaneous decode-heavy work.
//! - [`ResourceGuard`] keeps advance and release of one resource apart.
//! - [`WorkerPool`] runs the background tasks.

mod gate;
mod guard;
mod worker;

pub use gate::{AdmissionGate, GatePermit};
pub use guard::{BusyOutcome, GuardState, ReleaseRequest, ResourceGuard};
pub use worker::{WorkerPool, WorkerStats};
