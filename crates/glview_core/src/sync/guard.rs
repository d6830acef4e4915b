//! # Resource Guard
//!
//! One atomic state enum keeping "advance the resource" and "release the
//! resource" from ever running at the same time.
//!
//! ## Transition Table
//!
//! ```text
//! from \ call            try_acquire   release_busy          request_release
//! Idle                   -> Busy       -                     -> Releasing (now)
//! Busy                   fail          -> Idle               -> BusyReleaseRequested
//! BusyReleaseRequested   fail          -> Releasing (now)    already
//! Releasing              fail          -                     already
//! Released               fail          -                     already
//! ```
//!
//! Whoever moves the guard into `Releasing` performs the release and then
//! calls [`ResourceGuard::mark_released`].

use std::sync::atomic::{AtomicU8, Ordering};

/// Observable guard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GuardState {
    /// Nobody is using the resource.
    Idle = 0,
    /// A worker is advancing the resource.
    Busy = 1,
    /// A worker is advancing and a release is waiting for it.
    BusyReleaseRequested = 2,
    /// Release in progress.
    Releasing = 3,
    /// Released for good.
    Released = 4,
}

impl GuardState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Busy,
            2 => Self::BusyReleaseRequested,
            3 => Self::Releasing,
            _ => Self::Released,
        }
    }
}

/// What the worker must do after finishing a busy section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyOutcome {
    /// Carry on, the resource is idle again.
    Continue,
    /// A release was requested meanwhile. The caller must release now.
    ReleaseNow,
}

/// Answer to a release request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseRequest {
    /// The resource was idle. The caller must release now.
    ReleaseNow,
    /// A worker holds the resource and will release it.
    Deferred,
    /// A release already happened or is scheduled.
    AlreadyReleased,
}

/// Lock-free busy/release state machine.
#[derive(Debug)]
pub struct ResourceGuard {
    state: AtomicU8,
}

impl Default for ResourceGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceGuard {
    /// Creates an idle guard.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(GuardState::Idle as u8),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> GuardState {
        GuardState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Enters the busy section. Fails unless the guard is idle.
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        self.transition(GuardState::Idle, GuardState::Busy)
    }

    /// Leaves the busy section.
    ///
    /// # Panics
    ///
    /// Panics if the guard was not busy.
    pub fn release_busy(&self) -> BusyOutcome {
        if self.transition(GuardState::Busy, GuardState::Idle) {
            return BusyOutcome::Continue;
        }
        if self.transition(GuardState::BusyReleaseRequested, GuardState::Releasing) {
            return BusyOutcome::ReleaseNow;
        }
        panic!("release_busy called in state {:?}", self.state());
    }

    /// Asks for the resource to be released.
    pub fn request_release(&self) -> ReleaseRequest {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let (next, answer) = match GuardState::from_u8(current) {
                GuardState::Idle => (GuardState::Releasing, ReleaseRequest::ReleaseNow),
                GuardState::Busy => (GuardState::BusyReleaseRequested, ReleaseRequest::Deferred),
                _ => return ReleaseRequest::AlreadyReleased,
            };
            match self.state.compare_exchange_weak(
                current,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return answer,
                Err(actual) => current = actual,
            }
        }
    }

    /// Finishes a release started by `request_release` or `release_busy`.
    pub fn mark_released(&self) {
        self.state
            .store(GuardState::Released as u8, Ordering::Release);
    }

    /// Returns true once a release has been requested or performed.
    #[must_use]
    pub fn is_released(&self) -> bool {
        !matches!(self.state(), GuardState::Idle | GuardState::Busy)
    }

    fn transition(&self, from: GuardState, to: GuardState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
