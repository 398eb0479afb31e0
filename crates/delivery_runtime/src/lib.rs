//! Async runtime around the dispatch engine.
//!
//! This crate owns the timing side of playback (a tokio interval task per
//! run) and the async, single-flight side of route synthesis. The engine
//! itself stays synchronous in `delivery_core`.

pub mod config;
pub mod error;
pub mod session;
pub mod ticker;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use config::SessionConfig;
pub use error::SessionError;
pub use session::DispatchSession;

/// Lock `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
