//! Lock helpers.

use std::sync::{Mutex, MutexGuard};
use tracing::warn;

/// Locks `mutex`, recovering the guard if a previous holder panicked.
///
/// Every critical section in this crate leaves its data consistent before
/// any call that could panic, so a poisoned lock still guards valid state.
pub(crate) fn lock<'a, T>(mutex: &'a Mutex<T>, name: &'static str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!(lock = name, "Recovering poisoned lock");
        poisoned.into_inner()
    })
}
