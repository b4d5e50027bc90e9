//! Shared helpers for unit tests.

use std::sync::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Sets or removes an environment variable and restores it on drop.
///
/// Holds a process-wide lock so tests touching `COGNITA_*` variables run
/// one at a time.
pub(crate) struct EnvGuard {
    key: String,
    prev: Option<String>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    pub(crate) fn new(key: &str, value: &str) -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let prev = std::env::var(key).ok();
        // SAFETY: mutation is serialized by ENV_LOCK.
        unsafe { std::env::set_var(key, value) };
        Self {
            key: key.to_string(),
            prev,
            _lock: lock,
        }
    }

    pub(crate) fn remove(key: &str) -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let prev = std::env::var(key).ok();
        // SAFETY: mutation is serialized by ENV_LOCK.
        unsafe { std::env::remove_var(key) };
        Self {
            key: key.to_string(),
            prev,
            _lock: lock,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: the lock is still held until this guard is dropped.
        unsafe {
            match &self.prev {
                Some(val) => std::env::set_var(&self.key, val),
                None => std::env::remove_var(&self.key),
            }
        }
    }
}
