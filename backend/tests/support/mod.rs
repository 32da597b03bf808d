//! Helpers shared by integration tests.

use std::sync::{Mutex, PoisonError};

/// Serialises every test that touches process environment variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Restores the captured variables when dropped, including on panic.
struct EnvRestore(Vec<(String, Option<String>)>);

impl Drop for EnvRestore {
    fn drop(&mut self) {
        for (key, previous) in self.0.drain(..).rev() {
            match previous {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}

/// Run `f` with the given variables set (`Some`) or removed (`None`).
pub fn with_scoped_env<R>(changes: &[(&str, Option<&str>)], f: impl FnOnce() -> R) -> R {
    let _lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

    let mut restore = EnvRestore(Vec::with_capacity(changes.len()));
    for (key, value) in changes {
        restore.0.push((key.to_string(), std::env::var(key).ok()));
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }

    f()
}
