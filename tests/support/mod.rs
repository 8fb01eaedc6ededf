use std::sync::Mutex;

// Env vars are process-global; tests that touch them must not interleave.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily set or removed.
///
/// Holds a process-wide lock for the duration of `f` (cargo runs tests in
/// parallel) and restores the previous values afterwards, also on panic.
///
/// Each `(key, value)` pair applies as:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = match ENV_LOCK.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    let mut restore: Vec<(String, Option<String>)> = Vec::with_capacity(vars.len());
    for (key, value) in vars {
        restore.push((key.to_string(), std::env::var(key).ok()));
        match value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
    }
    let _guard = RestoreEnv(restore);

    f()
}

struct RestoreEnv(Vec<(String, Option<String>)>);

impl Drop for RestoreEnv {
    fn drop(&mut self) {
        // Restore in reverse so duplicate keys end up at their original value.
        for (key, value) in self.0.drain(..).rev() {
            match value {
                Some(v) => std::env::set_var(&key, v),
                None => std::env::remove_var(&key),
            }
        }
    }
}
