//! Per-key serialisation for check-then-write sections.
//!
//! The uniqueness invariants (one account per email, one response per
//! survey/merchant pair) are enforced by a read followed by a write, which
//! is racy under concurrent identical requests. The stores offer no
//! conditional-write primitive here, so handlers serialise the section
//! through an async lock keyed by the uniqueness tuple. This is
//! best-effort: it covers one process only, and a multi-process deployment
//! can still race.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Map of named async locks, one per uniqueness key.
///
/// Lock entries are created on first use and retained for the process
/// lifetime; the key space (emails seen, survey/merchant pairs seen) is
/// bounded by store content.
///
/// # Examples
/// ```
/// use backend::domain::KeyedLock;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let locks = KeyedLock::default();
/// let guard = locks.acquire("email:a@b.c").await;
/// drop(guard);
/// # });
/// ```
#[derive(Clone, Default)]
pub struct KeyedLock {
    entries: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl KeyedLock {
    /// Acquire the lock for `key`, waiting if another task holds it.
    pub async fn acquire(&self, key: impl Into<String>) -> OwnedMutexGuard<()> {
        let entry = {
            let mut entries = self
                .entries
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(entries.entry(key.into()).or_default())
        };
        entry.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn same_key_serialises_critical_sections() {
        let locks = KeyedLock::default();
        let concurrent = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let locks = locks.clone();
                let concurrent = Arc::clone(&concurrent);
                let peak = Arc::clone(&peak);
                tokio::spawn(async move {
                    let _guard = locks.acquire("email:a@b.c").await;
                    let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    concurrent.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for task in tasks {
            task.await.expect("task");
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_keys_do_not_block_each_other() {
        let locks = KeyedLock::default();
        let first = locks.acquire("response:s1:m1").await;
        // Must not deadlock: a distinct key has its own mutex.
        let second = locks.acquire("response:s1:m2").await;
        drop(first);
        drop(second);
    }
}
