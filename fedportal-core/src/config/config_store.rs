//! Reloadable config section.
//!
//! Handlers read a [`ConfigStore`] like any shared lock. Background tasks
//! that derive state from it (the expiry sweep interval) hold a
//! [`ConfigWatcher`] and rebuild that state when a SIGHUP reload lands.

use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, watch};

/// A config section plus a reload counter.
pub struct ConfigStore<T> {
    data: Arc<RwLock<T>>,
    reloads: Arc<watch::Sender<u64>>,
}

pub struct ConfigWatcher {
    reloads: watch::Receiver<u64>,
}

impl<T> ConfigStore<T> {
    pub fn new(initial: T) -> Self {
        let (reloads, _) = watch::channel(0);
        Self {
            data: Arc::new(RwLock::new(initial)),
            reloads: Arc::new(reloads),
        }
    }

    /// Swap in a reloaded section and wake every watcher.
    ///
    /// Returns the new reload count.
    pub async fn update(&self, value: T) -> u64 {
        *self.data.write().await = value;
        let mut count = 0;
        self.reloads.send_modify(|reloads| {
            *reloads += 1;
            count = *reloads;
        });
        count
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, T> {
        self.data.read().await
    }

    /// Copy the section out so no lock is held across later awaits.
    pub async fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.data.read().await.clone()
    }

    /// Number of reloads applied since startup.
    pub fn version(&self) -> u64 {
        *self.reloads.borrow()
    }

    pub fn subscribe(&self) -> ConfigWatcher {
        ConfigWatcher {
            reloads: self.reloads.subscribe(),
        }
    }
}

impl<T> Clone for ConfigStore<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            reloads: Arc::clone(&self.reloads),
        }
    }
}

impl ConfigWatcher {
    /// Resolves on the next reload. Errors once every store handle is gone.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.reloads.changed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_reload_wakes_watcher() {
        let store = ConfigStore::new(Duration::from_secs(60));
        let mut watcher = store.subscribe();

        let writer = store.clone();
        tokio::spawn(async move { writer.update(Duration::from_secs(5)).await });

        watcher.changed().await.unwrap();
        assert_eq!(*store.read().await, Duration::from_secs(5));
        assert_eq!(store.version(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_does_not_block_reload() {
        let store = ConfigStore::new(String::from("before"));
        let snapshot = store.snapshot().await;

        tokio::time::timeout(Duration::from_secs(1), store.update("after".to_string()))
            .await
            .unwrap();
        assert_eq!(snapshot, "before");
        assert_eq!(*store.read().await, "after");
    }

    #[tokio::test]
    async fn test_watcher_errors_after_store_dropped() {
        let store = ConfigStore::new(0u8);
        let mut watcher = store.subscribe();
        drop(store);
        assert!(watcher.changed().await.is_err());
    }
}
