use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::engine::Persistence;
use crate::{Error, KVReader, KVWriter, KeyEnumeration, Result};

type StoreData = HashMap<String, String>;

/// In-memory key-value store with optional write-behind persistence.
///
/// Reads and writes are served from memory. When a [`Persistence`] is attached,
/// every write schedules a blocking disk write of the touched key; call
/// [`MemStore::wait`] to drain them before shutdown.
pub struct MemStore {
    data: Arc<RwLock<StoreData>>,
    persistence: Option<Arc<Persistence>>,
    pending_tasks: Arc<AtomicUsize>,
}

impl MemStore {
    pub fn new(initial_data: StoreData, persistence: Option<Arc<Persistence>>) -> Self {
        Self {
            data: Arc::new(RwLock::new(initial_data)),
            persistence,
            pending_tasks: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(HashMap::new(), None)
    }

    pub async fn wait(&self) {
        while self.pending_tasks.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    fn read_data(&self) -> Result<std::sync::RwLockReadGuard<'_, StoreData>> {
        self.data
            .read()
            .map_err(|_| Error::Internal("store lock poisoned".to_string()))
    }

    fn write_data(&self) -> Result<std::sync::RwLockWriteGuard<'_, StoreData>> {
        self.data
            .write()
            .map_err(|_| Error::Internal("store lock poisoned".to_string()))
    }

    // The blocking task reads the key when it runs, so whichever task runs last
    // writes the latest value even if tasks are scheduled out of order.
    fn persist(&self, key: String) {
        if let Some(p) = &self.persistence {
            let p = p.clone();
            let data = self.data.clone();
            let pending = self.pending_tasks.clone();
            pending.fetch_add(1, Ordering::SeqCst);
            tokio::task::spawn_blocking(move || {
                let res = p.sync_key(&key, || {
                    data.read()
                        .map(|d| d.get(&key).cloned())
                        .map_err(|_| Error::Internal("store lock poisoned".to_string()))
                });
                if let Err(e) = res {
                    log::error!("Failed to persist key {}: {}", key, e);
                }
                pending.fetch_sub(1, Ordering::SeqCst);
            });
        }
    }
}

#[async_trait]
impl KVReader for MemStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_data()?.get(key).cloned())
    }
}

#[async_trait]
impl KVWriter for MemStore {
    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.write_data()?.insert(key.to_string(), value);
        self.persist(key.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let removed = self.write_data()?.remove(key).is_some();
        if removed {
            self.persist(key.to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl KeyEnumeration for MemStore {
    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.read_data()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
