//! The database registry (C2): a process-wide name → store-handle map.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::StoreOptions;
use crate::engine::{RocksStore, Store};

/// Produces a process-wide unique tag for a deletion's staging directory
/// name, so repeated deletes of the same database name can never collide
/// with a still-draining background removal from an earlier delete.
fn next_deletion_tag() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// A reference-counted, thread-safe handle to one opened database.
///
/// Multiple sessions may hold the same handle; the underlying store stays
/// open as long as any handle to it exists.
pub type StoreHandle = Arc<dyn Store>;

/// The process-wide map from database name to opened store handle.
///
/// Guarded by a single reader-writer lock: `open`/`list` take shared
/// access, `create`/`delete` take exclusive access. The registry is the
/// sole creator of store handles.
pub struct Registry {
    data_dir: PathBuf,
    options: StoreOptions,
    databases: RwLock<HashMap<String, StoreHandle>>,
}

impl Registry {
    /// Builds a registry rooted at `data_dir`, bootstrapping it by opening
    /// every immediate subdirectory that is a valid store. Subdirectories
    /// that fail to open are silently skipped — a corrupt one does not
    /// prevent startup.
    pub async fn bootstrap(data_dir: PathBuf, options: StoreOptions) -> std::io::Result<Self> {
        let mut databases = HashMap::new();

        let mut entries = tokio::fs::read_dir(&data_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            let path = entry.path();
            let options = options.clone();
            let opened =
                tokio::task::spawn_blocking(move || RocksStore::open(&path, &options)).await;
            match opened {
                Ok(Ok(store)) => {
                    databases.insert(name, Arc::new(store) as StoreHandle);
                }
                Ok(Err(err)) => {
                    log::debug!("skipping {name} at bootstrap: {err}");
                }
                Err(err) => {
                    log::warn!("bootstrap task for {name} panicked: {err}");
                }
            }
        }

        Ok(Registry {
            data_dir,
            options,
            databases: RwLock::new(databases),
        })
    }

    fn db_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Pure lookup: never opens a database on demand.
    pub async fn open(&self, name: &str) -> Option<StoreHandle> {
        self.databases.read().await.get(name).cloned()
    }

    /// Creates and registers a new database named `name`.
    ///
    /// Uses an optimistic two-phase pattern: a shared-lock existence check
    /// to fail fast, then the (possibly slow) store open outside any lock,
    /// then an exclusive-lock re-check before inserting. The re-check
    /// closes the race where two concurrent `create` calls for the same
    /// name both pass the first check — the second caller is rejected.
    pub async fn create(&self, name: &str) -> bool {
        if self.databases.read().await.contains_key(name) {
            return false;
        }

        let path = self.db_path(name);
        let options = self.options.clone();
        let opened = match tokio::task::spawn_blocking(move || RocksStore::open(&path, &options))
            .await
        {
            Ok(Ok(store)) => store,
            Ok(Err(err)) => {
                log::warn!("failed to create database {name}: {err}");
                return false;
            }
            Err(err) => {
                log::warn!("create task for {name} panicked: {err}");
                return false;
            }
        };

        let mut databases = self.databases.write().await;
        if databases.contains_key(name) {
            // Lost the race to a concurrent create; reject this caller.
            return false;
        }
        databases.insert(name.to_string(), Arc::new(opened) as StoreHandle);
        true
    }

    /// Removes `name` from the registry, then deletes its on-disk
    /// directory.
    ///
    /// The directory is renamed aside before the recursive delete runs on a
    /// blocking task, so sessions that still hold the evicted handle keep
    /// operating against the (unlinked but open) files until their
    /// reference drops, rather than racing a live store against its own
    /// removal.
    pub async fn delete(&self, name: &str) -> bool {
        let removed = self.databases.write().await.remove(name).is_some();
        if !removed {
            return false;
        }

        let path = self.db_path(name);
        let staging = self.data_dir.join(format!(".{name}.deleted-{}", next_deletion_tag()));
        if let Err(err) = tokio::fs::rename(&path, &staging).await {
            log::warn!("failed to stage {name} for deletion: {err}");
            return true;
        }
        tokio::task::spawn(async move {
            if let Err(err) = tokio::fs::remove_dir_all(&staging).await {
                log::warn!("failed to remove staged directory {}: {err}", staging.display());
            }
        });
        true
    }

    /// Lists all registered database names, in no particular order.
    pub async fn list(&self) -> Vec<String> {
        self.databases.read().await.keys().cloned().collect()
    }
}
