//! In-process backend for tests and offline demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tablekit_core::{Result, StoreError};
use tablekit_layout::{Issue, Table, TableUpdate};
use tracing::debug;

use crate::blob::{check_upload, object_name};
use crate::traits::{BlobStore, IssueSource, TableStore};

/// Holds tables, the store join, uploaded blobs and issues in memory.
#[derive(Debug)]
pub struct MemoryBackend {
    base_url: String,
    tables: RwLock<HashMap<String, Table>>,
    /// `(store_id, table_id)` rows.
    store_tables: RwLock<Vec<(String, String)>>,
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    issues: RwLock<HashMap<String, Vec<Issue>>>,
    offline: AtomicBool,
    write_delay_ms: AtomicUsize,
    writes: AtomicUsize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new("memory://blobs")
    }
}

impl MemoryBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            tables: RwLock::new(HashMap::new()),
            store_tables: RwLock::new(Vec::new()),
            blobs: RwLock::new(HashMap::new()),
            issues: RwLock::new(HashMap::new()),
            offline: AtomicBool::new(false),
            write_delay_ms: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn insert_table(&self, table: Table) {
        self.tables.write().insert(table.id.clone(), table);
    }

    /// Adds a store-to-table join row.
    pub fn link(&self, store_id: impl Into<String>, table_id: impl Into<String>) {
        self.store_tables
            .write()
            .push((store_id.into(), table_id.into()));
    }

    pub fn add_issue(&self, store_id: impl Into<String>, issue: Issue) {
        self.issues
            .write()
            .entry(store_id.into())
            .or_default()
            .push(issue);
    }

    /// Current persisted copy of a table.
    pub fn table(&self, table_id: &str) -> Option<Table> {
        self.tables.read().get(table_id).cloned()
    }

    pub fn blob(&self, url: &str) -> Option<Vec<u8>> {
        self.blobs.read().get(url).cloned()
    }

    /// Makes every request fail as if the backend were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delays table writes, for exercising in-flight saves.
    pub fn set_write_delay(&self, delay: Duration) {
        self.write_delay_ms
            .store(delay.as_millis() as usize, Ordering::SeqCst);
    }

    /// Number of completed table writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Backend {
                reason: "backend offline".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl TableStore for MemoryBackend {
    async fn load_table(&self, table_id: &str) -> Result<Table> {
        self.ensure_online()?;
        self.table(table_id).ok_or_else(|| {
            StoreError::NotFound {
                kind: "table".to_string(),
                id: table_id.to_string(),
            }
            .into()
        })
    }

    async fn update_table(&self, table_id: &str, update: TableUpdate) -> Result<()> {
        self.ensure_online()?;
        let delay = self.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
        }

        let mut tables = self.tables.write();
        let table = tables
            .get_mut(table_id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "table".to_string(),
                id: table_id.to_string(),
            })?;
        table.apply_update(update);
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!("Memory backend wrote table {}", table_id);
        Ok(())
    }

    async fn tables_for_store(&self, store_id: &str) -> Result<Vec<Table>> {
        self.ensure_online()?;
        let tables = self.tables.read();
        Ok(self
            .store_tables
            .read()
            .iter()
            .filter(|(store, _)| store == store_id)
            .filter_map(|(_, table_id)| tables.get(table_id).cloned())
            .collect())
    }
}

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        self.ensure_online()?;
        check_upload(file_name, &bytes)?;
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            object_name(file_name)
        );
        self.blobs.write().insert(url.clone(), bytes);
        Ok(url)
    }
}

#[async_trait]
impl IssueSource for MemoryBackend {
    async fn issues_for_store(&self, store_id: &str) -> Result<Vec<Issue>> {
        self.ensure_online()?;
        Ok(self
            .issues
            .read()
            .get(store_id)
            .cloned()
            .unwrap_or_default())
    }
}
