//! Directory of JSON documents.
//!
//! ```text
//! <root>/
//!   tables/<table_id>.json
//!   store_tables.json        [{"store_id": .., "table_id": ..}, ..]
//!   issues/<store_id>.json   [Issue, ..]
//!   blobs/<object name>
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tablekit_core::{Result, StoreError};
use tablekit_layout::{Issue, Table, TableUpdate};
use tracing::{debug, info};

use crate::blob::{check_upload, object_name};
use crate::traits::{BlobStore, IssueSource, TableStore};

const TABLES_DIR: &str = "tables";
const ISSUES_DIR: &str = "issues";
const BLOBS_DIR: &str = "blobs";
const JOIN_FILE: &str = "store_tables.json";

/// One row of the store-to-table join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTableRow {
    pub store_id: String,
    pub table_id: String,
}

/// Filesystem-backed store.
#[derive(Debug, Clone)]
pub struct JsonDirectoryStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl JsonDirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            public_base_url: None,
        }
    }

    /// Serves uploaded blobs under `base_url` instead of `file://` paths.
    pub fn with_public_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.public_base_url = Some(base_url.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, table_id: &str) -> Result<PathBuf> {
        Ok(self
            .root
            .join(TABLES_DIR)
            .join(format!("{}.json", checked_id("table", table_id)?)))
    }

    /// Writes a whole table document, creating directories as needed.
    pub async fn save_table(&self, table: &Table) -> Result<()> {
        let path = self.table_path(&table.id)?;
        write_json(&path, table).await?;
        info!("Saved table {} to {}", table.id, path.display());
        Ok(())
    }

    /// Appends a join row unless it already exists.
    pub async fn link(&self, store_id: &str, table_id: &str) -> Result<()> {
        let mut rows = self.join_rows().await?;
        let row = StoreTableRow {
            store_id: store_id.to_string(),
            table_id: table_id.to_string(),
        };
        if !rows.contains(&row) {
            rows.push(row);
            write_json(&self.root.join(JOIN_FILE), &rows).await?;
        }
        Ok(())
    }

    pub async fn save_issues(&self, store_id: &str, issues: &[Issue]) -> Result<()> {
        let path = self
            .root
            .join(ISSUES_DIR)
            .join(format!("{}.json", checked_id("store", store_id)?));
        write_json(&path, issues).await
    }

    async fn join_rows(&self) -> Result<Vec<StoreTableRow>> {
        let path = self.root.join(JOIN_FILE);
        match read_optional(&path).await? {
            Some(text) => serde_json::from_str(&text).map_err(|e| {
                StoreError::Malformed {
                    kind: "store join".to_string(),
                    id: JOIN_FILE.to_string(),
                    reason: e.to_string(),
                }
                .into()
            }),
            None => Ok(Vec::new()),
        }
    }

    fn blob_url(&self, path: &Path, name: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), name),
            None => format!("file://{}", path.display()),
        }
    }
}

#[async_trait]
impl TableStore for JsonDirectoryStore {
    async fn load_table(&self, table_id: &str) -> Result<Table> {
        let path = self.table_path(table_id)?;
        let text = read_optional(&path)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                kind: "table".to_string(),
                id: table_id.to_string(),
            })?;
        let table: Table = serde_json::from_str(&text).map_err(|e| StoreError::Malformed {
            kind: "table".to_string(),
            id: table_id.to_string(),
            reason: e.to_string(),
        })?;
        debug!("Loaded table {} from {}", table_id, path.display());
        Ok(table)
    }

    async fn update_table(&self, table_id: &str, update: TableUpdate) -> Result<()> {
        let mut table = self.load_table(table_id).await?;
        table.apply_update(update);
        self.save_table(&table).await
    }

    async fn tables_for_store(&self, store_id: &str) -> Result<Vec<Table>> {
        let mut tables = Vec::new();
        for row in self.join_rows().await? {
            if row.store_id != store_id {
                continue;
            }
            match self.load_table(&row.table_id).await {
                Ok(table) => tables.push(table),
                Err(tablekit_core::Error::Store(StoreError::NotFound { .. })) => {
                    debug!("Join row points at missing table {}", row.table_id);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(tables)
    }
}

#[async_trait]
impl BlobStore for JsonDirectoryStore {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        check_upload(file_name, &bytes)?;
        let name = object_name(file_name);
        let dir = self.root.join(BLOBS_DIR);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(&name);
        tokio::fs::write(&path, &bytes).await?;
        info!("Stored upload {} ({} bytes)", name, bytes.len());
        Ok(self.blob_url(&path, &name))
    }
}

#[async_trait]
impl IssueSource for JsonDirectoryStore {
    async fn issues_for_store(&self, store_id: &str) -> Result<Vec<Issue>> {
        let path = self
            .root
            .join(ISSUES_DIR)
            .join(format!("{}.json", checked_id("store", store_id)?));
        match read_optional(&path).await? {
            Some(text) => serde_json::from_str(&text).map_err(|e| {
                StoreError::Malformed {
                    kind: "issues".to_string(),
                    id: store_id.to_string(),
                    reason: e.to_string(),
                }
                .into()
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// Ids become file names; anything that could leave the directory is refused.
fn checked_id<'a>(kind: &str, id: &'a str) -> Result<&'a str> {
    let valid = !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0']);
    if valid {
        Ok(id)
    } else {
        Err(StoreError::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
        .into())
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Writes through a sibling temp file so readers never see half a document.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
