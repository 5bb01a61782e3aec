//! Async collaborator seams.
//!
//! The editor never talks to a backend directly; it goes through these
//! traits so the hosted service, a local directory and the in-memory test
//! double are interchangeable.

use async_trait::async_trait;
use tablekit_core::Result;
use tablekit_layout::{Issue, Table, TableUpdate};

/// Table documents and the store-to-table join.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn load_table(&self, table_id: &str) -> Result<Table>;

    /// Overwrites the persisted `{devices, slots, image_url, image_scale}`.
    async fn update_table(&self, table_id: &str, update: TableUpdate) -> Result<()>;

    /// Tables placed in a store, in join order.
    async fn tables_for_store(&self, store_id: &str) -> Result<Vec<Table>>;
}

/// Public image hosting.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Uploads `bytes` and returns the public URL.
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String>;
}

/// Issue reports for a store.
#[async_trait]
pub trait IssueSource: Send + Sync {
    async fn issues_for_store(&self, store_id: &str) -> Result<Vec<Issue>>;
}
