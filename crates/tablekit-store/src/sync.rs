//! Saving and loading on behalf of the editor.
//!
//! Saves are fire and forget: `save` spawns a task and returns at once.
//! Failures are published as notifications and never roll back the working
//! copy. A newer save of the same table aborts the older one still in
//! flight, so the last write wins.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tablekit_core::{
    AppEvent, Error, EventBus, Notification, Result, Size, StorageEvent,
};
use tablekit_layout::{MissingDeviceMatcher, Table, TableEditor, TableUpdate};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::traits::{BlobStore, IssueSource, TableStore};

/// Tables of one store together with their open missing-device issues.
#[derive(Debug, Clone)]
pub struct StoreOverview {
    pub store_id: String,
    pub tables: Vec<Table>,
    pub missing: MissingDeviceMatcher,
}

/// Persistence front for editors.
pub struct TableSync {
    tables: Arc<dyn TableStore>,
    blobs: Arc<dyn BlobStore>,
    issues: Arc<dyn IssueSource>,
    bus: Arc<EventBus>,
    in_flight: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TableSync {
    pub fn new(
        tables: Arc<dyn TableStore>,
        blobs: Arc<dyn BlobStore>,
        issues: Arc<dyn IssueSource>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            tables,
            blobs,
            issues,
            bus,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Uses one backend for all three collaborators.
    pub fn with_backend<B>(backend: Arc<B>, bus: Arc<EventBus>) -> Self
    where
        B: TableStore + BlobStore + IssueSource + 'static,
    {
        Self::new(backend.clone(), backend.clone(), backend, bus)
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Loads a table; failures are also published as an error notification.
    pub async fn load(&self, table_id: &str) -> Result<Table> {
        match self.tables.load_table(table_id).await {
            Ok(table) => {
                info!("Loaded table {} ({} devices)", table.id, table.devices.len());
                self.bus.publish(AppEvent::Storage(StorageEvent::TableLoaded {
                    table_id: table.id.clone(),
                    devices: table.devices.len(),
                }));
                Ok(table)
            }
            Err(err) => {
                error!("Loading table {} failed: {}", table_id, err);
                self.bus.notify(Notification::error(
                    "load_failed",
                    format!("Could not load table {}: {}", table_id, err),
                ));
                Err(err)
            }
        }
    }

    /// Tables of a store with their missing-device matcher.
    pub async fn store_overview(&self, store_id: &str) -> Result<StoreOverview> {
        let tables = self.tables.tables_for_store(store_id).await?;
        let missing = match self.issues.issues_for_store(store_id).await {
            Ok(issues) => MissingDeviceMatcher::new(issues),
            Err(err) => {
                // tables are still worth showing without issue markers
                warn!("Issues for store {} unavailable: {}", store_id, err);
                self.bus.notify(Notification::warning(
                    "issues_unavailable",
                    format!("Missing-device markers are unavailable: {}", err),
                ));
                MissingDeviceMatcher::default()
            }
        };
        Ok(StoreOverview {
            store_id: store_id.to_string(),
            tables,
            missing,
        })
    }

    /// Starts saving `update` in the background and returns immediately.
    ///
    /// Needs a running tokio runtime.
    pub fn save(&self, table_id: &str, update: TableUpdate) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::other(format!("No async runtime for save: {}", e)))?;

        let store = self.tables.clone();
        let bus = self.bus.clone();
        let id = table_id.to_string();
        let handle = runtime.spawn(async move {
            match store.update_table(&id, update).await {
                Ok(()) => {
                    info!("Saved table {}", id);
                    bus.publish(AppEvent::Storage(StorageEvent::TableSaved {
                        table_id: id,
                    }));
                }
                Err(err) => {
                    error!("Saving table {} failed: {}", id, err);
                    bus.publish(AppEvent::Storage(StorageEvent::SaveFailed {
                        table_id: id.clone(),
                        reason: err.to_string(),
                    }));
                    bus.notify(Notification::error(
                        "save_failed",
                        format!("Changes to table {} were not saved: {}", id, err),
                    ));
                }
            }
        });

        let mut in_flight = self.in_flight.lock();
        in_flight.retain(|_, h| !h.is_finished());
        if let Some(previous) = in_flight.insert(table_id.to_string(), handle) {
            previous.abort();
        }
        Ok(())
    }

    /// Saves the editor's working copy and clears its dirty flag.
    pub fn save_editor(&self, editor: &mut TableEditor) -> Result<()> {
        let table_id = editor.table().id.clone();
        self.save(&table_id, editor.to_update())?;
        editor.mark_saved();
        Ok(())
    }

    /// Uploads an image and swaps it into the editor. The table is saved
    /// afterwards so the new URL is persisted with the cleared slots.
    pub async fn upload_image(
        &self,
        editor: &mut TableEditor,
        file_name: &str,
        bytes: Vec<u8>,
        natural: Size,
    ) -> Result<String> {
        let table_id = editor.table().id.clone();
        let url = match self.blobs.upload(file_name, bytes).await {
            Ok(url) => url,
            Err(err) => {
                error!("Upload of {} failed: {}", file_name, err);
                self.bus.notify(Notification::error(
                    "upload_failed",
                    format!("Could not upload {}: {}", file_name, err),
                ));
                return Err(err);
            }
        };
        self.bus.publish(AppEvent::Storage(StorageEvent::ImageUploaded {
            table_id: table_id.clone(),
            url: url.clone(),
        }));

        editor.replace_image(url.clone(), natural)?;
        self.save_editor(editor)?;
        Ok(url)
    }

    /// Number of saves still running.
    pub fn in_flight(&self) -> usize {
        self.in_flight
            .lock()
            .values()
            .filter(|h| !h.is_finished())
            .count()
    }

    /// Waits for every running save to finish.
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> =
            self.in_flight.lock().drain().map(|(_, h)| h).collect();
        for handle in handles {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    warn!("Save task ended abnormally: {}", err);
                }
            }
        }
    }

    /// Aborts running saves without touching in-memory state.
    pub fn abandon(&self) -> usize {
        let mut abandoned = 0;
        for (table_id, handle) in self.in_flight.lock().drain() {
            if !handle.is_finished() {
                handle.abort();
                abandoned += 1;
                warn!("Abandoned save of table {}", table_id);
                self.bus
                    .publish(AppEvent::Storage(StorageEvent::SaveAbandoned { table_id }));
            }
        }
        abandoned
    }
}

impl Drop for TableSync {
    fn drop(&mut self) {
        for (_, handle) in self.in_flight.get_mut().drain() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for TableSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSync")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use std::time::Duration;
    use tablekit_core::{EventBusConfig, NotificationLevel, Point};
    use tablekit_layout::{Device, GeometryConfig, Spawn, TableType};

    fn bus() -> Arc<EventBus> {
        Arc::new(EventBus::with_config(EventBusConfig {
            enable_history: true,
            ..EventBusConfig::default()
        }))
    }

    fn errors(bus: &EventBus) -> Vec<Notification> {
        bus.history()
            .into_iter()
            .filter_map(|e| match e {
                AppEvent::Notice(n) if n.level == NotificationLevel::Error => Some(n),
                _ => None,
            })
            .collect()
    }

    fn backend_with_table() -> Arc<MemoryBackend> {
        let backend = Arc::new(MemoryBackend::default());
        backend.insert_table(Table::new("t1", "Front", TableType::Single));
        backend
    }

    #[tokio::test]
    async fn test_save_is_fire_and_forget() {
        let backend = backend_with_table();
        let sync = TableSync::with_backend(backend.clone(), bus());
        let table = sync.load("t1").await.unwrap();
        let mut editor = TableEditor::with_bus(table, GeometryConfig::default(), sync.bus().clone());
        editor
            .add_device(Device::new("d", "iPhone", "iPhone"), Spawn::At(Point::new(50.0, 60.0)))
            .unwrap();

        sync.save_editor(&mut editor).unwrap();
        assert!(!editor.is_modified());
        sync.flush().await;

        assert_eq!(backend.table("t1").unwrap().devices.len(), 1);
        assert!(errors(sync.bus()).is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_working_copy() {
        let backend = backend_with_table();
        let sync = TableSync::with_backend(backend.clone(), bus());
        let table = sync.load("t1").await.unwrap();
        let mut editor = TableEditor::with_bus(table, GeometryConfig::default(), sync.bus().clone());
        editor
            .add_device(Device::new("d", "iPhone", "iPhone"), Spawn::NextLane)
            .unwrap();

        backend.set_offline(true);
        sync.save_editor(&mut editor).unwrap();
        sync.flush().await;

        assert_eq!(editor.table().devices.len(), 1);
        let errs = errors(sync.bus());
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, "save_failed");
    }

    #[tokio::test]
    async fn test_abandon_aborts_in_flight_save() {
        let backend = backend_with_table();
        backend.set_write_delay(Duration::from_secs(30));
        let sync = TableSync::with_backend(backend.clone(), bus());

        let mut update = Table::new("t1", "Front", TableType::Single).to_update();
        update.image_scale = 2.0;
        sync.save("t1", update).unwrap();
        assert_eq!(sync.in_flight(), 1);

        assert_eq!(sync.abandon(), 1);
        assert_eq!(sync.in_flight(), 0);
        assert_eq!(backend.write_count(), 0);
        assert!(sync.bus().history().iter().any(|e| matches!(
            e,
            AppEvent::Storage(StorageEvent::SaveAbandoned { .. })
        )));
    }

    #[tokio::test]
    async fn test_newer_save_replaces_older() {
        let backend = backend_with_table();
        backend.set_write_delay(Duration::from_millis(20));
        let sync = TableSync::with_backend(backend.clone(), bus());

        let mut first = Table::new("t1", "Front", TableType::Single).to_update();
        first.image_scale = 2.0;
        let mut second = first.clone();
        second.image_scale = 3.0;
        sync.save("t1", first).unwrap();
        sync.save("t1", second).unwrap();
        sync.flush().await;

        assert_eq!(backend.table("t1").unwrap().image_scale, 3.0);
        assert_eq!(backend.write_count(), 1);
    }

    #[tokio::test]
    async fn test_load_failure_notifies() {
        let sync = TableSync::with_backend(Arc::new(MemoryBackend::default()), bus());
        assert!(sync.load("ghost").await.is_err());
        assert_eq!(errors(sync.bus())[0].code, "load_failed");
    }

    #[tokio::test]
    async fn test_upload_replaces_image_and_saves() {
        let backend = Arc::new(MemoryBackend::new("https://cdn.example"));
        backend.insert_table(Table::new("wall", "Wall", TableType::ImageBoard));
        let sync = TableSync::with_backend(backend.clone(), bus());
        let table = sync.load("wall").await.unwrap();
        let mut editor = TableEditor::with_bus(table, GeometryConfig::default(), sync.bus().clone());

        let url = sync
            .upload_image(&mut editor, "wall.png", vec![1, 2, 3], Size::new(800.0, 600.0))
            .await
            .unwrap();
        sync.flush().await;

        let stored = backend.table("wall").unwrap();
        assert_eq!(stored.image_url.as_deref(), Some(url.as_str()));
        assert_eq!(stored.image_natural_size, Some(Size::new(800.0, 600.0)));
    }

    #[test]
    fn test_save_without_runtime_is_an_error() {
        let sync = TableSync::with_backend(backend_with_table(), bus());
        let update = Table::new("t1", "Front", TableType::Single).to_update();
        assert!(sync.save("t1", update).is_err());
    }

    struct UnreachableIssues;

    #[async_trait::async_trait]
    impl IssueSource for UnreachableIssues {
        async fn issues_for_store(&self, _store_id: &str) -> Result<Vec<tablekit_layout::Issue>> {
            Err(tablekit_core::StoreError::Backend {
                reason: "issue tracker offline".to_string(),
            }
            .into())
        }
    }

    fn warnings(bus: &EventBus) -> Vec<Notification> {
        bus.history()
            .into_iter()
            .filter_map(|e| match e {
                AppEvent::Notice(n) if n.level == NotificationLevel::Warning => Some(n),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_store_overview_tolerates_issue_failure() {
        let backend = backend_with_table();
        backend.link("s1", "t1");
        let sync = TableSync::new(
            backend.clone(),
            backend.clone(),
            Arc::new(UnreachableIssues),
            bus(),
        );

        let overview = sync.store_overview("s1").await.unwrap();
        assert_eq!(overview.tables.len(), 1);
        assert_eq!(overview.tables[0].id, "t1");
        assert!(overview.missing.is_empty());

        let warned = warnings(sync.bus());
        assert_eq!(warned.len(), 1);
        assert_eq!(warned[0].code, "issues_unavailable");
        assert!(warned[0].message.contains("issue tracker offline"));
        assert!(errors(sync.bus()).is_empty());
    }
}
