//! Event bus with synchronous listeners, a broadcast channel for async
//! consumers and an optional bounded history.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::broadcast;

use super::events::{AppEvent, EventCategory, Notification};

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Which events a listener receives.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EventFilter {
    #[default]
    All,
    /// Any of these categories.
    Categories(Vec<EventCategory>),
    /// Editor and storage events of one table.
    Table(String),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
            EventFilter::Table(id) => event.table_id() == Some(id.as_str()),
        }
    }
}

type Listener = Arc<dyn Fn(&AppEvent) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Broadcast buffer; slow receivers lag past this many events.
    pub channel_capacity: usize,
    /// Keep recent events for inspection, mostly in tests.
    pub enable_history: bool,
    pub history_limit: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 128,
            enable_history: false,
            history_limit: 500,
        }
    }
}

pub struct EventBus {
    config: EventBusConfig,
    sender: broadcast::Sender<AppEvent>,
    listeners: RwLock<Vec<(SubscriptionId, EventFilter, Listener)>>,
    history: Mutex<VecDeque<AppEvent>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            config,
            sender,
            listeners: RwLock::new(Vec::new()),
            history: Mutex::new(VecDeque::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Delivers `event` and returns how many listeners and receivers got it.
    ///
    /// Nobody listening is fine; events are best effort.
    pub fn publish(&self, event: AppEvent) -> usize {
        tracing::trace!("event: {}", event.description());

        if self.config.enable_history {
            let mut history = self.history.lock();
            if history.len() >= self.config.history_limit.max(1) {
                history.pop_front();
            }
            history.push_back(event.clone());
        }

        // listeners may subscribe from inside a callback; don't hold the lock
        let matching: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .filter(|(_, filter, _)| filter.matches(&event))
            .map(|(_, _, listener)| listener.clone())
            .collect();
        for listener in &matching {
            listener(&event);
        }

        matching.len() + self.sender.send(event).unwrap_or(0)
    }

    pub fn notify(&self, notification: Notification) -> usize {
        self.publish(AppEvent::Notice(notification))
    }

    /// Registers a listener that runs on the publishing thread.
    pub fn subscribe<F>(&self, filter: EventFilter, listener: F) -> SubscriptionId
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, filter, Arc::new(listener)));
        tracing::debug!("Added {}", id);
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _, _)| *existing != id);
        listeners.len() != before
    }

    /// Receiver for async consumers.
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Recorded events, oldest first. Empty unless history is enabled.
    pub fn history(&self) -> Vec<AppEvent> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.subscriber_count())
            .field("history", &self.history.lock().len())
            .finish()
    }
}

static GLOBAL_BUS: OnceLock<Arc<EventBus>> = OnceLock::new();

/// Process-wide bus used by editors opened without an explicit one.
pub fn event_bus() -> Arc<EventBus> {
    GLOBAL_BUS
        .get_or_init(|| Arc::new(EventBus::new()))
        .clone()
}

/// Configures the process-wide bus. Fails with the config if it already exists.
pub fn init_event_bus(config: EventBusConfig) -> Result<(), EventBusConfig> {
    let mut pending = Some(config);
    GLOBAL_BUS.get_or_init(|| {
        Arc::new(EventBus::with_config(pending.take().unwrap_or_default()))
    });
    match pending {
        Some(rejected) => Err(rejected),
        None => Ok(()),
    }
}
