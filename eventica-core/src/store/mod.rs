//! Event persistence.
//!
//! Every mutation is one atomic read-modify-write: the store assigns ids,
//! applies the change and writes the result while holding its lock (or
//! transaction), so concurrent writers can neither collide on an id nor lose
//! each other's updates.

mod json;
mod sqlite;

pub use json::JsonFileStore;
pub use sqlite::SqliteStore;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::{Backend, EventicaConfig};
use crate::error::{EventicaError, EventicaResult};
use crate::event::Event;

/// What to do when the events file cannot be written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteFailurePolicy {
    /// Report the failure to the caller
    #[default]
    Fail,
    /// Keep the change in memory only and report success
    KeepInMemory,
}

/// Storage for events.
pub trait EventStore: Send + Sync {
    /// Short name for logs and health output
    fn name(&self) -> &'static str;

    /// All events, newest first.
    fn list(&self) -> EventicaResult<Vec<Event>>;

    fn get(&self, id: &str) -> EventicaResult<Option<Event>>;

    /// Insert the event produced by `build`, which receives the assigned id.
    fn insert(&self, build: &dyn Fn(String) -> Event) -> EventicaResult<Event>;

    /// Replace event `id` with the result of `apply`. The id is preserved.
    fn update(&self, id: &str, apply: &dyn Fn(&Event) -> Event) -> EventicaResult<Event>;

    /// Remove event `id`, returning it.
    fn remove(&self, id: &str) -> EventicaResult<Event>;

    /// Replace the whole collection. Returns the number of events stored.
    fn replace_all(&self, events: Vec<Event>) -> EventicaResult<usize>;

    fn count(&self) -> EventicaResult<usize> {
        Ok(self.list()?.len())
    }
}

/// The store selected by configuration.
pub enum AnyStore {
    Json(JsonFileStore),
    Sqlite(SqliteStore),
}

impl AnyStore {
    pub fn open(config: &EventicaConfig) -> EventicaResult<Self> {
        let store = match config.backend {
            Backend::Json => {
                AnyStore::Json(JsonFileStore::new(config.events_path(), config.write_failures))
            }
            Backend::Sqlite => AnyStore::Sqlite(SqliteStore::open(&config.database_path())?),
        };

        tracing::info!(backend = store.name(), "event store opened");
        Ok(store)
    }

    /// Release the underlying handle.
    pub fn close(self) -> EventicaResult<()> {
        let name = self.name();
        match self {
            AnyStore::Json(_) => {}
            AnyStore::Sqlite(store) => store.close()?,
        }
        tracing::info!(backend = name, "event store closed");
        Ok(())
    }

    fn inner(&self) -> &dyn EventStore {
        match self {
            AnyStore::Json(store) => store as &dyn EventStore,
            AnyStore::Sqlite(store) => store as &dyn EventStore,
        }
    }
}

impl EventStore for AnyStore {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn list(&self) -> EventicaResult<Vec<Event>> {
        self.inner().list()
    }

    fn get(&self, id: &str) -> EventicaResult<Option<Event>> {
        self.inner().get(id)
    }

    fn insert(&self, build: &dyn Fn(String) -> Event) -> EventicaResult<Event> {
        self.inner().insert(build)
    }

    fn update(&self, id: &str, apply: &dyn Fn(&Event) -> Event) -> EventicaResult<Event> {
        self.inner().update(id, apply)
    }

    fn remove(&self, id: &str) -> EventicaResult<Event> {
        self.inner().remove(id)
    }

    fn replace_all(&self, events: Vec<Event>) -> EventicaResult<usize> {
        self.inner().replace_all(events)
    }

    fn count(&self) -> EventicaResult<usize> {
        self.inner().count()
    }
}

/// Fail when two events share an id.
pub(crate) fn ensure_unique_ids(events: &[Event]) -> EventicaResult<()> {
    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = events
        .iter()
        .map(|e| e.id.as_str())
        .filter(|id| !seen.insert(*id))
        .collect();

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(EventicaError::Validation(format!(
            "Duplicate event ids: {}",
            duplicates.join(", ")
        )))
    }
}

pub(crate) fn not_found(id: &str) -> EventicaError {
    EventicaError::NotFound(id.to_string())
}
