//! Flat-file store: the whole collection in one pretty-printed JSON array.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use fs2::FileExt;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::{EventStore, WriteFailurePolicy, ensure_unique_ids, not_found};
use crate::error::{EventicaError, EventicaResult};
use crate::event::Event;
use crate::ordering::{next_id, sort_newest_first};

/// Holds the advisory lock on `<events file>.lock` until dropped.
struct LockGuard {
    _file: File,
}

pub struct JsonFileStore {
    path: PathBuf,
    policy: WriteFailurePolicy,
    /// Collection kept after a tolerated write failure. Also serializes
    /// writers within this process.
    overlay: Mutex<Option<Vec<Event>>>,
}

impl JsonFileStore {
    pub fn new(path: PathBuf, policy: WriteFailurePolicy) -> Self {
        JsonFileStore {
            path,
            policy,
            overlay: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn overlay(&self) -> EventicaResult<MutexGuard<'_, Option<Vec<Event>>>> {
        self.overlay
            .lock()
            .map_err(|_| EventicaError::Persistence("events file lock poisoned".into()))
    }

    fn lock_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".lock");
        PathBuf::from(path)
    }

    fn acquire(&self, exclusive: bool) -> EventicaResult<Option<LockGuard>> {
        let result = (|| -> std::io::Result<LockGuard> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(self.lock_path())?;
            if exclusive {
                file.lock_exclusive()?;
            } else {
                file.lock_shared()?;
            }
            Ok(LockGuard { _file: file })
        })();

        match result {
            Ok(guard) => Ok(Some(guard)),
            Err(e) if self.policy == WriteFailurePolicy::KeepInMemory => {
                tracing::warn!(
                    error = %e,
                    path = %self.lock_path().display(),
                    "could not lock events file, continuing unlocked"
                );
                Ok(None)
            }
            Err(e) => Err(EventicaError::Persistence(format!(
                "Could not lock {}: {}",
                self.lock_path().display(),
                e
            ))),
        }
    }

    fn read_file(&self) -> EventicaResult<Vec<Event>> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "events file not found, starting empty");
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            EventicaError::Persistence(format!("Could not read {}: {}", self.path.display(), e))
        })?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let events: Vec<Event> = serde_json::from_str(&content).map_err(|e| {
            EventicaError::Persistence(format!("Could not parse {}: {}", self.path.display(), e))
        })?;

        tracing::debug!(count = events.len(), "read events file");
        Ok(events)
    }

    fn write_file(&self, events: &[Event]) -> EventicaResult<()> {
        let content = to_pretty_json(events)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&tmp, &content)?;
            fs::rename(&tmp, &self.path)
        };

        write().map_err(|e| {
            EventicaError::Persistence(format!("Could not write {}: {}", self.path.display(), e))
        })?;

        tracing::info!(count = events.len(), path = %self.path.display(), "wrote events file");
        Ok(())
    }

    fn current(&self, overlay: &Option<Vec<Event>>) -> EventicaResult<Vec<Event>> {
        match overlay {
            Some(events) => Ok(events.clone()),
            None => self.read_file(),
        }
    }

    /// Run `change` against the current collection and write the result back,
    /// all under both locks. An error from `change` aborts without writing.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Vec<Event>) -> EventicaResult<T>,
    ) -> EventicaResult<T> {
        let mut overlay = self.overlay()?;
        let _lock = self.acquire(true)?;

        let mut events = self.current(&overlay)?;
        let out = change(&mut events)?;
        sort_newest_first(&mut events);

        match self.write_file(&events) {
            Ok(()) => {
                *overlay = None;
                Ok(out)
            }
            Err(e) => match self.policy {
                WriteFailurePolicy::Fail => {
                    tracing::error!(error = %e, "event change not saved");
                    Err(e)
                }
                WriteFailurePolicy::KeepInMemory => {
                    tracing::warn!(error = %e, "event change kept in memory only");
                    *overlay = Some(events);
                    Ok(out)
                }
            },
        }
    }
}

/// Serialize with 4-space indentation.
fn to_pretty_json(events: &[Event]) -> EventicaResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    events.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

impl EventStore for JsonFileStore {
    fn name(&self) -> &'static str {
        "json"
    }

    fn list(&self) -> EventicaResult<Vec<Event>> {
        let overlay = self.overlay()?;
        let _lock = self.acquire(false)?;

        let mut events = self.current(&overlay)?;
        sort_newest_first(&mut events);
        Ok(events)
    }

    fn get(&self, id: &str) -> EventicaResult<Option<Event>> {
        Ok(self.list()?.into_iter().find(|e| e.id == id))
    }

    fn insert(&self, build: &dyn Fn(String) -> Event) -> EventicaResult<Event> {
        self.mutate(|events| {
            let mut event = build(next_id(events)?);
            event.created_at = None;
            event.updated_at = None;
            events.push(event.clone());
            Ok(event)
        })
    }

    fn update(&self, id: &str, apply: &dyn Fn(&Event) -> Event) -> EventicaResult<Event> {
        self.mutate(|events| {
            let slot = events
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| not_found(id))?;

            let mut updated = apply(slot);
            updated.id = id.to_string();
            updated.created_at = None;
            updated.updated_at = None;
            *slot = updated.clone();
            Ok(updated)
        })
    }

    fn remove(&self, id: &str) -> EventicaResult<Event> {
        self.mutate(|events| {
            let index = events
                .iter()
                .position(|e| e.id == id)
                .ok_or_else(|| not_found(id))?;
            Ok(events.remove(index))
        })
    }

    fn replace_all(&self, events: Vec<Event>) -> EventicaResult<usize> {
        ensure_unique_ids(&events)?;
        self.mutate(move |current| {
            *current = events
                .into_iter()
                .map(|mut e| {
                    e.created_at = None;
                    e.updated_at = None;
                    e
                })
                .collect();
            Ok(current.len())
        })
    }
}
