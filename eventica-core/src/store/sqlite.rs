//! Document-store variant backed by SQLite.
//!
//! Keeps `createdAt`/`updatedAt` per event and runs every mutation inside an
//! `IMMEDIATE` transaction.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};

use super::{EventStore, ensure_unique_ids, not_found};
use crate::error::{EventicaError, EventicaResult};
use crate::event::Event;
use crate::ordering::{next_id_from, sort_newest_first};

const COLUMNS: &str =
    "id, title, date, time, location, description, image, website, created_at, updated_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> EventicaResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened sqlite database");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> EventicaResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> EventicaResult<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS events(
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                location TEXT NOT NULL,
                description TEXT NOT NULL,
                image TEXT NOT NULL,
                website TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;

        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    /// Close the connection, surfacing any error SQLite reports.
    pub fn close(self) -> EventicaResult<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| EventicaError::Persistence("database lock poisoned".into()))?;
        conn.close().map_err(|(_, e)| e.into())
    }

    fn conn(&self) -> EventicaResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| EventicaError::Persistence("database lock poisoned".into()))
    }

    /// Run `change` in an immediate transaction, committing only on success.
    fn transact<T>(
        &self,
        change: impl FnOnce(&Transaction) -> EventicaResult<T>,
    ) -> EventicaResult<T> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = change(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}

fn event_from_row(row: &Row) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        date: row.get(2)?,
        time: row.get(3)?,
        location: row.get(4)?,
        description: row.get(5)?,
        image: row.get(6)?,
        website: row.get(7)?,
        created_at: Some(row.get(8)?),
        updated_at: Some(row.get(9)?),
    })
}

fn find(conn: &Connection, id: &str) -> EventicaResult<Option<Event>> {
    let sql = format!("SELECT {} FROM events WHERE id = ?1", COLUMNS);
    Ok(conn.query_row(&sql, params![id], event_from_row).optional()?)
}

fn insert_row(conn: &Connection, event: &Event, now: DateTime<Utc>) -> EventicaResult<()> {
    let sql = format!(
        "INSERT INTO events ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        COLUMNS
    );
    conn.execute(
        &sql,
        params![
            event.id,
            event.title,
            event.date,
            event.time,
            event.location,
            event.description,
            event.image,
            event.website,
            event.created_at.unwrap_or(now),
            event.updated_at.unwrap_or(now),
        ],
    )?;
    Ok(())
}

impl EventStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn list(&self) -> EventicaResult<Vec<Event>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM events ORDER BY seq", COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let mut events = stmt
            .query_map([], event_from_row)?
            .collect::<rusqlite::Result<Vec<Event>>>()?;

        tracing::debug!(count = events.len(), "retrieved events from database");
        sort_newest_first(&mut events);
        Ok(events)
    }

    fn get(&self, id: &str) -> EventicaResult<Option<Event>> {
        let conn = self.conn()?;
        find(&conn, id)
    }

    fn insert(&self, build: &dyn Fn(String) -> Event) -> EventicaResult<Event> {
        self.transact(|tx| {
            let mut stmt = tx.prepare("SELECT id FROM events")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            drop(stmt);

            let now = Utc::now();
            let mut event = build(next_id_from(ids.iter().map(String::as_str))?);
            event.created_at = Some(now);
            event.updated_at = Some(now);

            insert_row(tx, &event, now)?;
            Ok(event)
        })
    }

    fn update(&self, id: &str, apply: &dyn Fn(&Event) -> Event) -> EventicaResult<Event> {
        self.transact(|tx| {
            let existing = find(tx, id)?.ok_or_else(|| not_found(id))?;

            let mut updated = apply(&existing);
            updated.id = id.to_string();
            updated.created_at = existing.created_at;
            updated.updated_at = Some(Utc::now());

            tx.execute(
                "UPDATE events SET title = ?2, date = ?3, time = ?4, location = ?5,
                    description = ?6, image = ?7, website = ?8, updated_at = ?9
                 WHERE id = ?1",
                params![
                    updated.id,
                    updated.title,
                    updated.date,
                    updated.time,
                    updated.location,
                    updated.description,
                    updated.image,
                    updated.website,
                    updated.updated_at,
                ],
            )?;
            Ok(updated)
        })
    }

    fn remove(&self, id: &str) -> EventicaResult<Event> {
        self.transact(|tx| {
            let existing = find(tx, id)?.ok_or_else(|| not_found(id))?;
            tx.execute("DELETE FROM events WHERE id = ?1", params![id])?;
            Ok(existing)
        })
    }

    fn replace_all(&self, events: Vec<Event>) -> EventicaResult<usize> {
        ensure_unique_ids(&events)?;
        self.transact(|tx| {
            tx.execute("DELETE FROM events", [])?;
            let now = Utc::now();
            for event in &events {
                let fresh = Event {
                    created_at: None,
                    updated_at: None,
                    ..event.clone()
                };
                insert_row(tx, &fresh, now)?;
            }
            Ok(events.len())
        })
    }

    fn count(&self) -> EventicaResult<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
