//! Validated event operations over an `EventStore`.
//!
//! Both the HTTP API and the CLI go through `EventService`, so validation,
//! date/time normalization and defaults are applied the same way everywhere.

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::config::EventicaConfig;
use crate::datetime::{self, MalformedDatePolicy, format_time_range, normalize_date};
use crate::error::{EventicaError, EventicaResult};
use crate::event::{
    DEFAULT_IMAGE, DEFAULT_LOCATION, DEFAULT_WEBSITE, Event, EventInput, field,
};
use crate::ordering;
use crate::search;
use crate::store::EventStore;

/// Input that passed validation, with date and time already normalized.
#[derive(Clone)]
struct Draft {
    title: String,
    description: String,
    date: String,
    time: String,
    location: String,
    image: Option<String>,
    website: Option<String>,
}

impl Draft {
    fn into_event(self, id: String, previous: Option<&Event>) -> Event {
        let image = self
            .image
            .or_else(|| previous.map(|e| e.image.clone()).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_IMAGE.to_string());
        let website = self
            .website
            .or_else(|| previous.map(|e| e.website.clone()).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_WEBSITE.to_string());

        Event {
            id,
            title: self.title,
            date: self.date,
            time: self.time,
            location: self.location,
            description: self.description,
            image,
            website,
            created_at: None,
            updated_at: None,
        }
    }
}

pub struct EventService<S> {
    store: S,
    dates: MalformedDatePolicy,
    timezone: Option<Tz>,
}

impl<S: EventStore> EventService<S> {
    pub fn new(store: S, config: &EventicaConfig) -> EventicaResult<Self> {
        Ok(Self::with_policy(store, config.malformed_dates, config.timezone()?))
    }

    pub fn with_policy(store: S, dates: MalformedDatePolicy, timezone: Option<Tz>) -> Self {
        EventService {
            store,
            dates,
            timezone,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn today(&self) -> NaiveDate {
        datetime::today(self.timezone.as_ref())
    }

    fn prepare(&self, input: &EventInput) -> EventicaResult<Draft> {
        let (Some(title), Some(description)) = (field(&input.title), field(&input.description))
        else {
            return Err(EventicaError::Validation(
                "Title and description are required.".into(),
            ));
        };

        let date = normalize_date(field(&input.date), self.dates, self.today())?;
        let time = format_time_range(field(&input.time), field(&input.end_time));

        Ok(Draft {
            title: title.to_string(),
            description: description.to_string(),
            date,
            time,
            location: field(&input.location)
                .unwrap_or(DEFAULT_LOCATION)
                .to_string(),
            image: field(&input.image).map(str::to_string),
            website: field(&input.website).map(str::to_string),
        })
    }

    pub fn create(&self, input: &EventInput) -> EventicaResult<Event> {
        let draft = self.prepare(input)?;

        // The store hands over the id while it holds its write lock.
        let event = self
            .store
            .insert(&|id| draft.clone().into_event(id, None))?;

        tracing::info!(id = %event.id, title = %event.title, "event created");
        Ok(event)
    }

    pub fn update(&self, id: &str, input: &EventInput) -> EventicaResult<Event> {
        let draft = self.prepare(input)?;

        let event = self.store.update(id, &|previous| {
            draft.clone().into_event(id.to_string(), Some(previous))
        })?;

        tracing::info!(id = %event.id, title = %event.title, "event updated");
        Ok(event)
    }

    pub fn delete(&self, id: &str) -> EventicaResult<Event> {
        let event = self.store.remove(id)?;
        tracing::info!(id = %event.id, title = %event.title, "event deleted");
        Ok(event)
    }

    pub fn get(&self, id: &str) -> EventicaResult<Event> {
        self.store
            .get(id)?
            .ok_or_else(|| EventicaError::NotFound(id.to_string()))
    }

    /// All events, newest first.
    pub fn list(&self) -> EventicaResult<Vec<Event>> {
        self.store.list()
    }

    /// Events whose title or description contains `query`, newest first.
    pub fn search(&self, query: Option<&str>) -> EventicaResult<Vec<Event>> {
        Ok(search::filter(self.list()?, query))
    }

    /// `(upcoming, past)` relative to today, each in display order, keeping
    /// only events that match `query`.
    pub fn search_upcoming(
        &self,
        query: Option<&str>,
    ) -> EventicaResult<(Vec<Event>, Vec<Event>)> {
        let events = search::filter(self.store.list()?, query);
        Ok(ordering::partition(events, self.today()))
    }

    pub fn count(&self) -> EventicaResult<usize> {
        self.store.count()
    }

    /// Replace the whole collection with `events`.
    ///
    /// Events without an id get their 1-based position as id. Fails without
    /// touching the store if the resulting ids are not unique.
    pub fn migrate(&self, events: Vec<Event>) -> EventicaResult<usize> {
        let events: Vec<Event> = events
            .into_iter()
            .enumerate()
            .map(|(index, mut event)| {
                if event.id.trim().is_empty() {
                    event.id = (index + 1).to_string();
                }
                event
            })
            .collect();

        tracing::info!(count = events.len(), backend = self.store.name(), "starting migration");
        let count = self.store.replace_all(events)?;
        tracing::info!(count, "migration finished");
        Ok(count)
    }
}
