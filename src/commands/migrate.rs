use std::path::Path;

use anyhow::{Context, Result};
use eventica_core::Event;
use eventica_core::audit::audit;
use eventica_core::service::EventService;
use eventica_core::store::EventStore;
use owo_colors::OwoColorize;
use serde::Deserialize;

use crate::render::Render;

/// Export files are either a bare array or `{"events": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum EventFile {
    Bare(Vec<Event>),
    Wrapped { events: Vec<Event> },
}

/// Read the events from an export file.
pub fn load_events(path: &Path) -> Result<Vec<Event>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let file: EventFile = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON list of events", path.display()))?;

    Ok(match file {
        EventFile::Bare(events) | EventFile::Wrapped { events } => events,
    })
}

pub fn run<S: EventStore>(service: &EventService<S>, path: &Path) -> Result<()> {
    let events = load_events(path)?;

    let report = audit(&events);
    if !report.is_clean() {
        println!("{}", report.render());
        println!();
    }

    let count = service.migrate(events)?;
    println!(
        "{} Migrated {} events into the {} store",
        "✓".green(),
        count,
        service.store().name()
    );

    Ok(())
}
