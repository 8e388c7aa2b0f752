use anyhow::Result;
use eventica_core::service::EventService;
use eventica_core::store::EventStore;
use owo_colors::OwoColorize;

use crate::render::{Render, render_section};

pub fn run<S: EventStore>(
    service: &EventService<S>,
    upcoming: bool,
    search: Option<&str>,
) -> Result<()> {
    if upcoming {
        let (upcoming, past) = service.search_upcoming(search)?;
        println!("{}", render_section("Upcoming", &upcoming));
        println!();
        println!("{}", render_section("Past", &past));
        return Ok(());
    }

    let events = service.search(search)?;
    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    for event in &events {
        println!("{}", event.render());
    }

    Ok(())
}
