use anyhow::Result;
use eventica_core::service::EventService;
use eventica_core::store::EventStore;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run<S: EventStore>(service: &EventService<S>, id: &str) -> Result<()> {
    let event = service.delete(id)?;
    println!("{} {}", "-".red(), event.render());
    Ok(())
}
