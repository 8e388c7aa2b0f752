use anyhow::Result;
use eventica_core::EventInput;
use eventica_core::service::EventService;
use eventica_core::store::EventStore;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run<S: EventStore>(service: &EventService<S>, id: &str, input: &EventInput) -> Result<()> {
    let event = service.update(id, input)?;
    println!("{} {}", "~".yellow(), event.render());
    Ok(())
}
