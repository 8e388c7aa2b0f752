use anyhow::Result;
use eventica_core::EventInput;
use eventica_core::service::EventService;
use eventica_core::store::EventStore;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run<S: EventStore>(service: &EventService<S>, input: &EventInput) -> Result<()> {
    let event = service.create(input)?;
    println!("{} {}", "+".green(), event.render());
    Ok(())
}
