use anyhow::Result;
use eventica_core::service::EventService;
use eventica_core::store::EventStore;

use crate::render::render_details;

pub fn run<S: EventStore>(service: &EventService<S>, id: &str) -> Result<()> {
    let event = service.get(id)?;
    println!("{}", render_details(&event));
    Ok(())
}
