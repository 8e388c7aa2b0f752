use std::path::Path;

use anyhow::Result;
use eventica_core::audit::audit;

use super::migrate::load_events;
use crate::render::Render;

pub fn run(path: &Path) -> Result<()> {
    let events = load_events(path)?;
    let report = audit(&events);

    println!("{}", report.render());

    if !report.is_clean() {
        anyhow::bail!("{} has problems that need fixing before migration", path.display());
    }

    Ok(())
}
