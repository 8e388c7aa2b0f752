//! Free-text filtering of event listings.

use crate::event::Event;

/// Whether `event` mentions `query` in its title or description, ignoring
/// case. A blank query matches everything.
pub fn matches(event: &Event, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    event.title.to_lowercase().contains(&query)
        || event.description.to_lowercase().contains(&query)
}

/// Keep the events matching `query`, preserving their order.
pub fn filter(events: Vec<Event>, query: Option<&str>) -> Vec<Event> {
    match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => events.into_iter().filter(|e| matches(e, query)).collect(),
        None => events,
    }
}
