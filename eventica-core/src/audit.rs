//! Consistency checks for an event collection before it is migrated.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::datetime::{TimeSlot, canonical_date, classify_time, parse_date};
use crate::event::Event;

/// One problematic value on one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub id: String,
    pub title: String,
    pub value: String,
}

impl Finding {
    fn new(event: &Event, value: &str) -> Self {
        Finding {
            id: event.id.clone(),
            title: event.title.clone(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct AuditReport {
    pub total: usize,
    /// Ids used by more than one event, with how often
    pub duplicate_ids: Vec<(String, usize)>,
    /// Events with no id at all
    pub missing_ids: usize,
    /// Dates that aren't valid `DD-MM-YYYY`
    pub bad_dates: Vec<Finding>,
    /// Times that are neither TBD nor start with `H:MMam/pm`
    pub unrecognized_times: Vec<Finding>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_ids.is_empty()
            && self.missing_ids == 0
            && self.bad_dates.is_empty()
            && self.unrecognized_times.is_empty()
    }
}

pub fn audit(events: &[Event]) -> AuditReport {
    let mut report = AuditReport {
        total: events.len(),
        ..Default::default()
    };

    let mut id_counts: BTreeMap<&str, usize> = BTreeMap::new();

    for event in events {
        let id = event.id.trim();
        if id.is_empty() {
            report.missing_ids += 1;
        } else {
            *id_counts.entry(id).or_default() += 1;
        }

        let canonical = parse_date(&event.date).map(|d| canonical_date(&d));
        if canonical.as_deref() != Some(event.date.as_str()) {
            report.bad_dates.push(Finding::new(event, &event.date));
        }

        if classify_time(&event.time) == TimeSlot::Unrecognized {
            report.unrecognized_times.push(Finding::new(event, &event.time));
        }
    }

    report.duplicate_ids = id_counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, count)| (id.to_string(), count))
        .collect();

    report
}
