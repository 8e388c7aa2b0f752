//! Colored terminal rendering for eventica types.

use eventica_core::Event;
use eventica_core::audit::{AuditReport, Finding};
use eventica_core::event::{DEFAULT_IMAGE, DEFAULT_WEBSITE};
use owo_colors::OwoColorize;

/// Extension trait for terminal rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    /// One line: id, date, time and title
    fn render(&self) -> String {
        format!(
            "{:>4}  {}  {:<18}  {}",
            self.id.dimmed(),
            self.date.bold(),
            self.time,
            self.title
        )
    }
}

/// Every field of an event, one per line.
pub fn render_details(event: &Event) -> String {
    let mut lines = vec![
        format!("{}", event.title.bold()),
        format!("  Id:          {}", event.id),
        format!("  Date:        {}", event.date),
        format!("  Time:        {}", event.time),
        format!("  Location:    {}", event.location),
        format!("  Description: {}", event.description),
    ];

    if event.image != DEFAULT_IMAGE {
        lines.push(format!("  Image:       {}", event.image));
    }
    if event.website != DEFAULT_WEBSITE {
        lines.push(format!("  Website:     {}", event.website));
    }
    if let Some(created) = event.created_at {
        lines.push(format!("  Created:     {}", created.to_rfc3339()).dimmed().to_string());
    }
    if let Some(updated) = event.updated_at {
        lines.push(format!("  Updated:     {}", updated.to_rfc3339()).dimmed().to_string());
    }

    lines.join("\n")
}

/// A titled block of events, or a dimmed placeholder when there are none.
pub fn render_section(heading: &str, events: &[Event]) -> String {
    let mut lines = vec![heading.bold().to_string()];

    if events.is_empty() {
        lines.push(format!("   {}", "No events".dimmed()));
    } else {
        lines.extend(events.iter().map(|e| format!("  {}", e.render())));
    }

    lines.join("\n")
}

fn render_findings(label: &str, findings: &[Finding], lines: &mut Vec<String>) {
    if findings.is_empty() {
        return;
    }

    lines.push(format!("   {} {}", "!".yellow(), label.yellow()));
    for finding in findings {
        lines.push(format!(
            "      {} {:?} {}",
            finding.id.dimmed(),
            finding.value,
            finding.title.dimmed()
        ));
    }
}

impl Render for AuditReport {
    fn render(&self) -> String {
        let mut lines = vec![format!("Checked {} {}", self.total, pluralize("event", self.total))];

        if self.is_clean() {
            lines.push(format!("   {}", "No problems found".green()));
            return lines.join("\n");
        }

        for (id, count) in &self.duplicate_ids {
            lines.push(format!("   {} id {} is used {} times", "-".red(), id.bold(), count));
        }
        if self.missing_ids > 0 {
            lines.push(format!(
                "   {} {} {} without an id (will be numbered by position)",
                "~".yellow(),
                self.missing_ids,
                pluralize("event", self.missing_ids)
            ));
        }

        render_findings("Dates not in DD-MM-YYYY form:", &self.bad_dates, &mut lines);
        render_findings("Unrecognized times:", &self.unrecognized_times, &mut lines);

        lines.join("\n")
    }
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
