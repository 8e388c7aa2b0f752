//! Sort orders over events and identifier assignment.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::datetime::{parse_date, start_minutes};
use crate::error::{EventicaError, EventicaResult};
use crate::event::{Event, numeric_id};

/// Order by start time, earliest first; events without a concrete start
/// (TBD or unrecognised) come after all others and tie with each other.
pub fn compare_start_times(a: &str, b: &str) -> Ordering {
    match (start_minutes(a), start_minutes(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Compare two optional dates, placing unparseable ones last.
fn compare_dates(a: Option<NaiveDate>, b: Option<NaiveDate>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Persisted-store order: most recent date first, then earliest start time.
pub fn newest_first(a: &Event, b: &Event) -> Ordering {
    compare_dates(parse_date(&a.date), parse_date(&b.date), true)
        .then_with(|| compare_start_times(&a.time, &b.time))
}

/// Whether an event dated `date` is over. Dates that don't parse are never past.
pub fn is_past(date: &str, today: NaiveDate) -> bool {
    parse_date(date).is_some_and(|d| d < today)
}

/// Display order relative to `today`.
///
/// Upcoming events (dated today or later) come first in ascending date order,
/// followed by past events in descending date order. Events with an
/// unparseable date count as upcoming and sit at the end of that group.
pub fn upcoming_first(today: NaiveDate) -> impl Fn(&Event, &Event) -> Ordering {
    move |a, b| {
        let (date_a, date_b) = (parse_date(&a.date), parse_date(&b.date));
        let past_a = date_a.is_some_and(|d| d < today);
        let past_b = date_b.is_some_and(|d| d < today);

        past_a
            .cmp(&past_b)
            .then_with(|| compare_dates(date_a, date_b, past_a))
            .then_with(|| compare_start_times(&a.time, &b.time))
    }
}

/// Stable sort into persisted-store order.
pub fn sort_newest_first(events: &mut [Event]) {
    events.sort_by(newest_first);
}

/// Stable sort into display order relative to `today`.
pub fn sort_upcoming_first(events: &mut [Event], today: NaiveDate) {
    events.sort_by(upcoming_first(today));
}

/// Split events into `(upcoming, past)`, each in display order.
pub fn partition(events: Vec<Event>, today: NaiveDate) -> (Vec<Event>, Vec<Event>) {
    let (mut upcoming, mut past): (Vec<Event>, Vec<Event>) = events
        .into_iter()
        .partition(|event| !is_past(&event.date, today));

    sort_upcoming_first(&mut upcoming, today);
    sort_upcoming_first(&mut past, today);

    (upcoming, past)
}

/// Next identifier: one more than the highest numeric id in use.
///
/// Ids that aren't numbers count as 0.
pub fn next_id(events: &[Event]) -> EventicaResult<String> {
    next_id_from(events.iter().map(|e| e.id.as_str()))
}

/// Next identifier given the ids currently in use. Fails once the highest id
/// is `u64::MAX`.
pub fn next_id_from<'a>(ids: impl IntoIterator<Item = &'a str>) -> EventicaResult<String> {
    let max = ids.into_iter().map(numeric_id).max().unwrap_or(0);
    max.checked_add(1).map(|id| id.to_string()).ok_or_else(|| {
        EventicaError::Persistence(format!("No event id left after {}", max))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DEFAULT_IMAGE, DEFAULT_LOCATION, DEFAULT_WEBSITE, TIME_TBD};

    fn make_event(id: &str, date: &str, time: &str) -> Event {
        Event {
            id: id.to_string(),
            title: format!("Event {}", id),
            date: date.to_string(),
            time: time.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            description: "desc".to_string(),
            image: DEFAULT_IMAGE.to_string(),
            website: DEFAULT_WEBSITE.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    fn june_15() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_newest_first_orders_by_date_then_time() {
        let mut events = vec![
            make_event("1", "01-01-2024", "9:00am"),
            make_event("2", "05-03-2024", "4:00pm"),
            make_event("3", "05-03-2024", "10:00am - 2:00pm"),
            make_event("4", "20-12-2023", "9:00am"),
        ];

        sort_newest_first(&mut events);
        assert_eq!(ids(&events), vec!["3", "2", "1", "4"]);
    }

    #[test]
    fn test_newest_first_puts_tbd_after_concrete_time() {
        let mut events = vec![
            make_event("tbd", "10-01-2025", TIME_TBD),
            make_event("timed", "10-01-2025", "11:00pm"),
        ];

        sort_newest_first(&mut events);
        assert_eq!(ids(&events), vec!["timed", "tbd"]);
    }

    #[test]
    fn test_sort_is_stable_for_full_ties() {
        let mut events = vec![
            make_event("a", "10-01-2025", TIME_TBD),
            make_event("b", "10-01-2025", TIME_TBD),
            make_event("c", "10-01-2025", "Doors at dusk"),
        ];

        sort_newest_first(&mut events);
        assert_eq!(ids(&events), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sorting_twice_is_a_no_op() {
        let mut events = vec![
            make_event("1", "01-01-2024", TIME_TBD),
            make_event("2", "01-01-2024", "8:00am"),
            make_event("3", "02-02-2022", "8:00pm"),
            make_event("4", "03-03-2025", "12:00am"),
            make_event("5", "01-01-2024", TIME_TBD),
        ];

        sort_newest_first(&mut events);
        let once = events.clone();
        sort_newest_first(&mut events);

        assert_eq!(events, once);
    }

    #[test]
    fn test_invalid_dates_sort_last() {
        let mut events = vec![
            make_event("bad", "someday", "9:00am"),
            make_event("old", "01-01-2000", "9:00am"),
        ];

        sort_newest_first(&mut events);
        assert_eq!(ids(&events), vec!["old", "bad"]);
    }

    #[test]
    fn test_is_past_boundary_is_inclusive() {
        assert!(!is_past("15-06-2024", june_15()));
        assert!(is_past("14-06-2024", june_15()));
        assert!(!is_past("not-a-date", june_15()));
    }

    #[test]
    fn test_upcoming_first() {
        let mut events = vec![
            make_event("past-old", "01-01-2024", "9:00am"),
            make_event("future-far", "01-12-2024", "9:00am"),
            make_event("today-tbd", "15-06-2024", TIME_TBD),
            make_event("past-recent", "10-06-2024", "9:00am"),
            make_event("today-early", "15-06-2024", "7:00am"),
            make_event("future-near", "16-06-2024", "9:00am"),
        ];

        sort_upcoming_first(&mut events, june_15());
        assert_eq!(
            ids(&events),
            vec![
                "today-early",
                "today-tbd",
                "future-near",
                "future-far",
                "past-recent",
                "past-old"
            ]
        );
    }

    #[test]
    fn test_partition() {
        let events = vec![
            make_event("1", "14-06-2024", "9:00am"),
            make_event("2", "15-06-2024", "9:00am"),
            make_event("3", "01-06-2024", "9:00am"),
            make_event("4", "20-06-2024", "9:00am"),
        ];

        let (upcoming, past) = partition(events, june_15());
        assert_eq!(ids(&upcoming), vec!["2", "4"]);
        assert_eq!(ids(&past), vec!["1", "3"]);
    }

    #[test]
    fn test_next_id() {
        let events = vec![
            make_event("3", "01-01-2024", TIME_TBD),
            make_event("1", "01-01-2024", TIME_TBD),
            make_event("5", "01-01-2024", TIME_TBD),
        ];
        assert_eq!(next_id(&events).unwrap(), "6");
    }

    #[test]
    fn test_next_id_ignores_non_numeric_ids() {
        assert_eq!(next_id(&[]).unwrap(), "1");

        let events = vec![
            make_event("existing_1700000000_0", "01-01-2024", TIME_TBD),
            make_event("", "01-01-2024", TIME_TBD),
        ];
        assert_eq!(next_id(&events).unwrap(), "1");
    }

    #[test]
    fn test_next_id_at_u64_max_is_an_error() {
        let max = u64::MAX.to_string();
        let err = next_id_from([max.as_str(), "0"]).unwrap_err();
        assert!(matches!(err, EventicaError::Persistence(_)));

        let below = (u64::MAX - 1).to_string();
        assert_eq!(next_id_from([below.as_str()]).unwrap(), max);
    }
}
