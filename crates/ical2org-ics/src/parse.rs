//! ICS/iCalendar parsing.
//!
//! This module parses iCalendar (RFC 5545) data and converts every `VEVENT`
//! to a [`CalendarEntry`]. Date and time values keep their encoding (bare
//! date, floating, UTC or `TZID`) so the pipeline can apply its own
//! normalization rules.

use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event,
};
use tracing::{debug, warn};

use ical2org_core::{CalendarEntry, RawTimestamp};

use crate::error::{IcsError, IcsResult};

/// Parses ICS content and extracts all events.
///
/// # Errors
///
/// Returns [`IcsError::Invalid`] if the document cannot be parsed at all.
/// Individual events with missing fields are still returned; the pipeline
/// decides whether they are usable.
pub fn parse_calendar(ics: &str) -> IcsResult<Vec<CalendarEntry>> {
    let head = ics.trim_start_matches('\u{feff}').trim_start();
    if !head
        .get(..15)
        .is_some_and(|begin| begin.eq_ignore_ascii_case("BEGIN:VCALENDAR"))
    {
        return Err(IcsError::invalid(
            "document does not start with BEGIN:VCALENDAR",
        ));
    }

    let calendar = ics.parse::<Calendar>().map_err(|e| {
        warn!(error = %e, "Failed to parse ICS content");
        IcsError::invalid(e.to_string())
    })?;

    let entries: Vec<CalendarEntry> = calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => Some(parse_event(event)),
            _ => None,
        })
        .collect();

    debug!(events = entries.len(), "Parsed calendar");
    Ok(entries)
}

/// Converts a single VEVENT component.
fn parse_event(event: &Event) -> CalendarEntry {
    let entry = CalendarEntry {
        summary: event.get_summary().map(str::to_string),
        description: event.get_description().map(str::to_string),
        start: event.get_start().map(convert_date_time),
        end: event.get_end().map(convert_date_time),
        url: event.property_value("URL").map(|url| url.trim().to_string()),
    };

    debug!(
        summary = ?entry.summary,
        start = ?entry.start,
        url = ?entry.url,
        "Parsed event from ICS"
    );

    entry
}

/// Converts icalendar's `DatePerhapsTime`, keeping the encoding.
fn convert_date_time(dt: DatePerhapsTime) -> RawTimestamp {
    match dt {
        DatePerhapsTime::Date(date) => RawTimestamp::Date(date),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => RawTimestamp::Utc(dt),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            RawTimestamp::Floating(naive)
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            RawTimestamp::Zoned {
                local: date_time,
                tzid,
            }
        }
    }
}
