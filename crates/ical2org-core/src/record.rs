//! Record types produced by the pipeline.
//!
//! This module provides:
//! - [`CalendarEntry`]: one event as delivered by the calendar parser
//! - [`NormalizedRecord`]: an accepted entry with course, headline and times
//! - [`RecordKind`]: task (single deadline) or event (start/end range)

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::time::RawTimestamp;

/// A calendar event as delivered by the calendar parser.
///
/// Every field is optional because feeds are not trusted to be complete;
/// the pipeline decides what a missing field means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarEntry {
    /// The event summary (`SUMMARY`).
    pub summary: Option<String>,
    /// Free-text description (`DESCRIPTION`).
    pub description: Option<String>,
    /// Start value (`DTSTART`).
    pub start: Option<RawTimestamp>,
    /// End value (`DTEND`).
    pub end: Option<RawTimestamp>,
    /// Reference URL (`URL`).
    pub url: Option<String>,
}

impl CalendarEntry {
    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the start value.
    pub fn with_start(mut self, start: RawTimestamp) -> Self {
        self.start = Some(start);
        self
    }

    /// Builder method to set the end value.
    pub fn with_end(mut self, end: RawTimestamp) -> Self {
        self.end = Some(end);
        self
    }

    /// Builder method to set the reference URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Task or event, with the times that belong to each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordKind {
    /// An assignment with a deadline.
    Task { due: DateTime<Tz> },
    /// A calendar event. `start == end` marks a point-in-time event.
    Event { start: DateTime<Tz>, end: DateTime<Tz> },
}

impl RecordKind {
    /// Returns the time the acceptance window is checked against.
    pub fn anchor_time(&self) -> &DateTime<Tz> {
        match self {
            Self::Task { due } => due,
            Self::Event { start, .. } => start,
        }
    }

    /// Returns `true` for tasks.
    pub fn is_task(&self) -> bool {
        matches!(self, Self::Task { .. })
    }
}

/// An accepted calendar entry, ready for emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRecord {
    /// Course name from the summary's bracket tag.
    pub course_title: String,
    /// Numeric course id from the reference URL.
    pub course_id: String,
    /// Summary without course tag and decoration.
    pub headline: String,
    /// Task or event.
    #[serde(flatten)]
    pub kind: RecordKind,
    /// Deep link to the item.
    pub url: String,
    /// Description copied from the entry.
    pub description: Option<String>,
}
