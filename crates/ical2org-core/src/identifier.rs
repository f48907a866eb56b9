//! Course and item identifiers from Canvas reference URLs.
//!
//! Canvas calendar feeds carry a reference URL per event, either in fragment
//! form (`...calendar?include_contexts=course_55#assignment_200`) or as a
//! direct path (`.../courses/55/assignments/200`). The identifiers found there
//! decide whether the entry is a task or an event and yield the canonical
//! link that is written to the outline.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

static COURSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"courses?[_/]([0-9]+)").expect("Invalid course regex"));

static ASSIGNMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"assignment(?:_|s/)([0-9]+)").expect("Invalid assignment regex")
});

static CALENDAR_EVENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"calendar_event(?:_|s/)([0-9]*)").expect("Invalid calendar event regex")
});

/// What kind of Canvas item a reference URL points to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum LinkKind {
    /// An assignment; becomes a task with a deadline.
    Assignment(String),
    /// A calendar event; the id may be missing from the feed.
    CalendarEvent(Option<String>),
}

impl LinkKind {
    /// Returns `true` if the item is an assignment.
    pub fn is_assignment(&self) -> bool {
        matches!(self, Self::Assignment(_))
    }
}

/// The identifiers extracted from one reference URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemLink {
    /// Numeric course id.
    pub course_id: String,
    /// The item kind and its id.
    pub kind: LinkKind,
    /// Deep link to the item.
    pub url: String,
}

impl fmt::Display for ItemLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Extracts course and item identifiers from a reference URL.
///
/// Returns `None` when the URL has no course marker, which means the entry is
/// not course related.
pub fn extract_item_link(reference_url: &str, base_host: &str) -> Option<ItemLink> {
    let course_id = COURSE_REGEX.captures(reference_url)?.get(1)?.as_str();

    let kind = match ASSIGNMENT_REGEX.captures(reference_url).and_then(|c| c.get(1)) {
        Some(assignment) => LinkKind::Assignment(assignment.as_str().to_string()),
        None => LinkKind::CalendarEvent(
            CALENDAR_EVENT_REGEX
                .captures(reference_url)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        ),
    };

    let url = match &kind {
        LinkKind::Assignment(id) => {
            format!("https://{base_host}/courses/{course_id}/assignments/{id}")
        }
        LinkKind::CalendarEvent(id) => format!(
            "https://{base_host}/courses/{course_id}/calendar_events/{}",
            id.as_deref().unwrap_or_default()
        ),
    };

    Some(ItemLink {
        course_id: course_id.to_string(),
        kind,
        url,
    })
}

/// Reduces a configured base to `host[:port]`.
///
/// Accepts either a bare host (`school.instructure.com`) or a full URL
/// (`https://school.instructure.com/`). Anything that does not parse as a URL
/// with a host is returned trimmed of slashes.
pub fn normalize_base_host(base: &str) -> String {
    let base = base.trim();
    if let Ok(parsed) = Url::parse(base)
        && let Some(host) = parsed.host_str()
    {
        return match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
    }
    base.trim_matches('/').to_string()
}
