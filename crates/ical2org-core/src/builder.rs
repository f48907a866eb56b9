//! Calendar entries to grouped records.
//!
//! For every entry the pipeline runs, in order:
//! 1. identifier extraction (skip entries without a course)
//! 2. the dedup filter (skip already tracked links)
//! 3. title parsing and the course exclusion list
//! 4. time normalization and the acceptance window
//!
//! Accepted records are grouped by course title in first-seen order.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info};

use crate::dedup::DedupFilter;
use crate::identifier::{extract_item_link, normalize_base_host};
use crate::record::{CalendarEntry, NormalizedRecord, RecordKind};
use crate::time::{AcceptanceWindow, DEFAULT_LOOKAHEAD_DAYS, normalize_due, normalize_span};
use crate::title::parse_title;

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Timezone all times are normalized to.
    pub timezone: Tz,
    /// Host used to build item links.
    pub base_host: String,
    /// Days after now that are accepted.
    pub lookahead_days: u32,
    /// Course titles to drop.
    pub exclude: HashSet<String>,
}

impl PipelineOptions {
    /// Creates options with the default lookahead and no exclusions.
    pub fn new(timezone: Tz, base: &str) -> Self {
        Self {
            timezone,
            base_host: normalize_base_host(base),
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
            exclude: HashSet::new(),
        }
    }

    /// Set the lookahead in days.
    #[must_use]
    pub fn with_lookahead_days(mut self, days: u32) -> Self {
        self.lookahead_days = days;
        self
    }

    /// Add course titles to the exclusion list.
    #[must_use]
    pub fn with_excluded<I, S>(mut self, courses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(courses.into_iter().map(Into::into));
        self
    }
}

/// Why an entry was not turned into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The reference URL has no course marker.
    NoCourse,
    /// The link already occurs in the dedup reference.
    AlreadyTracked,
    /// The summary has no usable course tag.
    UnparseableTitle,
    /// A task has neither DTEND nor DTSTART, or an event has no DTSTART.
    MissingTimestamp,
    /// The course is on the exclusion list.
    Excluded,
    /// The due or start time lies outside the acceptance window.
    OutsideWindow,
}

impl SkipReason {
    /// Returns a short name for this reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoCourse => "no_course",
            Self::AlreadyTracked => "already_tracked",
            Self::UnparseableTitle => "unparseable_title",
            Self::MissingTimestamp => "missing_timestamp",
            Self::Excluded => "excluded",
            Self::OutsideWindow => "outside_window",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The records of one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseGroup {
    pub course_title: String,
    pub records: Vec<NormalizedRecord>,
}

impl CourseGroup {
    /// Returns the course id of the first record.
    pub fn tag(&self) -> Option<&str> {
        self.records.first().map(|r| r.course_id.as_str())
    }
}

/// Accepted records grouped by course title.
///
/// Courses and the records within a course keep their first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CourseGroups {
    groups: Vec<CourseGroup>,
}

impl CourseGroups {
    /// Creates an empty grouping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to its course, creating the course if needed.
    pub fn insert(&mut self, record: NormalizedRecord) {
        match self
            .groups
            .iter_mut()
            .find(|g| g.course_title == record.course_title)
        {
            Some(group) => group.records.push(record),
            None => self.groups.push(CourseGroup {
                course_title: record.course_title.clone(),
                records: vec![record],
            }),
        }
    }

    /// Iterates over the courses in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &CourseGroup> {
        self.groups.iter()
    }

    /// Returns the group for a course title.
    pub fn get(&self, course_title: &str) -> Option<&CourseGroup> {
        self.groups.iter().find(|g| g.course_title == course_title)
    }

    /// Number of courses.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if no record was accepted.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of records across all courses.
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|g| g.records.len()).sum()
    }
}

/// Counts of accepted and skipped entries for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub accepted: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl BuildReport {
    /// Number of entries skipped for `reason`.
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    /// Total number of skipped entries.
    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_default() += 1;
    }
}

/// Runs the pipeline over all entries.
///
/// `now` is taken as an argument so runs are reproducible.
pub fn build_outline<'a, I>(
    entries: I,
    options: &PipelineOptions,
    dedup: &DedupFilter,
    now: DateTime<Tz>,
) -> (CourseGroups, BuildReport)
where
    I: IntoIterator<Item = &'a CalendarEntry>,
{
    let window = AcceptanceWindow::around(
        now.with_timezone(&options.timezone),
        options.lookahead_days,
    );
    debug!(start = %window.start, end = %window.end, "Acceptance window");

    let mut groups = CourseGroups::new();
    let mut report = BuildReport::default();

    for entry in entries {
        match build_record(entry, options, dedup, &window) {
            Ok(record) => {
                report.accepted += 1;
                groups.insert(record);
            }
            Err(reason) => {
                debug!(
                    reason = %reason,
                    summary = ?entry.summary,
                    url = ?entry.url,
                    "Skipped calendar entry"
                );
                report.skip(reason);
            }
        }
    }

    info!(
        accepted = report.accepted,
        skipped = report.total_skipped(),
        courses = groups.len(),
        "Built outline"
    );

    (groups, report)
}

/// Turns one entry into a record, or says why it was skipped.
pub fn build_record(
    entry: &CalendarEntry,
    options: &PipelineOptions,
    dedup: &DedupFilter,
    window: &AcceptanceWindow,
) -> Result<NormalizedRecord, SkipReason> {
    let link = entry
        .url
        .as_deref()
        .and_then(|url| extract_item_link(url, &options.base_host))
        .ok_or(SkipReason::NoCourse)?;

    if dedup.is_tracked(&link.url) {
        return Err(SkipReason::AlreadyTracked);
    }

    let title = entry
        .summary
        .as_deref()
        .ok_or(SkipReason::UnparseableTitle)
        .and_then(|summary| parse_title(summary).map_err(|_| SkipReason::UnparseableTitle))?;

    if options.exclude.contains(&title.course_title) {
        return Err(SkipReason::Excluded);
    }

    let tz = &options.timezone;

    // Tasks are due at DTEND, falling back to DTSTART. Events need DTSTART.
    let kind = if link.kind.is_assignment() {
        let due = entry
            .end
            .as_ref()
            .or(entry.start.as_ref())
            .ok_or(SkipReason::MissingTimestamp)?;
        RecordKind::Task {
            due: normalize_due(due, tz),
        }
    } else {
        let start = entry.start.as_ref().ok_or(SkipReason::MissingTimestamp)?;
        let end = entry.end.as_ref().unwrap_or(start);
        let (start, end) = normalize_span(start, end, tz);
        RecordKind::Event { start, end }
    };

    if !window.contains(kind.anchor_time()) {
        return Err(SkipReason::OutsideWindow);
    }

    Ok(NormalizedRecord {
        course_title: title.course_title,
        course_id: link.course_id,
        headline: title.headline,
        kind,
        url: link.url,
        description: entry.description.clone(),
    })
}
