//! Org outline rendering.
//!
//! The document is the caller's prefix followed by one section per course:
//!
//! ```text
//! * HIST101 :55:
//! ** NEXT Essay Draft
//! DEADLINE: <2024-03-01 Fri 23:59>
//! :PROPERTIES:
//! :LINK:     https://school.instructure.com/courses/55/assignments/200
//! :END:
//! ```
//!
//! Each section starts with a newline and each record ends with one, so the
//! prefix does not need a trailing newline.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::builder::{CourseGroup, CourseGroups};
use crate::error::PipelineResult;
use crate::record::{NormalizedRecord, RecordKind};

/// Default keyword for task headings.
pub const DEFAULT_TODO_KEYWORD: &str = "NEXT";

const DATE_FORMAT: &str = "%Y-%m-%d %a";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %a %H:%M";
const TIME_FORMAT: &str = "%H:%M";

/// Options for outline rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Literal text written before the first course.
    pub prefix: String,
    /// Keyword placed before task headlines.
    pub todo_keyword: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            todo_keyword: DEFAULT_TODO_KEYWORD.to_string(),
        }
    }
}

impl EmitOptions {
    /// Set the document prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the task keyword.
    #[must_use]
    pub fn with_todo_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.todo_keyword = keyword.into();
        self
    }
}

/// Renders the grouped records as an Org document.
pub fn render_outline(groups: &CourseGroups, options: &EmitOptions) -> String {
    let mut output = options.prefix.clone();
    for group in groups.iter() {
        render_course(&mut output, group, options);
    }
    output
}

/// Renders the grouped records as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(groups: &CourseGroups) -> PipelineResult<String> {
    Ok(serde_json::to_string_pretty(groups)?)
}

fn render_course(output: &mut String, group: &CourseGroup, options: &EmitOptions) {
    let Some(tag) = group.tag() else {
        return;
    };

    output.push_str(&format!("\n* {} :{}:", group.course_title, tag));
    for record in &group.records {
        render_record(output, record, options);
    }
}

fn render_record(output: &mut String, record: &NormalizedRecord, options: &EmitOptions) {
    match &record.kind {
        RecordKind::Task { due } => {
            output.push_str(&format!("\n** {} {}", options.todo_keyword, record.headline));
            output.push_str(&format!("\nDEADLINE: <{}>", due.format(DATE_TIME_FORMAT)));
        }
        RecordKind::Event { start, end } => {
            output.push_str(&format!("\n** {}", record.headline));
            output.push('\n');
            output.push_str(&event_timestamp(start, end));
        }
    }

    output.push_str(&format!("\n:PROPERTIES:\n:LINK:     {}\n:END:", record.url));

    if let Some(description) = &record.description {
        output.push_str("\n ");
        output.push_str(&indent_description(description));
    }
    output.push('\n');
}

/// Formats an event's active timestamp.
fn event_timestamp(start: &DateTime<Tz>, end: &DateTime<Tz>) -> String {
    if start == end {
        format!("<{}>", start.format(DATE_FORMAT))
    } else if start.date_naive() == end.date_naive() {
        format!(
            "<{}-{}>",
            start.format(DATE_TIME_FORMAT),
            end.format(TIME_FORMAT)
        )
    } else {
        format!(
            "<{}>--<{}>",
            start.format(DATE_TIME_FORMAT),
            end.format(DATE_TIME_FORMAT)
        )
    }
}

/// Indents continuation lines by one space so they nest under the heading.
fn indent_description(description: &str) -> String {
    description.replace("\r\n", "\n").replace('\n', "\n ")
}
