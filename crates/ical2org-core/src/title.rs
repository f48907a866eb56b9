//! Course and headline extraction from event summaries.
//!
//! Canvas exports every event with the course appended in brackets, e.g.
//! `"Essay Draft [HIST101 - World History - S1]"`. Some feeds additionally
//! decorate the headline with a long instructor/section annotation in
//! parentheses which is dropped here.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Matches a headline followed by a verbose parenthetical annotation.
///
/// The greedy prefix selects the last qualifying parenthetical.
static DECORATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*) \(.{30,65}\)").expect("Invalid decoration regex"));

/// Why a summary could not be split into course and headline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    /// The entry has no summary at all.
    #[error("entry has no summary")]
    MissingSummary,
    /// The summary does not end in a `[...]` course tag.
    #[error("summary has no trailing course tag: {0:?}")]
    MissingCourseTag(String),
    /// The course tag is present but blank.
    #[error("summary has an empty course tag: {0:?}")]
    EmptyCourseTag(String),
}

/// The pieces of a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTitle {
    /// Interior of the trailing bracket pair.
    pub course_title: String,
    /// The summary without the course tag and decoration.
    pub headline: String,
}

/// Splits a summary into course title and headline.
pub fn parse_title(summary: &str) -> Result<ParsedTitle, TitleError> {
    let (before, course) = split_course_tag(summary)
        .ok_or_else(|| TitleError::MissingCourseTag(summary.to_string()))?;

    if course.trim().is_empty() {
        return Err(TitleError::EmptyCourseTag(summary.to_string()));
    }

    let headline = before.strip_suffix(' ').unwrap_or(before);
    let headline = headline.strip_prefix(' ').unwrap_or(headline);

    Ok(ParsedTitle {
        course_title: course.to_string(),
        headline: strip_decoration(headline).to_string(),
    })
}

/// Returns the text before the final bracket pair and the pair's interior.
///
/// Brackets nested inside the course tag are kept.
fn split_course_tag(summary: &str) -> Option<(&str, &str)> {
    let trimmed = summary.trim_end();
    let inner_end = trimmed.strip_suffix(']')?.len();

    let mut depth = 0usize;
    for (idx, ch) in trimmed.char_indices().rev() {
        match ch {
            ']' => depth += 1,
            '[' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&trimmed[..idx], &trimmed[idx + 1..inner_end]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Drops a verbose parenthetical (interior of 30 to 65 characters) and
/// everything after it.
fn strip_decoration(headline: &str) -> &str {
    DECORATION_REGEX
        .captures(headline)
        .and_then(|caps| caps.get(1))
        .map_or(headline, |m| m.as_str())
}
