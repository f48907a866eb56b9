//! One conversion run: read, build, render, write.

use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use ical2org_core::{BuildReport, DedupFilter, build_outline, render_json, render_outline};
use ical2org_ics::parse_calendar;

use crate::config::{OutputFormat, OutputTarget, RunOptions};
use crate::error::{CliError, CliResult};

/// Runs the conversion against the current time.
pub fn run(options: &RunOptions) -> CliResult<BuildReport> {
    run_at(options, Utc::now())
}

/// Runs the conversion with an explicit reference time.
///
/// The output is only touched once everything has been built, so a failed
/// run leaves a previous outline intact.
pub fn run_at(options: &RunOptions, now: DateTime<Utc>) -> CliResult<BuildReport> {
    let ics = std::fs::read_to_string(&options.ics).map_err(|e| CliError::read(&options.ics, e))?;
    let entries = parse_calendar(&ics)?;
    debug!(path = %options.ics.display(), entries = entries.len(), "Parsed calendar");

    let dedup = DedupFilter::load(options.dedup_reference.as_deref())?;

    let now = now.with_timezone(&options.pipeline.timezone);
    let (groups, report) = build_outline(&entries, &options.pipeline, &dedup, now);

    let document = match options.format {
        OutputFormat::Org => render_outline(&groups, &options.emit),
        OutputFormat::Json => render_json(&groups)?,
    };

    write_output(&options.output, &document)?;
    Ok(report)
}

/// Writes the document to its target.
///
/// Files are written to a temporary sibling and renamed over the target. An
/// existing target keeps its permissions; a new one gets the usual
/// umask-filtered `0666`.
pub fn write_output(target: &OutputTarget, document: &str) -> CliResult<()> {
    match target {
        OutputTarget::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(document.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|e| CliError::write(Path::new("-"), e))
        }
        OutputTarget::File(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let mut file = temp_file_in(dir).map_err(|e| CliError::write(path, e))?;
            file.write_all(document.as_bytes())
                .map_err(|e| CliError::write(path, e))?;
            if let Ok(metadata) = std::fs::metadata(path) {
                file.as_file()
                    .set_permissions(metadata.permissions())
                    .map_err(|e| CliError::write(path, e))?;
            }
            file.persist(path).map_err(|e| CliError::write(path, e.error))?;
            info!(path = %path.display(), bytes = document.len(), "Wrote outline");
            Ok(())
        }
    }
}

fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".ical2org");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chrono::TimeZone;
    use chrono_tz::America::New_York;
    use ical2org_core::{EmitOptions, PipelineOptions, SkipReason};

    const FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Instructure//Canvas//EN\r\n\
BEGIN:VEVENT\r\n\
UID:event-assignment-200\r\n\
DTSTAMP:20240220T120000Z\r\n\
DTSTART;VALUE=DATE:20240301\r\n\
DTEND;VALUE=DATE:20240301\r\n\
SUMMARY:Essay Draft [HIST101]\r\n\
URL:https://school.instructure.com/calendar?include_contexts=course_55#assignment_200\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:event-personal\r\n\
DTSTAMP:20240220T120000Z\r\n\
DTSTART:20240301T150000Z\r\n\
DTEND:20240301T160000Z\r\n\
SUMMARY:Dentist\r\n\
URL:https://school.instructure.com/calendar?include_contexts=user_9#calendar_event_1\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn now() -> DateTime<Utc> {
        New_York
            .with_ymd_and_hms(2024, 2, 25, 9, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn options(dir: &Path, output: OutputTarget) -> RunOptions {
        let ics = dir.join("feed.ics");
        std::fs::write(&ics, FEED).unwrap();
        RunOptions {
            ics,
            output,
            format: OutputFormat::Org,
            dedup_reference: None,
            pipeline: PipelineOptions::new(New_York, "school.instructure.com"),
            emit: EmitOptions::default().with_prefix("#+TITLE: School"),
        }
    }

    #[test]
    fn writes_outline_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("gcal.org");
        let options = options(dir.path(), OutputTarget::File(out.clone()));

        let report = run_at(&options, now()).unwrap();
        assert_eq!(report.accepted, 1);
        assert_eq!(report.skipped_for(SkipReason::NoCourse), 1);

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(
            written,
            "#+TITLE: School\n* HIST101 :55:\n** NEXT Essay Draft\n\
             DEADLINE: <2024-03-01 Fri 23:59>\n:PROPERTIES:\n\
             :LINK:     https://school.instructure.com/courses/55/assignments/200\n:END:\n"
        );
    }

    #[test]
    fn replaces_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("gcal.org");
        std::fs::write(&out, "stale content that is much longer than the new outline").unwrap();
        let mut options = options(dir.path(), OutputTarget::File(out.clone()));
        options.pipeline = options.pipeline.with_excluded(["HIST101"]);

        run_at(&options, now()).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "#+TITLE: School");
    }

    #[cfg(unix)]
    #[test]
    fn replacing_output_keeps_its_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("gcal.org");
        std::fs::write(&out, "previous").unwrap();
        std::fs::set_permissions(&out, std::fs::Permissions::from_mode(0o640)).unwrap();
        let options = options(dir.path(), OutputTarget::File(out.clone()));

        run_at(&options, now()).unwrap();
        let mode = std::fs::metadata(&out).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
        assert!(std::fs::read_to_string(&out).unwrap().contains("Essay Draft"));
    }

    #[cfg(unix)]
    #[test]
    fn new_output_is_not_owner_only_by_default() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("reference");
        std::fs::write(&reference, "").unwrap();
        let expected = std::fs::metadata(&reference).unwrap().permissions().mode() & 0o777;

        let out = dir.path().join("gcal.org");
        write_output(&OutputTarget::File(out.clone()), "outline").unwrap();
        let mode = std::fs::metadata(&out).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, expected);
    }

    #[test]
    fn json_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("gcal.json");
        let mut options = options(dir.path(), OutputTarget::File(out.clone()));
        options.format = OutputFormat::Json;

        run_at(&options, now()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json[0]["course_title"], "HIST101");
        assert_eq!(json[0]["records"][0]["kind"], "task");
    }

    #[test]
    fn missing_calendar_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options(dir.path(), OutputTarget::Stdout);
        options.ics = dir.path().join("missing.ics");

        assert!(matches!(run_at(&options, now()), Err(CliError::Read { .. })));
    }

    #[test]
    fn invalid_calendar_leaves_output_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("gcal.org");
        std::fs::write(&out, "previous").unwrap();
        let options = options(dir.path(), OutputTarget::File(out.clone()));
        std::fs::write(&options.ics, "this is not a calendar").unwrap();

        assert!(matches!(run_at(&options, now()), Err(CliError::Calendar(_))));
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "previous");
    }

    #[test]
    fn unwritable_output_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let out: PathBuf = dir.path().join("no-such-dir").join("gcal.org");
        let options = options(dir.path(), OutputTarget::File(out));

        assert!(matches!(run_at(&options, now()), Err(CliError::Write { .. })));
    }
}
