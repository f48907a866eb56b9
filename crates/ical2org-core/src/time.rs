//! Time types for calendar entries.
//!
//! This module provides [`RawTimestamp`] for the different ways a calendar
//! feed encodes a start or end value, the normalization rules that anchor
//! those values in the configured timezone, and [`AcceptanceWindow`] for
//! deciding which records fall inside the run's time range.
//!
//! Calendar exports frequently encode "all day" as a bare date or as a
//! midnight floating timestamp. Normalization collapses both into explicit
//! sentinel times:
//! - deadlines are due at 23:59 local time
//! - all-day events span 00:00 to 23:59 local time

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Days before `now` that are always part of the acceptance window.
pub const LOOKBACK_DAYS: i64 = 14;

/// Default lookahead, in days.
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 14;

/// A start or end value as it appears in the calendar feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum RawTimestamp {
    /// A bare date (`VALUE=DATE`).
    Date(NaiveDate),
    /// A wall-clock time without any zone information.
    Floating(NaiveDateTime),
    /// An absolute instant (`...Z` suffix).
    Utc(DateTime<Utc>),
    /// A wall-clock time tagged with a zone identifier (`TZID=` parameter).
    Zoned {
        local: NaiveDateTime,
        tzid: String,
    },
}

impl RawTimestamp {
    /// Returns `true` for the encodings that carry zone information.
    pub fn is_aware(&self) -> bool {
        matches!(self, Self::Utc(_) | Self::Zoned { .. })
    }

    /// Returns `true` for a bare date.
    pub fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

/// Normalizes the due time of a task.
///
/// Bare dates and floating times are due at 23:59 on their date; the
/// floating time-of-day is discarded. Aware values are converted to `tz`
/// keeping their instant.
pub fn normalize_due(raw: &RawTimestamp, tz: &Tz) -> DateTime<Tz> {
    match raw {
        RawTimestamp::Date(date) => anchor(tz, *date, 23, 59),
        RawTimestamp::Floating(naive) => anchor(tz, naive.date(), 23, 59),
        aware => resolve_aware(aware, tz),
    }
}

/// Normalizes the start and end of an event.
///
/// A bare-date start is anchored at 00:00 and a bare-date end at 23:59.
/// When both are bare dates and the end lies after the start, the end is
/// treated as exclusive (RFC 5545) and moved back one day before anchoring.
///
/// Floating values are anchored at 00:00 on their date, on both ends. This
/// drops any genuine floating time-of-day.
pub fn normalize_span(
    start: &RawTimestamp,
    end: &RawTimestamp,
    tz: &Tz,
) -> (DateTime<Tz>, DateTime<Tz>) {
    let normalized_start = match start {
        RawTimestamp::Date(date) => anchor(tz, *date, 0, 0),
        RawTimestamp::Floating(naive) => anchor(tz, naive.date(), 0, 0),
        aware => resolve_aware(aware, tz),
    };

    let normalized_end = match (start, end) {
        (RawTimestamp::Date(first), RawTimestamp::Date(last)) if last > first => {
            let inclusive = last.pred_opt().unwrap_or(*last);
            anchor(tz, inclusive, 23, 59)
        }
        (_, RawTimestamp::Date(date)) => anchor(tz, *date, 23, 59),
        (_, RawTimestamp::Floating(naive)) => anchor(tz, naive.date(), 0, 0),
        (_, aware) => resolve_aware(aware, tz),
    };

    (normalized_start, normalized_end)
}

fn resolve_aware(raw: &RawTimestamp, tz: &Tz) -> DateTime<Tz> {
    match raw {
        RawTimestamp::Utc(dt) => dt.with_timezone(tz),
        RawTimestamp::Zoned { local, tzid } => match tzid.parse::<Tz>() {
            Ok(source) => localize(&source, *local).with_timezone(tz),
            Err(_) => {
                warn!(tzid = %tzid, "Unknown TZID, reading time as configured timezone");
                localize(tz, *local)
            }
        },
        RawTimestamp::Date(date) => anchor(tz, *date, 0, 0),
        RawTimestamp::Floating(naive) => localize(tz, *naive),
    }
}

/// Anchors a wall-clock time of day on `date` in `tz`.
fn anchor(tz: &Tz, date: NaiveDate, hour: u32, minute: u32) -> DateTime<Tz> {
    let naive = date.and_hms_opt(hour, minute, 0).expect("valid time");
    localize(tz, naive)
}

/// Resolves a local wall-clock time in `tz`.
///
/// Folds resolve to the earlier instant; gaps move forward one hour.
fn localize(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

/// The range of times a record must fall in to be emitted.
///
/// Both ends are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Tz>,
    /// End of the window (inclusive).
    pub end: DateTime<Tz>,
}

impl AcceptanceWindow {
    /// Creates the window `[now - LOOKBACK_DAYS, now + lookahead_days]`.
    pub fn around(now: DateTime<Tz>, lookahead_days: u32) -> Self {
        Self {
            start: now - Duration::days(LOOKBACK_DAYS),
            end: now + Duration::days(i64::from(lookahead_days)),
        }
    }

    /// Checks if a datetime falls within this window.
    pub fn contains(&self, dt: &DateTime<Tz>) -> bool {
        self.start <= *dt && *dt <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use chrono_tz::America::{Los_Angeles, New_York};
    use chrono_tz::Europe::Berlin;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    fn hm<T: Timelike>(t: &T) -> (u32, u32) {
        (t.hour(), t.minute())
    }

    mod due {
        use super::*;

        #[test]
        fn date_is_due_end_of_day() {
            for tz in [New_York, Los_Angeles, Berlin] {
                let due = normalize_due(&RawTimestamp::Date(date(2024, 3, 1)), &tz);
                assert_eq!(due.date_naive(), date(2024, 3, 1));
                assert_eq!(hm(&due), (23, 59));
                assert_eq!(due.timezone(), tz);
            }
        }

        #[test]
        fn floating_time_of_day_is_discarded() {
            let due = normalize_due(&RawTimestamp::Floating(naive(2024, 3, 1, 9, 15)), &New_York);
            assert_eq!(due.date_naive(), date(2024, 3, 1));
            assert_eq!(hm(&due), (23, 59));
        }

        #[test]
        fn utc_is_converted() {
            let utc = Utc.with_ymd_and_hms(2024, 3, 2, 4, 59, 0).unwrap();
            let due = normalize_due(&RawTimestamp::Utc(utc), &New_York);
            assert_eq!(due.date_naive(), date(2024, 3, 1));
            assert_eq!(hm(&due), (23, 59));
            assert_eq!(due.with_timezone(&Utc), utc);
        }

        #[test]
        fn zoned_is_converted() {
            let raw = RawTimestamp::Zoned {
                local: naive(2024, 3, 1, 17, 0),
                tzid: "America/Los_Angeles".to_string(),
            };
            let due = normalize_due(&raw, &New_York);
            assert_eq!(hm(&due), (20, 0));
        }

        #[test]
        fn unknown_tzid_reads_as_configured_zone() {
            let raw = RawTimestamp::Zoned {
                local: naive(2024, 3, 1, 17, 0),
                tzid: "Pacific Standard Time".to_string(),
            };
            let due = normalize_due(&raw, &New_York);
            assert_eq!(hm(&due), (17, 0));
            assert_eq!(due.date_naive(), date(2024, 3, 1));
        }
    }

    mod span {
        use super::*;

        #[test]
        fn same_day_dates_cover_whole_day() {
            let day = RawTimestamp::Date(date(2024, 3, 1));
            let (start, end) = normalize_span(&day, &day, &Berlin);
            assert_eq!(hm(&start), (0, 0));
            assert_eq!(hm(&end), (23, 59));
            assert_eq!(start.date_naive(), end.date_naive());
        }

        #[test]
        fn exclusive_date_end_is_moved_back() {
            let (start, end) = normalize_span(
                &RawTimestamp::Date(date(2024, 3, 1)),
                &RawTimestamp::Date(date(2024, 3, 2)),
                &New_York,
            );
            assert_eq!(start.date_naive(), date(2024, 3, 1));
            assert_eq!(end.date_naive(), date(2024, 3, 1));
            assert_eq!(hm(&end), (23, 59));
        }

        #[test]
        fn multi_day_dates_keep_last_day() {
            let (_, end) = normalize_span(
                &RawTimestamp::Date(date(2024, 3, 1)),
                &RawTimestamp::Date(date(2024, 3, 4)),
                &New_York,
            );
            assert_eq!(end.day(), 3);
        }

        #[test]
        fn floating_collapses_to_midnight() {
            let (start, end) = normalize_span(
                &RawTimestamp::Floating(naive(2024, 3, 1, 10, 30)),
                &RawTimestamp::Floating(naive(2024, 3, 1, 11, 30)),
                &New_York,
            );
            assert_eq!(hm(&start), (0, 0));
            assert_eq!(start, end);
        }

        #[test]
        fn aware_keeps_time_of_day() {
            let (start, end) = normalize_span(
                &RawTimestamp::Utc(Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap()),
                &RawTimestamp::Utc(Utc.with_ymd_and_hms(2024, 3, 1, 16, 30, 0).unwrap()),
                &New_York,
            );
            assert_eq!(hm(&start), (10, 0));
            assert_eq!(hm(&end), (11, 30));
        }
    }

    #[test]
    fn dst_gap_moves_forward() {
        // 2024-03-10 02:30 does not exist in New York.
        let raw = RawTimestamp::Zoned {
            local: naive(2024, 3, 10, 2, 30),
            tzid: "America/New_York".to_string(),
        };
        let due = normalize_due(&raw, &New_York);
        assert_eq!(hm(&due), (3, 30));
    }

    #[test]
    fn dst_fold_takes_earlier_instant() {
        let raw = RawTimestamp::Zoned {
            local: naive(2024, 11, 3, 1, 30),
            tzid: "America/New_York".to_string(),
        };
        let due = normalize_due(&raw, &New_York);
        assert_eq!(
            due.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap()
        );
    }

    mod window {
        use super::*;

        fn now() -> DateTime<Tz> {
            New_York.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        }

        #[test]
        fn bounds_are_inclusive() {
            let window = AcceptanceWindow::around(now(), 14);
            assert!(window.contains(&(now() + Duration::days(14))));
            assert!(!window.contains(&(now() + Duration::days(14) + Duration::seconds(1))));
            assert!(window.contains(&(now() - Duration::days(LOOKBACK_DAYS))));
            let before = now() - Duration::days(LOOKBACK_DAYS) - Duration::seconds(1);
            assert!(!window.contains(&before));
        }

        #[test]
        fn lookback_ignores_lookahead() {
            let window = AcceptanceWindow::around(now(), 3);
            assert_eq!(window.start, now() - Duration::days(14));
            assert_eq!(window.end, now() + Duration::days(3));
        }

        #[test]
        fn zero_lookahead_still_accepts_past() {
            let window = AcceptanceWindow::around(now(), 0);
            assert!(window.contains(&(now() - Duration::days(2))));
            assert!(!window.contains(&(now() + Duration::minutes(1))));
        }
    }
}
