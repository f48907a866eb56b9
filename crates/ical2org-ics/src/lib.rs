//! iCalendar parsing into [`CalendarEntry`](ical2org_core::CalendarEntry) values.

pub mod error;
pub mod parse;

pub use error::{IcsError, IcsResult};
pub use parse::parse_calendar;
