//! Core pipeline: calendar entries to a per-course Org outline.

pub mod builder;
pub mod dedup;
pub mod emit;
pub mod error;
pub mod identifier;
pub mod record;
pub mod time;
pub mod title;
pub mod tracing;

pub use builder::{
    BuildReport, CourseGroup, CourseGroups, PipelineOptions, SkipReason, build_outline,
    build_record,
};
pub use dedup::DedupFilter;
pub use emit::{DEFAULT_TODO_KEYWORD, EmitOptions, render_json, render_outline};
pub use error::{PipelineError, PipelineResult};
pub use identifier::{ItemLink, LinkKind, extract_item_link, normalize_base_host};
pub use record::{CalendarEntry, NormalizedRecord, RecordKind};
pub use time::{
    AcceptanceWindow, DEFAULT_LOOKAHEAD_DAYS, LOOKBACK_DAYS, RawTimestamp, normalize_due,
    normalize_span,
};
pub use title::{ParsedTitle, TitleError, parse_title};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
