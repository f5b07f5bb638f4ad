use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

/// Source of the current wall-clock instant for the board.
pub type NowProvider = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Local wall-clock time in `timezone`, which is what the timetable is
/// written in.
pub fn system_now_provider(timezone: Tz) -> NowProvider {
    Arc::new(move || Utc::now().with_timezone(&timezone).naive_local())
}

pub fn fixed_now_provider(instant: NaiveDateTime) -> NowProvider {
    Arc::new(move || instant)
}
