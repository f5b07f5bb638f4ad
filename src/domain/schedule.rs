use crate::domain::models::{CurrentResult, NextResult, ScheduleEntry};
use chrono::{Duration, NaiveDate, NaiveDateTime};

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Returns the first entry, in list order, whose window
/// `[start, start + duration]` contains `now`. Both bounds are inclusive.
///
/// Each entry is anchored to the calendar date of `now`. The timetable is
/// expected to be ordered and non-overlapping; if it is not, the first
/// match still wins.
pub fn resolve_current(schedule: &[ScheduleEntry], now: NaiveDateTime) -> Option<CurrentResult> {
    schedule.iter().find_map(|entry| {
        let (start, end) = entry_window(entry, now.date());
        (start <= now && now <= end).then(|| CurrentResult {
            entry: entry.clone(),
            minutes_remaining: ceil_minutes(end - now),
        })
    })
}

/// Returns the first entry, in list order, that starts strictly after
/// `now`. Does not look past the end of the day.
pub fn resolve_next(schedule: &[ScheduleEntry], now: NaiveDateTime) -> Option<NextResult> {
    schedule.iter().find_map(|entry| {
        let (start, _) = entry_window(entry, now.date());
        (start > now).then(|| NextResult {
            entry: entry.clone(),
            minutes_until: ceil_minutes(start - now),
        })
    })
}

fn entry_window(entry: &ScheduleEntry, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(entry.start_time);
    let end = start + Duration::minutes(i64::from(entry.duration_minutes));
    (start, end)
}

// Countdown rounding: 1 second before a boundary still reads as 1 minute.
fn ceil_minutes(delta: Duration) -> i64 {
    let millis = delta.num_milliseconds();
    let whole = millis.div_euclid(MILLIS_PER_MINUTE);
    if millis.rem_euclid(MILLIS_PER_MINUTE) > 0 {
        whole + 1
    } else {
        whole
    }
}
