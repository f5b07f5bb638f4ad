use crate::domain::countdown::CountdownTimer;
use crate::domain::models::{format_hhmm, CurrentResult, EntryKind, NextResult, ScheduleEntry};
use crate::domain::schedule::{resolve_current, resolve_next};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct KindDescriptor {
    pub icon: &'static str,
    pub tone: &'static str,
}

pub fn kind_descriptor(kind: EntryKind) -> KindDescriptor {
    match kind {
        EntryKind::Class => KindDescriptor {
            icon: "book-open",
            tone: "primary",
        },
        EntryKind::Break => KindDescriptor {
            icon: "coffee",
            tone: "secondary",
        },
        EntryKind::Lunch => KindDescriptor {
            icon: "users",
            tone: "success",
        },
    }
}

pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimerView {
    pub phase: String,
    pub preset_minutes: u32,
    pub remaining_seconds: u32,
    pub display: String,
    pub progress_percent: f64,
}

impl TimerView {
    pub fn from_timer(timer: &CountdownTimer) -> Self {
        Self {
            phase: timer.phase().as_str().to_string(),
            preset_minutes: timer.preset_minutes(),
            remaining_seconds: timer.remaining_seconds(),
            display: format_clock(timer.remaining_seconds()),
            progress_percent: timer.progress_percent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BoardSnapshot {
    pub now: NaiveDateTime,
    pub current: Option<CurrentResult>,
    pub current_descriptor: Option<KindDescriptor>,
    pub current_progress_percent: Option<f64>,
    pub next: Option<NextResult>,
    pub timer: TimerView,
    pub headline: String,
    pub subline: String,
}

/// Resolves the timetable once for `now` and renders the display state.
pub fn build_snapshot(
    schedule: &[ScheduleEntry],
    now: NaiveDateTime,
    timer: &CountdownTimer,
) -> BoardSnapshot {
    let current = resolve_current(schedule, now);
    let next = resolve_next(schedule, now);

    BoardSnapshot {
        now,
        current_descriptor: current
            .as_ref()
            .map(|result| kind_descriptor(result.entry.kind)),
        current_progress_percent: current.as_ref().map(entry_progress_percent),
        headline: headline(current.as_ref()),
        subline: subline(next.as_ref()),
        current,
        next,
        timer: TimerView::from_timer(timer),
    }
}

/// Share of the current entry already elapsed, in whole-minute steps.
pub fn entry_progress_percent(current: &CurrentResult) -> f64 {
    let duration = f64::from(current.entry.duration_minutes);
    if duration <= 0.0 {
        return 0.0;
    }
    let elapsed = (duration - current.minutes_remaining as f64).clamp(0.0, duration);
    elapsed / duration * 100.0
}

fn headline(current: Option<&CurrentResult>) -> String {
    match current {
        Some(result) => format!(
            "{} - {} min left",
            result.entry.label, result.minutes_remaining
        ),
        None => "Break time".to_string(),
    }
}

fn subline(next: Option<&NextResult>) -> String {
    match next {
        Some(result) => format!("Next: {} in {} min", result.entry.label, result.minutes_until),
        None => "No more classes today".to_string(),
    }
}

pub fn render_text(snapshot: &BoardSnapshot) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "{}",
        snapshot.now.format("%A, %B %-d, %Y  %H:%M:%S")
    );
    let _ = writeln!(text, "{}", snapshot.headline);
    if let Some(location) = snapshot
        .current
        .as_ref()
        .and_then(|result| result.entry.location.as_deref())
    {
        let _ = writeln!(text, "  at {location}");
    }
    if let Some(progress) = snapshot.current_progress_percent {
        let _ = writeln!(text, "  {progress:.0}% complete");
    }
    let _ = writeln!(text, "{}", snapshot.subline);
    if let Some(next) = snapshot.next.as_ref() {
        let starts = format_hhmm(next.entry.start_time);
        match next.entry.location.as_deref() {
            Some(location) => {
                let _ = writeln!(text, "  {location} - Starts at {starts}");
            }
            None => {
                let _ = writeln!(text, "  Starts at {starts}");
            }
        }
    }
    let _ = writeln!(
        text,
        "Timer {} [{}] {:.0}%",
        snapshot.timer.display, snapshot.timer.phase, snapshot.timer.progress_percent
    );
    text
}

/// One line per timetable entry, marking the entry in progress.
pub fn render_timetable(schedule: &[ScheduleEntry], current: Option<&CurrentResult>) -> String {
    let mut text = String::new();
    for entry in schedule {
        let marker = if current.is_some_and(|result| result.entry == *entry) {
            ">"
        } else {
            " "
        };
        let _ = write!(
            text,
            "{marker} {} [{}] {} - {} min",
            format_hhmm(entry.start_time),
            kind_descriptor(entry.kind).icon,
            entry.label,
            entry.duration_minutes
        );
        if let Some(location) = entry.location.as_deref() {
            let _ = write!(text, " - {location}");
        }
        text.push('\n');
    }
    text
}
