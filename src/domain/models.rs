use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Class,
    Break,
    Lunch,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Break => "break",
            Self::Lunch => "lunch",
        }
    }
}

/// One fixed-duration block of the school day.
///
/// `start_time` is local wall-clock time with minute precision; the entry
/// carries no date and no timezone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleEntry {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub label: String,
    pub kind: EntryKind,
    pub duration_minutes: u32,
    pub location: Option<String>,
}

impl ScheduleEntry {
    pub fn validate(&self) -> Result<(), String> {
        if self.label.trim().is_empty() {
            return Err("schedule.entry.label must not be empty".to_string());
        }
        if self.duration_minutes == 0 {
            return Err(format!(
                "schedule.entry.duration_minutes must be > 0 (entry {})",
                self.label
            ));
        }
        Ok(())
    }

    fn start_minute_of_day(&self) -> u64 {
        u64::from(self.start_time.hour() * 60 + self.start_time.minute())
    }

    fn end_minute_of_day(&self) -> u64 {
        self.start_minute_of_day() + u64::from(self.duration_minutes)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CurrentResult {
    pub entry: ScheduleEntry,
    pub minutes_remaining: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NextResult {
    pub entry: ScheduleEntry,
    pub minutes_until: i64,
}

/// Checks the preconditions the resolver relies on: start times strictly
/// ascending and no entry running into the next one. Entries that touch
/// (one ends exactly when the next starts) are accepted. Only the last
/// entry can run past midnight without overlapping a later one.
pub fn validate_timetable(entries: &[ScheduleEntry]) -> Result<(), String> {
    for entry in entries {
        entry.validate()?;
    }

    for pair in entries.windows(2) {
        let (previous, next) = (&pair[0], &pair[1]);
        if next.start_time <= previous.start_time {
            return Err(format!(
                "schedule entries must be ordered by start time: {} ({}) is not after {} ({})",
                next.label,
                format_hhmm(next.start_time),
                previous.label,
                format_hhmm(previous.start_time)
            ));
        }
        if previous.end_minute_of_day() > next.start_minute_of_day() {
            return Err(format!(
                "schedule entries must not overlap: {} runs into {}",
                previous.label, next.label
            ));
        }
    }
    Ok(())
}

pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

pub fn format_hhmm(value: NaiveTime) -> String {
    value.format("%H:%M").to_string()
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_hhmm(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_hhmm(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("expected HH:MM, got {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(start: &str, label: &str, kind: EntryKind, duration_minutes: u32) -> ScheduleEntry {
        ScheduleEntry {
            start_time: parse_hhmm(start).expect("valid HH:MM"),
            label: label.to_string(),
            kind,
            duration_minutes,
            location: None,
        }
    }

    fn sample_day() -> Vec<ScheduleEntry> {
        vec![
            entry("09:00", "Mathematics", EntryKind::Class, 60),
            entry("10:00", "Break", EntryKind::Break, 15),
            entry("10:15", "Physics", EntryKind::Class, 60),
        ]
    }

    #[test]
    fn entry_validate_rejects_zero_duration() {
        let mut invalid = entry("09:00", "Mathematics", EntryKind::Class, 60);
        invalid.duration_minutes = 0;
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn entry_validate_rejects_blank_label() {
        let invalid = entry("09:00", "  ", EntryKind::Class, 60);
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn timetable_accepts_touching_entries() {
        assert!(validate_timetable(&sample_day()).is_ok());
        assert!(validate_timetable(&[]).is_ok());
    }

    #[test]
    fn timetable_rejects_unordered_entries() {
        let mut day = sample_day();
        day.swap(0, 2);
        let message = validate_timetable(&day).expect_err("unordered");
        assert!(message.contains("ordered"));
    }

    #[test]
    fn timetable_rejects_overlap() {
        let day = vec![
            entry("09:00", "Mathematics", EntryKind::Class, 61),
            entry("10:00", "Break", EntryKind::Break, 15),
        ];
        let message = validate_timetable(&day).expect_err("overlap");
        assert!(message.contains("overlap"));
    }

    #[test]
    fn timetable_rejects_duration_that_spans_past_the_next_entry() {
        let day = vec![
            entry("09:00", "Mathematics", EntryKind::Class, u32::MAX),
            entry("10:00", "Break", EntryKind::Break, 15),
        ];
        let message = validate_timetable(&day).expect_err("overlap");
        assert!(message.contains("overlap"));
    }

    #[test]
    fn timetable_allows_last_entry_past_midnight() {
        let day = vec![
            entry("22:00", "Study hall", EntryKind::Class, 60),
            entry("23:30", "Night lab", EntryKind::Class, 90),
        ];
        assert!(validate_timetable(&day).is_ok());
    }

    #[test]
    fn entry_serializes_start_time_as_hhmm() {
        let mut physics = entry("10:15", "Physics", EntryKind::Class, 60);
        physics.location = Some("Lab 2".to_string());
        let value = serde_json::to_value(&physics).expect("serialize entry");
        assert_eq!(value["start_time"], "10:15");
        assert_eq!(value["kind"], "class");

        let roundtrip: ScheduleEntry = serde_json::from_value(value).expect("deserialize entry");
        assert_eq!(roundtrip, physics);
    }

    #[test]
    fn entry_rejects_malformed_start_time() {
        let raw = serde_json::json!({
            "start_time": "9h15",
            "label": "Physics",
            "kind": "class",
            "duration_minutes": 60,
            "location": null
        });
        assert!(serde_json::from_value::<ScheduleEntry>(raw).is_err());
    }
}
