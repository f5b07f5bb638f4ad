use crate::domain::countdown::{
    validate_timer_minutes, DEFAULT_TIMER_MINUTES, DEFAULT_TIMER_PRESETS,
};
use crate::domain::models::{parse_hhmm, validate_timetable, EntryKind, ScheduleEntry};
use crate::infrastructure::error::InfraError;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const APP_JSON: &str = "app.json";
const SCHEDULE_JSON: &str = "schedule.json";
const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigBundle {
    pub app: serde_json::Value,
    pub schedule: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub app_name: String,
    pub timezone: Tz,
    pub timer_presets: Vec<u32>,
    pub default_timer_minutes: u32,
}

/// On-disk shape of one timetable row in `schedule.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct ScheduleEntryRecord {
    start_time: String,
    label: String,
    kind: String,
    duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

impl ScheduleEntryRecord {
    fn into_entry(self, index: usize) -> Result<ScheduleEntry, InfraError> {
        let start_time = parse_hhmm(&self.start_time).ok_or_else(|| {
            InfraError::InvalidSchedule(format!("entries[{index}].startTime must be HH:MM"))
        })?;
        let kind = parse_entry_kind(&self.kind).ok_or_else(|| {
            InfraError::InvalidSchedule(format!(
                "entries[{index}].kind unsupported: {}",
                self.kind
            ))
        })?;
        let location = self
            .location
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned);
        Ok(ScheduleEntry {
            start_time,
            label: self.label.trim().to_string(),
            kind,
            duration_minutes: self.duration_minutes,
            location,
        })
    }
}

fn default_schedule() -> serde_json::Value {
    serde_json::json!({
        "schema": 1,
        "entries": [
            { "startTime": "09:00", "label": "Mathematics", "kind": "class", "durationMinutes": 60, "location": "Room 101" },
            { "startTime": "10:00", "label": "Break", "kind": "break", "durationMinutes": 15 },
            { "startTime": "10:15", "label": "Physics", "kind": "class", "durationMinutes": 60, "location": "Lab 2" },
            { "startTime": "11:15", "label": "Chemistry", "kind": "class", "durationMinutes": 60, "location": "Lab 1" },
            { "startTime": "12:15", "label": "Lunch Break", "kind": "lunch", "durationMinutes": 45 },
            { "startTime": "13:00", "label": "Literature", "kind": "class", "durationMinutes": 60, "location": "Room 205" },
            { "startTime": "14:00", "label": "Biology", "kind": "class", "durationMinutes": 60, "location": "Lab 3" }
        ]
    })
}

fn default_files() -> HashMap<&'static str, serde_json::Value> {
    HashMap::from([
        (
            APP_JSON,
            serde_json::json!({
                "schema": 1,
                "appName": "Classroom Timer",
                "timezone": DEFAULT_TIMEZONE,
                "timerPresets": DEFAULT_TIMER_PRESETS,
                "defaultTimerMinutes": DEFAULT_TIMER_MINUTES
            }),
        ),
        (SCHEDULE_JSON, default_schedule()),
    ])
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    for (name, value) in default_files() {
        let path = config_dir.join(name);
        if !path.exists() {
            let formatted = serde_json::to_string_pretty(&value)?;
            fs::write(path, format!("{formatted}\n"))?;
        }
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != 1 {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn load_configs(config_dir: &Path) -> Result<ConfigBundle, InfraError> {
    Ok(ConfigBundle {
        app: read_config(&config_dir.join(APP_JSON))?,
        schedule: read_config(&config_dir.join(SCHEDULE_JSON))?,
    })
}

fn timezone_from(app: &serde_json::Value) -> Result<Tz, InfraError> {
    let name = app
        .get("timezone")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_TIMEZONE);
    name.parse::<Tz>()
        .map_err(|_| InfraError::InvalidConfig(format!("unknown timezone: {name}")))
}

pub fn load_app_settings(config_dir: &Path) -> Result<AppSettings, InfraError> {
    let app = read_config(&config_dir.join(APP_JSON))?;

    let app_name = app
        .get("appName")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("Classroom Timer")
        .to_string();

    let timer_presets = match app.get("timerPresets") {
        None | Some(serde_json::Value::Null) => DEFAULT_TIMER_PRESETS.to_vec(),
        Some(raw) => {
            let presets: Vec<u32> = serde_json::from_value(raw.clone()).map_err(|error| {
                InfraError::InvalidConfig(format!("timerPresets must be a list of minutes: {error}"))
            })?;
            if presets.is_empty() {
                return Err(InfraError::InvalidConfig(
                    "timerPresets must not be empty".to_string(),
                ));
            }
            for minutes in &presets {
                validate_timer_minutes(*minutes).map_err(|error| {
                    InfraError::InvalidConfig(format!("timerPresets: {error}"))
                })?;
            }
            presets
        }
    };

    let default_timer_minutes = match app
        .get("defaultTimerMinutes")
        .and_then(serde_json::Value::as_u64)
    {
        Some(value) => u32::try_from(value).map_err(|_| {
            InfraError::InvalidConfig(format!("defaultTimerMinutes out of range: {value}"))
        })?,
        None => DEFAULT_TIMER_MINUTES,
    };
    validate_timer_minutes(default_timer_minutes)
        .map_err(|error| InfraError::InvalidConfig(format!("defaultTimerMinutes: {error}")))?;

    Ok(AppSettings {
        app_name,
        timezone: timezone_from(&app)?,
        timer_presets,
        default_timer_minutes,
    })
}

pub fn load_timetable(config_dir: &Path) -> Result<Vec<ScheduleEntry>, InfraError> {
    let path = config_dir.join(SCHEDULE_JSON);
    let schedule = read_config(&path)?;
    let rows = schedule
        .get("entries")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| {
            InfraError::InvalidSchedule(format!("missing entries list in {}", path.display()))
        })?;

    let mut entries = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let record: ScheduleEntryRecord = serde_json::from_value(row.clone()).map_err(|error| {
            InfraError::InvalidSchedule(format!("entries[{index}] is malformed: {error}"))
        })?;
        entries.push(record.into_entry(index)?);
    }

    validate_timetable(&entries).map_err(InfraError::InvalidSchedule)?;
    Ok(entries)
}

fn parse_entry_kind(value: &str) -> Option<EntryKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "class" => Some(EntryKind::Class),
        "break" => Some(EntryKind::Break),
        "lunch" => Some(EntryKind::Lunch),
        _ => None,
    }
}
