use crate::application::bootstrap::bootstrap_workspace;
use crate::application::display::{build_snapshot, format_clock, BoardSnapshot};
use crate::domain::countdown::{CountdownTimer, TickOutcome};
use crate::domain::models::{CurrentResult, NextResult, ScheduleEntry};
use crate::domain::schedule::{resolve_current, resolve_next};
use crate::infrastructure::clock::{system_now_provider, NowProvider};
use crate::infrastructure::config::{load_app_settings, load_timetable, AppSettings};
use crate::infrastructure::error::InfraError;
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub struct AppState {
    config_dir: PathBuf,
    logs_dir: PathBuf,
    settings: AppSettings,
    timetable: Vec<ScheduleEntry>,
    runtime: Mutex<RuntimeState>,
    log_guard: Mutex<()>,
}

impl AppState {
    pub fn new(workspace_root: PathBuf) -> Result<Self, InfraError> {
        let bootstrap = bootstrap_workspace(&workspace_root)?;
        let settings = load_app_settings(&bootstrap.config_dir)?;
        let timetable = load_timetable(&bootstrap.config_dir)?;
        let runtime = RuntimeState {
            timer: CountdownTimer::new(settings.default_timer_minutes),
            completed_countdowns: 0,
        };

        let state = Self {
            config_dir: bootstrap.config_dir,
            logs_dir: bootstrap.logs_dir,
            settings,
            timetable,
            runtime: Mutex::new(runtime),
            log_guard: Mutex::new(()),
        };
        state.log_info(
            "bootstrap",
            &format!(
                "loaded {} schedule entries for timezone={}",
                state.timetable.len(),
                state.settings.timezone.name()
            ),
        );
        Ok(state)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn timetable(&self) -> &[ScheduleEntry] {
        &self.timetable
    }

    pub fn now_provider(&self) -> NowProvider {
        system_now_provider(self.settings.timezone)
    }

    pub fn command_error(&self, command: &str, error: &InfraError) -> String {
        self.log_error(command, &error.to_string());
        error.to_string()
    }

    pub fn log_info(&self, command: &str, message: &str) {
        self.append_log("info", command, message);
    }

    pub fn log_error(&self, command: &str, message: &str) {
        self.append_log("error", command, message);
    }

    fn append_log(&self, level: &str, command: &str, message: &str) {
        let Ok(_guard) = self.log_guard.lock() else {
            return;
        };
        let path = self.logs_dir.join("commands.log");
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "command": command,
            "message": message,
        });

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{}", payload);
        }
    }
}

#[derive(Debug)]
struct RuntimeState {
    timer: CountdownTimer,
    completed_countdowns: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimerStateResponse {
    pub phase: String,
    pub preset_minutes: u32,
    pub remaining_seconds: u32,
    pub display: String,
    pub progress_percent: f64,
    pub presets: Vec<u32>,
    pub completed_countdowns: u32,
}

pub fn list_schedule_impl(state: &AppState) -> Result<Vec<ScheduleEntry>, InfraError> {
    Ok(state.timetable.clone())
}

pub fn current_entry_impl(
    state: &AppState,
    now: NaiveDateTime,
) -> Result<Option<CurrentResult>, InfraError> {
    Ok(resolve_current(&state.timetable, now))
}

pub fn next_entry_impl(
    state: &AppState,
    now: NaiveDateTime,
) -> Result<Option<NextResult>, InfraError> {
    Ok(resolve_next(&state.timetable, now))
}

pub fn board_snapshot_impl(
    state: &AppState,
    now: NaiveDateTime,
) -> Result<BoardSnapshot, InfraError> {
    let runtime = lock_runtime(state)?;
    Ok(build_snapshot(&state.timetable, now, &runtime.timer))
}

pub fn start_timer_impl(state: &AppState) -> Result<TimerStateResponse, InfraError> {
    let mut runtime = lock_runtime(state)?;
    runtime.timer.start().map_err(InfraError::InvalidState)?;

    state.log_info(
        "start_timer",
        &format!(
            "started countdown remaining_seconds={}",
            runtime.timer.remaining_seconds()
        ),
    );
    Ok(to_timer_state_response(state, &runtime))
}

pub fn pause_timer_impl(state: &AppState) -> Result<TimerStateResponse, InfraError> {
    let mut runtime = lock_runtime(state)?;
    runtime.timer.pause().map_err(InfraError::InvalidState)?;

    state.log_info("pause_timer", "paused countdown");
    Ok(to_timer_state_response(state, &runtime))
}

pub fn reset_timer_impl(state: &AppState) -> Result<TimerStateResponse, InfraError> {
    let mut runtime = lock_runtime(state)?;
    runtime.timer.reset();

    state.log_info("reset_timer", "reset countdown");
    Ok(to_timer_state_response(state, &runtime))
}

pub fn select_timer_preset_impl(
    state: &AppState,
    minutes: u32,
) -> Result<TimerStateResponse, InfraError> {
    let mut runtime = lock_runtime(state)?;
    runtime
        .timer
        .select_preset(minutes)
        .map_err(InfraError::InvalidCommand)?;

    state.log_info("select_timer_preset", &format!("preset_minutes={minutes}"));
    Ok(to_timer_state_response(state, &runtime))
}

/// Advances the countdown by one second. Called once per tick.
pub fn tick_timer_impl(state: &AppState) -> Result<TimerStateResponse, InfraError> {
    let mut runtime = lock_runtime(state)?;
    if runtime.timer.tick() == TickOutcome::Completed {
        runtime.completed_countdowns += 1;
        state.log_info(
            "tick_timer",
            &format!(
                "countdown completed preset_minutes={}",
                runtime.timer.preset_minutes()
            ),
        );
    }
    Ok(to_timer_state_response(state, &runtime))
}

pub fn get_timer_state_impl(state: &AppState) -> Result<TimerStateResponse, InfraError> {
    let runtime = lock_runtime(state)?;
    Ok(to_timer_state_response(state, &runtime))
}

/// Applies one line of operator input, e.g. `start`, `pause`, `reset` or
/// `preset 15`. Blank lines are ignored.
pub fn handle_control_impl(
    state: &AppState,
    line: &str,
) -> Result<Option<TimerStateResponse>, InfraError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };

    let response = match command.to_ascii_lowercase().as_str() {
        "start" | "resume" => start_timer_impl(state)?,
        "pause" => pause_timer_impl(state)?,
        "reset" => reset_timer_impl(state)?,
        "status" => get_timer_state_impl(state)?,
        "preset" => {
            let minutes = words
                .next()
                .and_then(|value| value.parse::<u32>().ok())
                .ok_or_else(|| {
                    InfraError::InvalidCommand("preset requires a number of minutes".to_string())
                })?;
            select_timer_preset_impl(state, minutes)?
        }
        other => {
            return Err(InfraError::InvalidCommand(format!(
                "unsupported control: {other}"
            )));
        }
    };
    Ok(Some(response))
}

fn lock_runtime(state: &AppState) -> Result<MutexGuard<'_, RuntimeState>, InfraError> {
    state
        .runtime
        .lock()
        .map_err(|error| InfraError::InvalidState(format!("runtime lock poisoned: {error}")))
}

fn to_timer_state_response(state: &AppState, runtime: &RuntimeState) -> TimerStateResponse {
    TimerStateResponse {
        phase: runtime.timer.phase().as_str().to_string(),
        preset_minutes: runtime.timer.preset_minutes(),
        remaining_seconds: runtime.timer.remaining_seconds(),
        display: format_clock(runtime.timer.remaining_seconds()),
        progress_percent: runtime.timer.progress_percent(),
        presets: state.settings.timer_presets.clone(),
        completed_countdowns: runtime.completed_countdowns,
    }
}
