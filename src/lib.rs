pub mod application;
pub mod domain;
pub mod infrastructure;

use application::commands::{current_entry_impl, handle_control_impl, AppState};
use application::display::render_timetable;
use application::ticker::{run_ticker, StdoutBoardSink};
use chrono::NaiveDateTime;
use infrastructure::clock::{fixed_now_provider, NowProvider};
use infrastructure::error::InfraError;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

pub use domain::models::{CurrentResult, EntryKind, NextResult, ScheduleEntry};
pub use domain::schedule::{resolve_current, resolve_next};

#[derive(Debug, Clone, PartialEq, Eq)]
struct LaunchOptions {
    workspace_root: PathBuf,
    fixed_now: Option<NaiveDateTime>,
}

fn load_launch_options_from_env() -> Result<LaunchOptions, InfraError> {
    load_launch_options_from_lookup(|key| std::env::var(key).ok())
}

fn load_launch_options_from_lookup<F>(lookup: F) -> Result<LaunchOptions, InfraError>
where
    F: Fn(&str) -> Option<String>,
{
    let workspace_root = match optional_lookup_value(&lookup, &["CLASSBOARD_WORKSPACE"]) {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir()?,
    };
    let fixed_now = optional_lookup_value(&lookup, &["CLASSBOARD_NOW"])
        .map(|raw| parse_fixed_now(&raw))
        .transpose()?;

    Ok(LaunchOptions {
        workspace_root,
        fixed_now,
    })
}

fn optional_lookup_value<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    for key in keys {
        if let Some(value) = lookup(key) {
            let normalized = value.trim();
            if !normalized.is_empty() {
                return Some(normalized.to_string());
            }
        }
    }
    None
}

fn parse_fixed_now(value: &str) -> Result<NaiveDateTime, InfraError> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| {
            InfraError::InvalidConfig(format!(
                "CLASSBOARD_NOW must be YYYY-MM-DDTHH:MM[:SS], got {value}"
            ))
        })
}

async fn read_controls(state: Arc<AppState>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match handle_control_impl(&state, &line) {
            Ok(Some(timer)) => println!("timer {} [{}]", timer.display, timer.phase),
            Ok(None) => {}
            Err(error) => eprintln!("{}", state.command_error("control", &error)),
        }
    }
}

/// Runs the classroom board against the configured workspace until Ctrl-C.
pub async fn run() -> Result<(), InfraError> {
    let options = load_launch_options_from_env()?;
    let state = Arc::new(AppState::new(options.workspace_root)?);
    let now_provider: NowProvider = match options.fixed_now {
        Some(instant) => fixed_now_provider(instant),
        None => state.now_provider(),
    };

    let now = (now_provider)();
    let current = current_entry_impl(&state, now)?;
    println!("{}", state.settings().app_name);
    print!("{}", render_timetable(state.timetable(), current.as_ref()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });
    tokio::spawn(read_controls(Arc::clone(&state)));

    run_ticker(&state, now_provider, &StdoutBoardSink, shutdown_rx)
        .await
        .map(|_| ())
        .map_err(|error| {
            state.log_error("ticker", &error.to_string());
            error
        })
}
