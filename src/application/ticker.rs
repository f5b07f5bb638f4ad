use crate::application::commands::{board_snapshot_impl, tick_timer_impl, AppState};
use crate::application::display::{render_text, BoardSnapshot};
use crate::infrastructure::clock::NowProvider;
use crate::infrastructure::error::InfraError;
use std::io::Write;
use tokio::sync::watch;
use tokio::time::{interval, Duration as TokioDuration, MissedTickBehavior};

const TICK_PERIOD_MS: u64 = 1_000;

pub trait BoardSink: Send + Sync {
    fn render(&self, snapshot: &BoardSnapshot) -> Result<(), InfraError>;
}

#[derive(Debug, Default)]
pub struct StdoutBoardSink;

impl BoardSink for StdoutBoardSink {
    fn render(&self, snapshot: &BoardSnapshot) -> Result<(), InfraError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", render_text(snapshot))?;
        stdout.flush()?;
        Ok(())
    }
}

/// Drives the board once per second until `shutdown` flips to `true` or its
/// sender is dropped. Each tick samples the clock once, advances the
/// countdown and renders one snapshot. Returns the number of ticks rendered.
pub async fn run_ticker<S>(
    state: &AppState,
    now_provider: NowProvider,
    sink: &S,
    mut shutdown: watch::Receiver<bool>,
) -> Result<u64, InfraError>
where
    S: BoardSink + ?Sized,
{
    let mut ticker = interval(TokioDuration::from_millis(TICK_PERIOD_MS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut rendered = 0u64;

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {
                let now = (now_provider)();
                tick_timer_impl(state)?;
                let snapshot = board_snapshot_impl(state, now)?;
                sink.render(&snapshot)?;
                rendered += 1;
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    state.log_info("ticker", &format!("stopped after {rendered} ticks"));
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::start_timer_impl;
    use crate::application::commands::tests::{at, TempWorkspace};
    use crate::infrastructure::clock::fixed_now_provider;
    use std::sync::Mutex;
    use tokio::time::sleep;

    #[derive(Default)]
    struct RecordingSink {
        snapshots: Mutex<Vec<BoardSnapshot>>,
    }

    impl BoardSink for RecordingSink {
        fn render(&self, snapshot: &BoardSnapshot) -> Result<(), InfraError> {
            self.snapshots
                .lock()
                .map_err(|error| InfraError::InvalidState(format!("sink lock poisoned: {error}")))?
                .push(snapshot.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl BoardSink for FailingSink {
        fn render(&self, _snapshot: &BoardSnapshot) -> Result<(), InfraError> {
            Err(InfraError::Io(std::io::Error::other("display unavailable")))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_renders_once_per_second_until_shutdown() {
        let workspace = TempWorkspace::new();
        let state = workspace.app_state();
        start_timer_impl(&state).expect("start timer");
        let sink = RecordingSink::default();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let (rendered, _) = tokio::join!(
            run_ticker(&state, fixed_now_provider(at(9, 30)), &sink, shutdown_rx),
            async {
                sleep(TokioDuration::from_millis(3_500)).await;
                let _ = shutdown_tx.send(true);
            }
        );

        let rendered = rendered.expect("ticker result");
        assert_eq!(rendered, 4);

        let snapshots = sink.snapshots.lock().expect("snapshots");
        assert_eq!(snapshots.len(), 4);
        assert!(snapshots
            .iter()
            .all(|snapshot| snapshot.headline == "Mathematics - 30 min left"));
        assert_eq!(snapshots[3].timer.remaining_seconds, 25 * 60 - 4);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_stops_when_shutdown_sender_is_dropped() {
        let workspace = TempWorkspace::new();
        let state = workspace.app_state();
        let sink = RecordingSink::default();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        drop(shutdown_tx);

        let rendered = run_ticker(&state, fixed_now_provider(at(8, 0)), &sink, shutdown_rx)
            .await
            .expect("ticker result");
        assert!(rendered <= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_does_not_start_after_shutdown() {
        let workspace = TempWorkspace::new();
        let state = workspace.app_state();
        let sink = RecordingSink::default();
        let (_shutdown_tx, shutdown_rx) = watch::channel(true);

        let rendered = run_ticker(&state, fixed_now_provider(at(8, 0)), &sink, shutdown_rx)
            .await
            .expect("ticker result");
        assert_eq!(rendered, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sink_failure_stops_the_ticker() {
        let workspace = TempWorkspace::new();
        let state = workspace.app_state();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let result = run_ticker(&state, fixed_now_provider(at(8, 0)), &FailingSink, shutdown_rx).await;
        assert!(matches!(result, Err(InfraError::Io(_))));
    }
}
