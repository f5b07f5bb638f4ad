use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMER_MINUTES: u32 = 25;
pub const DEFAULT_TIMER_PRESETS: [u32; 3] = [15, 25, 45];
/// Longest countdown the board accepts: one full day.
pub const MAX_TIMER_MINUTES: u32 = 24 * 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

impl TimerPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Inactive,
    Running,
    Completed,
}

/// Classroom countdown shown beside the timetable. Advanced one second per
/// tick by the caller; it never reads the clock itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownTimer {
    phase: TimerPhase,
    preset_minutes: u32,
    remaining_seconds: u32,
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new(DEFAULT_TIMER_MINUTES)
    }
}

impl CountdownTimer {
    pub fn new(preset_minutes: u32) -> Self {
        Self {
            phase: TimerPhase::Idle,
            preset_minutes: preset_minutes.clamp(1, MAX_TIMER_MINUTES),
            remaining_seconds: 0,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn preset_minutes(&self) -> u32 {
        self.preset_minutes
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    fn preset_seconds(&self) -> u32 {
        self.preset_minutes.saturating_mul(60)
    }

    pub fn start(&mut self) -> Result<(), String> {
        if self.phase == TimerPhase::Running {
            return Err("timer is already running".to_string());
        }
        if self.remaining_seconds == 0 {
            self.remaining_seconds = self.preset_seconds();
        }
        self.phase = TimerPhase::Running;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), String> {
        if self.phase != TimerPhase::Running {
            return Err("timer is not running".to_string());
        }
        self.phase = TimerPhase::Paused;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.phase = TimerPhase::Idle;
        self.remaining_seconds = self.preset_seconds();
    }

    /// A running timer keeps its remaining time; the new preset applies
    /// from the next reset or completion.
    pub fn select_preset(&mut self, minutes: u32) -> Result<(), String> {
        validate_timer_minutes(minutes)?;
        self.preset_minutes = minutes;
        if self.phase != TimerPhase::Running {
            self.remaining_seconds = self.preset_seconds();
        }
        Ok(())
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != TimerPhase::Running {
            return TickOutcome::Inactive;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.phase = TimerPhase::Idle;
            return TickOutcome::Completed;
        }
        TickOutcome::Running
    }

    pub fn progress_percent(&self) -> f64 {
        let total = self.preset_seconds();
        if total == 0 {
            return 0.0;
        }
        let elapsed = total.saturating_sub(self.remaining_seconds);
        f64::from(elapsed) / f64::from(total) * 100.0
    }
}

pub fn validate_timer_minutes(minutes: u32) -> Result<(), String> {
    if minutes == 0 {
        return Err("timer preset must be > 0 minutes".to_string());
    }
    if minutes > MAX_TIMER_MINUTES {
        return Err(format!(
            "timer preset must be at most {MAX_TIMER_MINUTES} minutes, got {minutes}"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_timer_is_idle_and_empty() {
        let timer = CountdownTimer::default();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.preset_minutes(), DEFAULT_TIMER_MINUTES);
        assert_eq!(timer.remaining_seconds(), 0);
    }

    #[test]
    fn start_loads_preset_when_empty() {
        let mut timer = CountdownTimer::new(15);
        timer.start().expect("start");
        assert_eq!(timer.phase(), TimerPhase::Running);
        assert_eq!(timer.remaining_seconds(), 15 * 60);
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut timer = CountdownTimer::default();
        timer.start().expect("start");
        assert!(timer.start().is_err());
    }

    #[test]
    fn pause_and_resume_keep_remaining_time() {
        let mut timer = CountdownTimer::new(15);
        timer.start().expect("start");
        timer.tick();
        timer.tick();
        timer.pause().expect("pause");
        assert_eq!(timer.phase(), TimerPhase::Paused);
        assert_eq!(timer.tick(), TickOutcome::Inactive);

        timer.start().expect("resume");
        assert_eq!(timer.remaining_seconds(), 15 * 60 - 2);
    }

    #[test]
    fn pause_requires_running_timer() {
        let mut timer = CountdownTimer::default();
        assert!(timer.pause().is_err());
    }

    #[test]
    fn preset_change_while_paused_reloads_time() {
        let mut timer = CountdownTimer::new(25);
        timer.start().expect("start");
        timer.tick();
        timer.pause().expect("pause");
        timer.select_preset(45).expect("preset");
        assert_eq!(timer.remaining_seconds(), 45 * 60);
        assert_eq!(timer.phase(), TimerPhase::Paused);
    }

    #[test]
    fn preset_change_while_running_keeps_time() {
        let mut timer = CountdownTimer::new(25);
        timer.start().expect("start");
        timer.tick();
        timer.select_preset(15).expect("preset");
        assert_eq!(timer.remaining_seconds(), 25 * 60 - 1);

        timer.reset();
        assert_eq!(timer.remaining_seconds(), 15 * 60);
        assert_eq!(timer.phase(), TimerPhase::Idle);
    }

    #[test]
    fn zero_preset_is_rejected() {
        let mut timer = CountdownTimer::default();
        assert!(timer.select_preset(0).is_err());
        assert_eq!(timer.preset_minutes(), DEFAULT_TIMER_MINUTES);
    }

    #[test]
    fn oversized_preset_is_rejected() {
        let mut timer = CountdownTimer::new(15);
        assert!(timer.select_preset(100_000_000).is_err());
        assert!(timer.select_preset(MAX_TIMER_MINUTES + 1).is_err());
        assert_eq!(timer.preset_minutes(), 15);

        timer.select_preset(MAX_TIMER_MINUTES).expect("full day preset");
        assert_eq!(timer.remaining_seconds(), MAX_TIMER_MINUTES * 60);
    }

    #[test]
    fn new_timer_clamps_out_of_range_presets() {
        let mut timer = CountdownTimer::new(u32::MAX);
        assert_eq!(timer.preset_minutes(), MAX_TIMER_MINUTES);
        timer.start().expect("start");
        assert_eq!(timer.remaining_seconds(), MAX_TIMER_MINUTES * 60);
        assert_eq!(CountdownTimer::new(0).preset_minutes(), 1);
    }

    #[test]
    fn completion_is_reported_once() {
        let mut timer = CountdownTimer::new(1);
        timer.start().expect("start");
        for _ in 0..59 {
            assert_eq!(timer.tick(), TickOutcome::Running);
        }
        assert_eq!(timer.tick(), TickOutcome::Completed);
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.tick(), TickOutcome::Inactive);

        // An exhausted timer starts over from the preset.
        timer.start().expect("restart");
        assert_eq!(timer.remaining_seconds(), 60);
    }

    #[test]
    fn progress_tracks_elapsed_share() {
        let mut timer = CountdownTimer::new(1);
        assert_eq!(timer.progress_percent(), 100.0);
        timer.start().expect("start");
        assert_eq!(timer.progress_percent(), 0.0);
        for _ in 0..30 {
            timer.tick();
        }
        assert!((timer.progress_percent() - 50.0).abs() < f64::EPSILON);
    }
}
