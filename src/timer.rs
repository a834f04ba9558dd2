//! Per-step countdown timers.

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

use crate::model::Step;

static HOURS_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:hour|hr|h|小时)").ok());
static MINUTES_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:minute|min|m|分钟)").ok());
static SECONDS_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:second|sec|s|秒)").ok());

fn first_number(re: &LazyLock<Option<Regex>>, text: &str) -> f64 {
    re.as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Reads a free-text duration like `"5分钟"`, `"1h 30min"` or `"90秒"`.
///
/// Hour, minute and second components are summed and rounded up to whole
/// seconds. Text with no recognizable component gives 0.
pub fn parse_duration_to_seconds(text: &str) -> u64 {
    let total = first_number(&HOURS_RE, text) * 3600.0
        + first_number(&MINUTES_RE, text) * 60.0
        + first_number(&SECONDS_RE, text);
    total.ceil() as u64
}

/// `MM:SS`, with minutes growing past two digits when needed.
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTimer {
    total: u64,
    remaining: u64,
    state: TimerState,
}

impl StepTimer {
    pub fn new(total_seconds: u64) -> Self {
        Self {
            total: total_seconds,
            remaining: total_seconds,
            state: TimerState::Idle,
        }
    }

    /// A timer for `step`, if its duration text names a positive time.
    pub fn for_step(step: &Step) -> Option<Self> {
        let seconds = parse_duration_to_seconds(step.duration.as_deref()?);
        (seconds > 0).then(|| Self::new(seconds))
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn display(&self) -> String {
        format_time(self.remaining)
    }

    /// Starts or resumes. Returns whether the timer is now running.
    pub fn start(&mut self) -> bool {
        match self.state {
            TimerState::Idle | TimerState::Paused if self.remaining > 0 => {
                self.state = TimerState::Running;
                true
            }
            TimerState::Running => true,
            _ => false,
        }
    }

    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
        }
    }

    pub fn reset(&mut self) {
        self.remaining = self.total;
        self.state = TimerState::Idle;
    }

    /// One second elapsed. Only a running timer counts down.
    pub fn tick(&mut self) -> TimerState {
        if self.state == TimerState::Running {
            if self.remaining <= 1 {
                self.remaining = 0;
                self.state = TimerState::Finished;
            } else {
                self.remaining -= 1;
            }
        }
        self.state
    }
}

/// Runs `timer` down in real time, once per second, calling `on_tick` after
/// every decrement. Returns when the timer finishes or stops running.
pub async fn run_countdown<F>(timer: &mut StepTimer, mut on_tick: F) -> TimerState
where
    F: FnMut(&StepTimer),
{
    if !timer.start() {
        return timer.state();
    }
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // the first tick completes immediately
    interval.tick().await;
    while timer.state() == TimerState::Running {
        interval.tick().await;
        timer.tick();
        on_tick(timer);
    }
    debug!(state = ?timer.state(), "Countdown stopped");
    timer.state()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_durations() {
        assert_eq!(parse_duration_to_seconds("5分钟"), 300);
        assert_eq!(parse_duration_to_seconds("30秒"), 30);
        assert_eq!(parse_duration_to_seconds("1小时"), 3600);
        assert_eq!(parse_duration_to_seconds("1 hour 30 min"), 5400);
        assert_eq!(parse_duration_to_seconds("2 MIN"), 120);
        assert_eq!(parse_duration_to_seconds("1.5分钟"), 90);
        assert_eq!(parse_duration_to_seconds("0.25 sec"), 1);
        assert_eq!(parse_duration_to_seconds("片刻"), 0);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(3600), "60:00");
    }

    #[test]
    fn test_run_pause_resume_finish() {
        let mut timer = StepTimer::new(3);
        assert_eq!(timer.tick(), TimerState::Idle);
        assert!(timer.start());
        assert_eq!(timer.tick(), TimerState::Running);
        assert_eq!(timer.remaining(), 2);

        timer.pause();
        assert_eq!(timer.tick(), TimerState::Paused);
        assert_eq!(timer.remaining(), 2);

        assert!(timer.start());
        timer.tick();
        assert_eq!(timer.tick(), TimerState::Finished);
        assert_eq!(timer.remaining(), 0);
        assert!(!timer.start());
    }

    #[test]
    fn test_reset_restores_full_time() {
        let mut timer = StepTimer::new(10);
        timer.start();
        timer.tick();
        timer.reset();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.display(), "00:10");
    }

    #[test]
    fn test_zero_length_timer_never_runs() {
        let mut timer = StepTimer::new(0);
        assert!(!timer.start());
        assert_eq!(timer.tick(), TimerState::Idle);
    }

    #[test]
    fn test_for_step_requires_positive_duration() {
        let mut step = Step { title: "焖".into(), instruction: "小火".into(), ..Default::default() };
        assert!(StepTimer::for_step(&step).is_none());
        step.duration = Some("适量".into());
        assert!(StepTimer::for_step(&step).is_none());
        step.duration = Some("2分钟".into());
        assert_eq!(StepTimer::for_step(&step).map(|t| t.total()), Some(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_countdown_reports_every_second() {
        let mut timer = StepTimer::new(3);
        let mut seen = Vec::new();
        let state = run_countdown(&mut timer, |t| seen.push(t.display())).await;
        assert_eq!(state, TimerState::Finished);
        assert_eq!(seen, vec!["00:02", "00:01", "00:00"]);
    }
}
