//! Pomodoro-style focus timer: focus sessions alternate with breaks, and
//! every fourth completed session earns a long break.

use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Focus => "Focus Time",
            Phase::ShortBreak | Phase::LongBreak => "Break Time",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, Phase::Focus)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerDurations {
    pub focus: Duration,
    pub short_break: Duration,
    pub long_break: Duration,
    pub long_break_every: u32,
}

impl Default for TimerDurations {
    fn default() -> Self {
        Self {
            focus: Duration::from_secs(25 * 60),
            short_break: Duration::from_secs(5 * 60),
            long_break: Duration::from_secs(15 * 60),
            long_break_every: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FocusTimer {
    durations: TimerDurations,
    phase: Phase,
    remaining: Duration,
    completed_sessions: u32,
    running: bool,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(TimerDurations::default())
    }
}

impl FocusTimer {
    pub fn new(durations: TimerDurations) -> Self {
        Self {
            durations,
            phase: Phase::Focus,
            remaining: durations.focus,
            completed_sessions: 0,
            running: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Back to a stopped, fresh focus session
    pub fn reset(&mut self) {
        *self = Self::new(self.durations);
    }

    /// Advance by `elapsed`. Returns the phase entered by the last
    /// transition, if any. A paused timer does not move.
    pub fn tick(&mut self, mut elapsed: Duration) -> Option<Phase> {
        if !self.running {
            return None;
        }

        let mut entered = None;
        while elapsed >= self.remaining {
            elapsed -= self.remaining;
            let next = self.next_phase();
            self.enter(next);
            entered = Some(next);
            if self.remaining.is_zero() {
                break;
            }
        }
        self.remaining -= elapsed.min(self.remaining);
        entered
    }

    fn next_phase(&mut self) -> Phase {
        match self.phase {
            Phase::Focus => {
                self.completed_sessions += 1;
                let every = self.durations.long_break_every.max(1);
                if self.completed_sessions % every == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Focus,
        }
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.remaining = match phase {
            Phase::Focus => self.durations.focus,
            Phase::ShortBreak => self.durations.short_break,
            Phase::LongBreak => self.durations.long_break,
        };
    }

    /// `MM:SS` of the time left
    pub fn display(&self) -> String {
        let secs = self.remaining.as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 60;

    #[test]
    fn test_paused_timer_does_not_move() {
        let mut timer = FocusTimer::default();
        assert_eq!(timer.tick(Duration::from_secs(10)), None);
        assert_eq!(timer.display(), "25:00");

        timer.start();
        timer.tick(Duration::from_secs(MIN));
        timer.pause();
        assert_eq!(timer.tick(Duration::from_secs(10 * MIN)), None);
        assert_eq!(timer.display(), "24:00");
    }

    #[test]
    fn test_focus_then_short_break() {
        let mut timer = FocusTimer::default();
        timer.start();
        assert_eq!(timer.tick(Duration::from_secs(24 * MIN)), None);
        assert_eq!(timer.display(), "01:00");
        assert_eq!(timer.tick(Duration::from_secs(MIN)), Some(Phase::ShortBreak));
        assert_eq!(timer.completed_sessions(), 1);
        assert_eq!(timer.remaining(), Duration::from_secs(5 * MIN));
    }

    #[test]
    fn test_every_fourth_session_gets_long_break() {
        let mut timer = FocusTimer::default();
        timer.start();
        let mut breaks = Vec::new();
        for _ in 0..4 {
            timer.tick(Duration::from_secs(25 * MIN));
            breaks.push(timer.phase());
            let length = timer.remaining();
            assert_eq!(timer.tick(length), Some(Phase::Focus));
        }
        assert_eq!(
            breaks,
            vec![Phase::ShortBreak, Phase::ShortBreak, Phase::ShortBreak, Phase::LongBreak]
        );
    }

    #[test]
    fn test_large_tick_carries_over() {
        let mut timer = FocusTimer::default();
        timer.start();
        assert_eq!(timer.tick(Duration::from_secs(31 * MIN)), Some(Phase::Focus));
        assert_eq!(timer.display(), "24:00");
    }

    #[test]
    fn test_reset() {
        let mut timer = FocusTimer::default();
        timer.start();
        timer.tick(Duration::from_secs(26 * MIN));
        timer.reset();
        assert_eq!(timer.phase(), Phase::Focus);
        assert_eq!(timer.completed_sessions(), 0);
        assert!(!timer.is_running());
    }
}
