//! Session timer implementation.
//!
//! The timer is a wall-clock-based state machine. [`SessionState`] is a plain
//! value: every transition consumes the current state together with the
//! current time and returns the next state, so the transition table can be
//! exercised without a clock. [`SessionTimer`] owns a state, a [`Clock`] and
//! the rounding precision, and turns transitions into [`SessionEvent`]s.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> Idle
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::events::SessionEvent;
use crate::ledger::update::{check_places, round_to};

const MS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Running {
        started_at_ms: u64,
        /// Total time spent in closed pauses.
        paused_ms: u64,
    },
    Paused {
        started_at_ms: u64,
        paused_ms: u64,
        paused_at_ms: u64,
    },
}

/// Result of [`SessionState::toggle_work`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkToggle {
    Started,
    /// Worked time in unrounded hours.
    Stopped { hours: f64 },
}

/// Result of [`SessionState::toggle_pause`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PauseToggle {
    /// Worked time up to the pause, in unrounded hours.
    Paused { hours: f64 },
    Resumed,
}

impl SessionState {
    pub fn status(&self) -> TimerStatus {
        match self {
            SessionState::Idle => TimerStatus::Idle,
            SessionState::Running { .. } => TimerStatus::Running,
            SessionState::Paused { .. } => TimerStatus::Paused,
        }
    }

    /// Idle starts a session; Running or Paused stops it, closing any open
    /// pause first.
    pub fn toggle_work(self, now_ms: u64) -> (SessionState, WorkToggle) {
        match self {
            SessionState::Idle => (
                SessionState::Running {
                    started_at_ms: now_ms,
                    paused_ms: 0,
                },
                WorkToggle::Started,
            ),
            running_or_paused => {
                let hours = running_or_paused.close_pause(now_ms).worked_hours(now_ms);
                (SessionState::Idle, WorkToggle::Stopped { hours })
            }
        }
    }

    /// Running pauses, Paused resumes. Idle has nothing to pause.
    pub fn toggle_pause(self, now_ms: u64) -> Result<(SessionState, PauseToggle)> {
        match self {
            SessionState::Idle => Err(CoreError::NotStarted),
            SessionState::Running {
                started_at_ms,
                paused_ms,
            } => Ok((
                SessionState::Paused {
                    started_at_ms,
                    paused_ms,
                    paused_at_ms: now_ms,
                },
                PauseToggle::Paused {
                    hours: self.worked_hours(now_ms),
                },
            )),
            paused @ SessionState::Paused { .. } => {
                Ok((paused.close_pause(now_ms), PauseToggle::Resumed))
            }
        }
    }

    /// Live worked hours; only available while running.
    pub fn current_elapsed(&self, now_ms: u64) -> Option<f64> {
        match self {
            SessionState::Running { .. } => Some(self.worked_hours(now_ms)),
            _ => None,
        }
    }

    fn close_pause(self, now_ms: u64) -> SessionState {
        match self {
            SessionState::Paused {
                started_at_ms,
                paused_ms,
                paused_at_ms,
            } => SessionState::Running {
                started_at_ms,
                paused_ms: paused_ms + now_ms.saturating_sub(paused_at_ms),
            },
            other => other,
        }
    }

    fn worked_hours(&self, now_ms: u64) -> f64 {
        match *self {
            SessionState::Idle => 0.0,
            SessionState::Running {
                started_at_ms,
                paused_ms,
            } => worked_ms(started_at_ms, paused_ms, now_ms) as f64 / MS_PER_HOUR,
            SessionState::Paused {
                started_at_ms,
                paused_ms,
                paused_at_ms,
            } => worked_ms(started_at_ms, paused_ms, paused_at_ms) as f64 / MS_PER_HOUR,
        }
    }
}

fn worked_ms(started_at_ms: u64, paused_ms: u64, until_ms: u64) -> u64 {
    until_ms.saturating_sub(started_at_ms).saturating_sub(paused_ms)
}

/// Source of wall-clock time.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Convert minutes to hours at the given precision.
pub fn minutes_to_hours(minutes: f64, round_places: u32) -> f64 {
    round_to(minutes / 60.0, round_places)
}

/// Live session timer.
///
/// Lives for one process; nothing about an in-progress session is persisted.
#[derive(Debug, Clone)]
pub struct SessionTimer<C: Clock = SystemClock> {
    state: SessionState,
    round_places: u32,
    clock: C,
}

impl SessionTimer<SystemClock> {
    pub fn new(round_places: u32) -> Self {
        Self::with_clock(SystemClock, round_places)
    }
}

impl<C: Clock> SessionTimer<C> {
    pub fn with_clock(clock: C, round_places: u32) -> Self {
        Self {
            state: SessionState::Idle,
            round_places,
            clock,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn status(&self) -> TimerStatus {
        self.state.status()
    }

    pub fn round_places(&self) -> u32 {
        self.round_places
    }

    /// Rounded live hours, `None` unless running.
    pub fn current_elapsed(&self) -> Option<f64> {
        self.state
            .current_elapsed(self.clock.now_ms())
            .map(|h| round_to(h, self.round_places))
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn toggle_work(&mut self) -> SessionEvent {
        let (next, outcome) = self.state.toggle_work(self.clock.now_ms());
        self.state = next;
        match outcome {
            WorkToggle::Started => SessionEvent::Started { at: Utc::now() },
            WorkToggle::Stopped { hours } => SessionEvent::Stopped {
                hours: round_to(hours, self.round_places),
                at: Utc::now(),
            },
        }
    }

    pub fn toggle_pause(&mut self) -> Result<SessionEvent> {
        let (next, outcome) = self.state.toggle_pause(self.clock.now_ms())?;
        self.state = next;
        Ok(match outcome {
            PauseToggle::Paused { hours } => SessionEvent::Paused {
                hours: round_to(hours, self.round_places),
                at: Utc::now(),
            },
            PauseToggle::Resumed => SessionEvent::Resumed { at: Utc::now() },
        })
    }

    pub fn set_round_places(&mut self, places: u32) -> Result<()> {
        check_places("round_places", places)?;
        self.round_places = places;
        Ok(())
    }

    pub fn minutes_to_hours(&self, minutes: f64) -> f64 {
        minutes_to_hours(minutes, self.round_places)
    }
}
