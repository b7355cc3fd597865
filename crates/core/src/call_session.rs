//! Timing state machine for a single call attempt.
//!
//! `Idle -> InProgress -> Idle`. The start timestamp lives inside the
//! `InProgress` variant, so there is no way to observe a running call without
//! one, and [`CallSession::finish`] swaps the whole phase out in one step.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;

use crate::error::SessionError;
use crate::types::{DbId, Timestamp};

/// Interval between display refreshes while a call is running.
///
/// Only the UI polls at this cadence; recorded durations come from the
/// start/finish timestamps.
pub const DISPLAY_TICK_SECS: u64 = 1;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn set(&self, to: Timestamp) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    InProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    InProgress { started_at: Timestamp },
}

/// Start/end of a finished call and its whole-second duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CallTiming {
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
    pub duration_seconds: i64,
}

impl CallTiming {
    /// Build a timing from two instants. A clock that stepped backwards
    /// yields a zero duration rather than a negative one.
    pub fn between(started_at: Timestamp, ended_at: Timestamp) -> Self {
        Self {
            started_at,
            ended_at,
            duration_seconds: whole_seconds(started_at, ended_at),
        }
    }
}

/// Timer for one call attempt against one contact.
#[derive(Debug)]
pub struct CallSession<C: Clock = SystemClock> {
    contact_id: DbId,
    phase: Phase,
    clock: C,
}

impl CallSession<SystemClock> {
    pub fn new(contact_id: DbId) -> Self {
        Self::with_clock(contact_id, SystemClock)
    }
}

impl<C: Clock> CallSession<C> {
    pub fn with_clock(contact_id: DbId, clock: C) -> Self {
        Self {
            contact_id,
            phase: Phase::Idle,
            clock,
        }
    }

    pub fn contact_id(&self) -> DbId {
        self.contact_id
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::InProgress { .. } => SessionState::InProgress,
        }
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        match self.phase {
            Phase::Idle => None,
            Phase::InProgress { started_at } => Some(started_at),
        }
    }

    /// Start timing. Only valid from `Idle`.
    pub fn start(&mut self) -> Result<Timestamp, SessionError> {
        if let Phase::InProgress { .. } = self.phase {
            return Err(SessionError::AlreadyInProgress);
        }
        let started_at = self.clock.now();
        self.phase = Phase::InProgress { started_at };
        Ok(started_at)
    }

    /// Whole seconds since `start()`, read fresh from the clock; 0 when idle.
    pub fn elapsed(&self) -> i64 {
        match self.phase {
            Phase::Idle => 0,
            Phase::InProgress { started_at } => whole_seconds(started_at, self.clock.now()),
        }
    }

    /// Stop timing and return to `Idle`. Only valid from `InProgress`.
    pub fn finish(&mut self) -> Result<CallTiming, SessionError> {
        let Phase::InProgress { started_at } = self.phase else {
            return Err(SessionError::NotInProgress);
        };
        let ended_at = self.clock.now();
        self.phase = Phase::Idle;
        Ok(CallTiming::between(started_at, ended_at))
    }

    /// Drop any running call without producing a timing.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }
}

fn whole_seconds(from: Timestamp, to: Timestamp) -> i64 {
    (to - from).num_seconds().max(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
