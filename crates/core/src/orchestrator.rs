//! Drives one call attempt from dialing to the agent's next screen.
//!
//! Composes a [`CallSession`] with result capture. After `end_call` the timing
//! is frozen; `save_result` may be retried any number of times against the
//! same timing until the outcome is recorded.

use serde::Serialize;

use crate::call_result::{self, CallTarget, NextAction, ResultSelection};
use crate::call_session::{CallSession, CallTiming, Clock, SessionState, SystemClock};
use crate::collaborators::{CampaignContext, ContactQueue, OutcomeRecorder};
use crate::error::{CallFlowError, SessionError};
use crate::types::Timestamp;

/// Where the call screen is in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPhase {
    /// Contact loaded, call not started.
    Ready,
    /// Call running.
    Calling,
    /// Call ended, result not yet recorded.
    CapturingResult,
}

#[derive(Debug)]
pub struct SessionOrchestrator<C: Clock = SystemClock> {
    ctx: CampaignContext,
    target: CallTarget,
    session: CallSession<C>,
    captured: Option<CallTiming>,
}

impl SessionOrchestrator<SystemClock> {
    pub fn new(ctx: CampaignContext, target: CallTarget) -> Self {
        Self::with_clock(ctx, target, SystemClock)
    }
}

impl<C: Clock> SessionOrchestrator<C> {
    pub fn with_clock(ctx: CampaignContext, target: CallTarget, clock: C) -> Self {
        Self {
            ctx,
            target,
            session: CallSession::with_clock(target.contact_id, clock),
            captured: None,
        }
    }

    pub fn context(&self) -> CampaignContext {
        self.ctx
    }

    pub fn target(&self) -> CallTarget {
        self.target
    }

    pub fn phase(&self) -> FlowPhase {
        match (self.session.state(), self.captured) {
            (SessionState::InProgress, _) => FlowPhase::Calling,
            (SessionState::Idle, Some(_)) => FlowPhase::CapturingResult,
            (SessionState::Idle, None) => FlowPhase::Ready,
        }
    }

    /// Seconds on the running call, for the display tick.
    pub fn elapsed(&self) -> i64 {
        self.session.elapsed()
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.session.started_at()
    }

    /// Frozen timing of the ended call awaiting its result.
    pub fn captured_timing(&self) -> Option<CallTiming> {
        self.captured
    }

    /// Start the call. A result still waiting to be saved blocks a new call.
    pub fn begin_call(&mut self) -> Result<Timestamp, SessionError> {
        if self.captured.is_some() {
            return Err(SessionError::AlreadyInProgress);
        }
        self.session.start()
    }

    /// End the call and freeze its timing for result capture.
    pub fn end_call(&mut self) -> Result<CallTiming, SessionError> {
        let timing = self.session.finish()?;
        self.captured = Some(timing);
        Ok(timing)
    }

    /// Build, record and route a result for the ended call.
    ///
    /// State changes only after every collaborator call has returned, so a
    /// failed or cancelled save leaves the frozen timing in place for a retry.
    pub async fn save_result(
        &mut self,
        selection: ResultSelection,
        continue_to_next: bool,
        recorder: &dyn OutcomeRecorder,
        queue: &dyn ContactQueue,
    ) -> Result<NextAction, CallFlowError> {
        let timing = self.captured.ok_or(SessionError::NotInProgress)?;
        let outcome = call_result::build(selection, self.target, timing)?;
        let next =
            call_result::commit(&outcome, continue_to_next, self.ctx, recorder, queue).await?;

        self.captured = None;
        self.session.reset();
        Ok(next)
    }

    /// Abandon the attempt without recording anything.
    pub fn discard(&mut self) {
        self.captured = None;
        self.session.reset();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
