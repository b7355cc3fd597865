//! Turning an agent's result form into a recorded call outcome.
//!
//! [`build`] applies the conditional-field rules (reschedule only for some
//! outcomes, sales opportunity only for others). [`commit`] records the
//! outcome and decides where the agent goes next.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::call_session::CallTiming;
use crate::collaborators::{CampaignContext, Contact, ContactQueue, OutcomeRecorder};
use crate::error::{CoreError, SubmitError, ValidationError};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Outcome kinds
// ---------------------------------------------------------------------------

/// Result of a finished call attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    #[serde(rename = "CONTACTADO")]
    Contacted,
    #[serde(rename = "NO_CONTESTA")]
    NoAnswer,
    #[serde(rename = "BUZON")]
    Voicemail,
    #[serde(rename = "NO_INTERESADO")]
    NotInterested,
    #[serde(rename = "INTERESADO")]
    Interested,
    #[serde(rename = "VENTA")]
    Sale,
}

/// Every outcome in the order the result form lists them.
pub const ALL_OUTCOMES: [OutcomeKind; 6] = [
    OutcomeKind::Contacted,
    OutcomeKind::NoAnswer,
    OutcomeKind::Voicemail,
    OutcomeKind::NotInterested,
    OutcomeKind::Interested,
    OutcomeKind::Sale,
];

impl OutcomeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contacted => "CONTACTADO",
            Self::NoAnswer => "NO_CONTESTA",
            Self::Voicemail => "BUZON",
            Self::NotInterested => "NO_INTERESADO",
            Self::Interested => "INTERESADO",
            Self::Sale => "VENTA",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        ALL_OUTCOMES
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid call outcome '{s}'. Must be one of: {}",
                    ALL_OUTCOMES.map(OutcomeKind::as_str).join(", ")
                ))
            })
    }

    /// Whether a follow-up call may be scheduled for this outcome.
    pub fn allows_reschedule(self) -> bool {
        matches!(self, Self::Contacted | Self::Interested | Self::Voicemail)
    }

    /// Whether a sales opportunity may be attached to this outcome.
    pub fn allows_opportunity(self) -> bool {
        matches!(self, Self::Sale | Self::Interested)
    }

    /// Whether the call counts as an effective contact in campaign metrics.
    pub fn is_effective(self) -> bool {
        matches!(self, Self::Contacted | Self::Interested)
    }
}

/// Kind of sales opportunity handed off to the CRM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpportunityType {
    #[default]
    #[serde(rename = "VENTA_NUEVA")]
    NewSale,
    #[serde(rename = "UPSELL")]
    Upsell,
    #[serde(rename = "RENOVACION")]
    Renewal,
}

impl OpportunityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewSale => "VENTA_NUEVA",
            Self::Upsell => "UPSELL",
            Self::Renewal => "RENOVACION",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "VENTA_NUEVA" => Ok(Self::NewSale),
            "UPSELL" => Ok(Self::Upsell),
            "RENOVACION" => Ok(Self::Renewal),
            _ => Err(CoreError::Validation(format!(
                "Invalid opportunity type '{s}'. Must be one of: VENTA_NUEVA, UPSELL, RENOVACION"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadOpportunity {
    pub sales_handoff: bool,
    pub opportunity_type: OpportunityType,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// What the agent filled in on the result form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultSelection {
    pub outcome: Option<OutcomeKind>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub reschedule_date: Option<NaiveDate>,
    #[serde(default)]
    pub reschedule_time: Option<NaiveTime>,
    #[serde(default)]
    pub create_opportunity: bool,
    #[serde(default)]
    pub opportunity_type: OpportunityType,
}

/// Identifiers of the contact a call was made to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTarget {
    pub contact_id: DbId,
    pub lead_id: DbId,
    pub queue_contact_id: Option<DbId>,
}

impl From<&Contact> for CallTarget {
    fn from(contact: &Contact) -> Self {
        Self {
            contact_id: contact.id,
            lead_id: contact.lead_id,
            queue_contact_id: Some(contact.id),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome record
// ---------------------------------------------------------------------------

/// A validated call result. Built once by [`build`]; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallOutcome {
    contact_id: DbId,
    outcome: OutcomeKind,
    reason: Option<String>,
    notes: Option<String>,
    reschedule_at: Option<Timestamp>,
    lead_opportunity: Option<LeadOpportunity>,
    duration_seconds: i64,
    started_at: Timestamp,
    ended_at: Timestamp,
    lead_id: DbId,
    queue_contact_id: Option<DbId>,
}

impl CallOutcome {
    pub fn contact_id(&self) -> DbId {
        self.contact_id
    }

    pub fn outcome(&self) -> OutcomeKind {
        self.outcome
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn reschedule_at(&self) -> Option<Timestamp> {
        self.reschedule_at
    }

    pub fn lead_opportunity(&self) -> Option<LeadOpportunity> {
        self.lead_opportunity
    }

    pub fn duration_seconds(&self) -> i64 {
        self.duration_seconds
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn ended_at(&self) -> Timestamp {
        self.ended_at
    }

    pub fn lead_id(&self) -> DbId {
        self.lead_id
    }

    pub fn queue_contact_id(&self) -> Option<DbId> {
        self.queue_contact_id
    }
}

/// Validate the agent's selection and produce the outcome to record.
///
/// Fields that do not apply to the chosen outcome are dropped, not rejected.
/// A reschedule needs both the date and the time; half of the pair is
/// ignored.
pub fn build(
    selection: ResultSelection,
    target: CallTarget,
    timing: CallTiming,
) -> Result<CallOutcome, ValidationError> {
    let outcome = selection.outcome.ok_or(ValidationError::MissingOutcome)?;

    let reschedule_at = match (selection.reschedule_date, selection.reschedule_time) {
        (Some(date), Some(time)) if outcome.allows_reschedule() => {
            Some(date.and_time(time).and_utc())
        }
        _ => None,
    };

    let lead_opportunity = (outcome.allows_opportunity() && selection.create_opportunity).then(
        || LeadOpportunity {
            sales_handoff: true,
            opportunity_type: selection.opportunity_type,
        },
    );

    Ok(CallOutcome {
        contact_id: target.contact_id,
        outcome,
        reason: non_blank(selection.reason),
        notes: non_blank(selection.notes),
        reschedule_at,
        lead_opportunity,
        duration_seconds: timing.duration_seconds,
        started_at: timing.started_at,
        ended_at: timing.ended_at,
        lead_id: target.lead_id,
        queue_contact_id: target.queue_contact_id,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Queue disposition
// ---------------------------------------------------------------------------

/// Queue entry waiting to be called.
pub const QUEUE_PENDING: &str = "PENDIENTE";
/// Queue entry claimed by an agent.
pub const QUEUE_IN_PROGRESS: &str = "EN_PROCESO";
/// Queue entry that needs no further calls.
pub const QUEUE_COMPLETED: &str = "COMPLETADO";

/// How a queue entry is updated once its call outcome is recorded.
/// The agent's claim on the entry is released in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueDisposition {
    pub queue_status: &'static str,
    pub scheduled_at: Option<Timestamp>,
}

impl QueueDisposition {
    pub fn for_outcome(outcome: &CallOutcome) -> Self {
        match outcome.reschedule_at() {
            Some(at) => Self {
                queue_status: QUEUE_PENDING,
                scheduled_at: Some(at),
            },
            None => Self {
                queue_status: QUEUE_COMPLETED,
                scheduled_at: None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Where the agent goes after saving a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NextAction {
    NavigateToContact { contact_id: DbId },
    NavigateToQueue,
}

/// Record `outcome` and decide the next screen.
///
/// A failed recording is returned as [`SubmitError`] and nothing else
/// happens; retrying is up to the caller. Once the outcome is recorded, a
/// failure to look up the next contact falls back to the queue screen so a
/// retry can never record the same call twice.
pub async fn commit(
    outcome: &CallOutcome,
    continue_to_next: bool,
    ctx: CampaignContext,
    recorder: &dyn OutcomeRecorder,
    queue: &dyn ContactQueue,
) -> Result<NextAction, SubmitError> {
    recorder
        .record_call_outcome(ctx.campaign_id, ctx.agent_id, outcome)
        .await?;

    if !continue_to_next {
        return Ok(NextAction::NavigateToQueue);
    }

    match queue
        .fetch_next_queued_contact(ctx.campaign_id, ctx.agent_id)
        .await
    {
        Ok(Some(contact)) => Ok(NextAction::NavigateToContact {
            contact_id: contact.id,
        }),
        Ok(None) => Ok(NextAction::NavigateToQueue),
        Err(err) => {
            tracing::warn!(
                campaign_id = ctx.campaign_id,
                agent_id = ctx.agent_id,
                error = %err,
                "Outcome recorded but next contact lookup failed; returning to queue"
            );
            Ok(NextAction::NavigateToQueue)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn timing() -> CallTiming {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        CallTiming::between(start, start + Duration::seconds(90))
    }

    fn target() -> CallTarget {
        CallTarget {
            contact_id: 11,
            lead_id: 501,
            queue_contact_id: Some(11),
        }
    }

    fn with_reschedule(outcome: OutcomeKind) -> ResultSelection {
        ResultSelection {
            outcome: Some(outcome),
            reschedule_date: NaiveDate::from_ymd_opt(2026, 3, 9),
            reschedule_time: NaiveTime::from_hms_opt(15, 30, 0),
            ..Default::default()
        }
    }

    // -- build ---------------------------------------------------------------

    #[test]
    fn missing_outcome_is_rejected() {
        let result = build(ResultSelection::default(), target(), timing());
        assert_matches!(result, Err(ValidationError::MissingOutcome));
    }

    #[test]
    fn reschedule_kept_for_allowed_outcomes() {
        for outcome in [
            OutcomeKind::Contacted,
            OutcomeKind::Interested,
            OutcomeKind::Voicemail,
        ] {
            let built = build(with_reschedule(outcome), target(), timing()).unwrap();
            let expected = Utc.with_ymd_and_hms(2026, 3, 9, 15, 30, 0).unwrap();
            assert_eq!(built.reschedule_at(), Some(expected), "{outcome:?}");
        }
    }

    #[test]
    fn not_interested_never_reschedules() {
        let built = build(with_reschedule(OutcomeKind::NotInterested), target(), timing()).unwrap();
        assert!(built.reschedule_at().is_none());
    }

    #[test]
    fn sale_and_no_answer_never_reschedule() {
        for outcome in [OutcomeKind::Sale, OutcomeKind::NoAnswer] {
            let built = build(with_reschedule(outcome), target(), timing()).unwrap();
            assert!(built.reschedule_at().is_none(), "{outcome:?}");
        }
    }

    #[test]
    fn partial_reschedule_is_dropped() {
        let mut only_date = with_reschedule(OutcomeKind::Contacted);
        only_date.reschedule_time = None;
        assert!(build(only_date, target(), timing()).unwrap().reschedule_at().is_none());

        let mut only_time = with_reschedule(OutcomeKind::Contacted);
        only_time.reschedule_date = None;
        assert!(build(only_time, target(), timing()).unwrap().reschedule_at().is_none());
    }

    #[test]
    fn sale_without_flag_has_no_opportunity() {
        let selection = ResultSelection {
            outcome: Some(OutcomeKind::Sale),
            create_opportunity: false,
            opportunity_type: OpportunityType::Upsell,
            ..Default::default()
        };
        let built = build(selection, target(), timing()).unwrap();
        assert!(built.lead_opportunity().is_none());
    }

    #[test]
    fn opportunity_only_for_sale_or_interested() {
        for (outcome, expected) in [
            (OutcomeKind::Sale, true),
            (OutcomeKind::Interested, true),
            (OutcomeKind::Contacted, false),
            (OutcomeKind::NotInterested, false),
        ] {
            let selection = ResultSelection {
                outcome: Some(outcome),
                create_opportunity: true,
                opportunity_type: OpportunityType::Renewal,
                ..Default::default()
            };
            let built = build(selection, target(), timing()).unwrap();
            assert_eq!(built.lead_opportunity().is_some(), expected, "{outcome:?}");
        }
    }

    #[test]
    fn opportunity_carries_selected_type() {
        let selection = ResultSelection {
            outcome: Some(OutcomeKind::Interested),
            create_opportunity: true,
            opportunity_type: OpportunityType::Upsell,
            ..Default::default()
        };
        let opp = build(selection, target(), timing())
            .unwrap()
            .lead_opportunity()
            .unwrap();
        assert!(opp.sales_handoff);
        assert_eq!(opp.opportunity_type, OpportunityType::Upsell);
    }

    #[test]
    fn timing_and_identifiers_are_copied() {
        let selection = ResultSelection {
            outcome: Some(OutcomeKind::NoAnswer),
            reason: Some("  ".into()),
            notes: Some("rang out".into()),
            ..Default::default()
        };
        let built = build(selection, target(), timing()).unwrap();
        assert_eq!(built.duration_seconds(), 90);
        assert_eq!(built.started_at(), timing().started_at);
        assert_eq!(built.ended_at(), timing().ended_at);
        assert_eq!(built.contact_id(), 11);
        assert_eq!(built.lead_id(), 501);
        assert_eq!(built.queue_contact_id(), Some(11));
        assert!(built.reason().is_none());
        assert_eq!(built.notes(), Some("rang out"));
    }

    #[test]
    fn outcome_codes_round_trip() {
        for outcome in ALL_OUTCOMES {
            assert_eq!(OutcomeKind::from_str(outcome.as_str()).unwrap(), outcome);
        }
        assert!(OutcomeKind::from_str("SALE").is_err());
    }

    #[test]
    fn selection_deserializes_from_form_fields() {
        let json = serde_json::json!({
            "outcome": "INTERESADO",
            "reschedule_date": "2026-03-09",
            "reschedule_time": "15:30:00",
            "create_opportunity": true
        });
        let selection: ResultSelection = serde_json::from_value(json).unwrap();
        assert_eq!(selection.outcome, Some(OutcomeKind::Interested));
        assert_eq!(selection.opportunity_type, OpportunityType::NewSale);
    }

    // -- QueueDisposition ----------------------------------------------------

    #[test]
    fn rescheduled_outcome_returns_to_pending() {
        let built = build(with_reschedule(OutcomeKind::Voicemail), target(), timing()).unwrap();
        let disposition = QueueDisposition::for_outcome(&built);
        assert_eq!(disposition.queue_status, QUEUE_PENDING);
        assert_eq!(disposition.scheduled_at, built.reschedule_at());
    }

    #[test]
    fn other_outcomes_complete_the_entry() {
        let built = build(with_reschedule(OutcomeKind::Sale), target(), timing()).unwrap();
        let disposition = QueueDisposition::for_outcome(&built);
        assert_eq!(disposition.queue_status, QUEUE_COMPLETED);
        assert!(disposition.scheduled_at.is_none());
    }

    // -- commit --------------------------------------------------------------

    struct FakeStore {
        fail_record: bool,
        fail_next: bool,
        next: Option<DbId>,
        recorded: Mutex<Vec<CallOutcome>>,
        next_calls: Mutex<usize>,
    }

    impl FakeStore {
        fn new(next: Option<DbId>) -> Self {
            Self {
                fail_record: false,
                fail_next: false,
                next,
                recorded: Mutex::new(Vec::new()),
                next_calls: Mutex::new(0),
            }
        }
    }

    fn contact(id: DbId) -> Contact {
        Contact {
            id,
            campaign_id: 3,
            lead_id: id + 1000,
            full_name: "Ana".into(),
            phone: "555-0100".into(),
            email: None,
            company: None,
            priority: "MEDIA".into(),
            queue_status: QUEUE_IN_PROGRESS.into(),
            attempts: 0,
            last_call_at: None,
            last_outcome: None,
        }
    }

    #[async_trait]
    impl OutcomeRecorder for FakeStore {
        async fn record_call_outcome(
            &self,
            _campaign_id: DbId,
            _agent_id: DbId,
            outcome: &CallOutcome,
        ) -> Result<(), SubmitError> {
            if self.fail_record {
                return Err(SubmitError::SubmitFailed("connection reset".into()));
            }
            self.recorded.lock().unwrap().push(outcome.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl ContactQueue for FakeStore {
        async fn fetch_next_queued_contact(
            &self,
            _campaign_id: DbId,
            _agent_id: DbId,
        ) -> Result<Option<Contact>, SubmitError> {
            *self.next_calls.lock().unwrap() += 1;
            if self.fail_next {
                return Err(SubmitError::SubmitFailed("timeout".into()));
            }
            Ok(self.next.map(contact))
        }
    }

    fn ctx() -> CampaignContext {
        CampaignContext {
            campaign_id: 3,
            agent_id: 10,
        }
    }

    fn outcome() -> CallOutcome {
        let selection = ResultSelection {
            outcome: Some(OutcomeKind::Contacted),
            ..Default::default()
        };
        build(selection, target(), timing()).unwrap()
    }

    #[tokio::test]
    async fn commit_without_continue_goes_to_queue() {
        let store = FakeStore::new(Some(42));
        let next = commit(&outcome(), false, ctx(), &store, &store).await.unwrap();
        assert_eq!(next, NextAction::NavigateToQueue);
        assert_eq!(*store.next_calls.lock().unwrap(), 0);
        assert_eq!(store.recorded.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn commit_with_continue_goes_to_next_contact() {
        let store = FakeStore::new(Some(42));
        let next = commit(&outcome(), true, ctx(), &store, &store).await.unwrap();
        assert_eq!(next, NextAction::NavigateToContact { contact_id: 42 });
    }

    #[tokio::test]
    async fn commit_with_continue_and_empty_queue_goes_to_queue() {
        let store = FakeStore::new(None);
        let next = commit(&outcome(), true, ctx(), &store, &store).await.unwrap();
        assert_eq!(next, NextAction::NavigateToQueue);
    }

    #[tokio::test]
    async fn commit_surfaces_record_failure() {
        let mut store = FakeStore::new(Some(42));
        store.fail_record = true;
        let result = commit(&outcome(), true, ctx(), &store, &store).await;
        assert_matches!(result, Err(SubmitError::SubmitFailed(_)));
        assert_eq!(*store.next_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn next_lookup_failure_after_record_falls_back_to_queue() {
        let mut store = FakeStore::new(Some(42));
        store.fail_next = true;
        let next = commit(&outcome(), true, ctx(), &store, &store).await.unwrap();
        assert_eq!(next, NextAction::NavigateToQueue);
        assert_eq!(store.recorded.lock().unwrap().len(), 1);
    }
}
