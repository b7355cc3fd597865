use crate::script::SectionKind;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Field-level validation failures for scripts and call results.
///
/// Always recoverable: the presentation layer shows the message next to the
/// offending field and lets the user correct it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Script name is required")]
    MissingName,

    #[error("Script objective is required")]
    MissingObjective,

    #[error("Call type is required")]
    MissingType,

    #[error("At least one section must have content")]
    NoContent,

    #[error("A call outcome must be selected")]
    MissingOutcome,

    #[error("Section '{}' appears more than once", .0.as_str())]
    DuplicateSection(SectionKind),
}

impl ValidationError {
    /// The form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingName => "name",
            Self::MissingObjective => "objective",
            Self::MissingType => "call_type",
            Self::NoContent | Self::DuplicateSection(_) => "sections",
            Self::MissingOutcome => "outcome",
        }
    }
}

/// Call-session sequencing errors. Seeing one means the caller drove the
/// state machine out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("A call is already in progress")]
    AlreadyInProgress,

    #[error("No call is in progress")]
    NotInProgress,
}

/// Failure persisting an outcome or a script through an external store.
///
/// The core never retries; the user gets a retry affordance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("Submit failed: {0}")]
    SubmitFailed(String),
}

/// Every way saving a call result can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallFlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}
