//! Call script data model and submission validation.
//!
//! A script is a set of guidance sections keyed by [`SectionKind`]. The kind
//! fixes both the display label and the position of a section, so every
//! consumer (editor, compiler, storage) sees sections in the same order.

use std::collections::BTreeMap;
use std::ops::Deref;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{CoreError, ValidationError};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Section kinds
// ---------------------------------------------------------------------------

/// The five fixed stages of a call script.
///
/// Variant order is the display rank: `Ord` on this enum sorts sections the
/// way they are presented, so there is no separate rank table to keep in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    #[serde(rename = "INTRO")]
    Intro,
    #[serde(rename = "DIAGNOSTICO")]
    Diagnosis,
    #[serde(rename = "OBJECIONES")]
    Objections,
    #[serde(rename = "CIERRE")]
    Close,
    #[serde(rename = "POST_LLAMADA")]
    PostCall,
}

/// All section kinds in rank order.
pub const ALL_SECTION_KINDS: [SectionKind; 5] = [
    SectionKind::Intro,
    SectionKind::Diagnosis,
    SectionKind::Objections,
    SectionKind::Close,
    SectionKind::PostCall,
];

impl SectionKind {
    /// Fixed 1-based position of the section within a script.
    pub fn rank(self) -> u8 {
        match self {
            Self::Intro => 1,
            Self::Diagnosis => 2,
            Self::Objections => 3,
            Self::Close => 4,
            Self::PostCall => 5,
        }
    }

    /// Heading shown above the section content.
    pub fn label(self) -> &'static str {
        match self {
            Self::Intro => "Introduction / Greeting",
            Self::Diagnosis => "Diagnostic Questions",
            Self::Objections => "Objection Handling",
            Self::Close => "Close / Call to Action",
            Self::PostCall => "Post-Call Steps",
        }
    }

    /// Stored code for the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intro => "INTRO",
            Self::Diagnosis => "DIAGNOSTICO",
            Self::Objections => "OBJECIONES",
            Self::Close => "CIERRE",
            Self::PostCall => "POST_LLAMADA",
        }
    }

    /// Parse a stored code.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        ALL_SECTION_KINDS
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid section kind '{s}'. Must be one of: {}",
                    ALL_SECTION_KINDS.map(SectionKind::as_str).join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Call type and status
// ---------------------------------------------------------------------------

/// Purpose of the calls a script is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallType {
    #[serde(rename = "RENOVACION")]
    Renewal,
    #[serde(rename = "VENTA_NUEVA")]
    NewSale,
    #[serde(rename = "RECUPERO")]
    Recovery,
    #[serde(rename = "RETENCION")]
    Retention,
    #[serde(rename = "ENCUESTA")]
    Survey,
    #[serde(rename = "SEGUIMIENTO")]
    FollowUp,
}

const ALL_CALL_TYPES: [CallType; 6] = [
    CallType::Renewal,
    CallType::NewSale,
    CallType::Recovery,
    CallType::Retention,
    CallType::Survey,
    CallType::FollowUp,
];

impl CallType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Renewal => "RENOVACION",
            Self::NewSale => "VENTA_NUEVA",
            Self::Recovery => "RECUPERO",
            Self::Retention => "RETENCION",
            Self::Survey => "ENCUESTA",
            Self::FollowUp => "SEGUIMIENTO",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        ALL_CALL_TYPES
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid call type '{s}'. Must be one of: {}",
                    ALL_CALL_TYPES.map(CallType::as_str).join(", ")
                ))
            })
    }
}

/// Publication state of a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptStatus {
    #[default]
    #[serde(rename = "BORRADOR")]
    Draft,
    #[serde(rename = "ACTIVO")]
    Active,
}

impl ScriptStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "BORRADOR",
            Self::Active => "ACTIVO",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "BORRADOR" => Ok(Self::Draft),
            "ACTIVO" => Ok(Self::Active),
            _ => Err(CoreError::Validation(format!(
                "Invalid script status '{s}'. Must be one of: BORRADOR, ACTIVO"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// One section of a script. `content` is opaque editor markup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    #[serde(default)]
    pub content: String,
}

impl Section {
    pub fn new(kind: SectionKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    /// Position of the section, derived from its kind.
    pub fn order(&self) -> u8 {
        self.kind.rank()
    }

    /// Whether the content is empty once whitespace is trimmed.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Section", 3)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("content", &self.content)?;
        state.serialize_field("order", &self.order())?;
        state.end()
    }
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// A call script as authored, possibly incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScriptRepr", into = "ScriptRepr")]
pub struct Script {
    /// Assigned by the store on first successful create.
    pub id: Option<DbId>,
    pub name: String,
    pub objective: String,
    pub call_type: Option<CallType>,
    pub internal_notes: Option<String>,
    pub status: ScriptStatus,
    sections: BTreeMap<SectionKind, String>,
}

impl Script {
    /// Authoring starting point: all five kinds present with empty content.
    pub fn blank() -> Self {
        Self {
            id: None,
            name: String::new(),
            objective: String::new(),
            call_type: None,
            internal_notes: None,
            status: ScriptStatus::Draft,
            sections: ALL_SECTION_KINDS
                .into_iter()
                .map(|k| (k, String::new()))
                .collect(),
        }
    }

    /// Replace the section set with `sections`, rejecting duplicate kinds.
    ///
    /// Input order is irrelevant; sections are always held in rank order.
    pub fn with_sections<I>(mut self, sections: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = Section>,
    {
        let mut map = BTreeMap::new();
        for section in sections {
            if map.insert(section.kind, section.content).is_some() {
                return Err(ValidationError::DuplicateSection(section.kind));
            }
        }
        self.sections = map;
        Ok(self)
    }

    /// Store the editor's committed markup for one section.
    pub fn set_section(&mut self, kind: SectionKind, content: impl Into<String>) {
        self.sections.insert(kind, content.into());
    }

    pub fn section(&self, kind: SectionKind) -> Option<&str> {
        self.sections.get(&kind).map(String::as_str)
    }

    /// Sections in rank order.
    pub fn sections(&self) -> impl Iterator<Item = (SectionKind, &str)> + '_ {
        self.sections.iter().map(|(k, c)| (*k, c.as_str()))
    }

    pub fn to_sections(&self) -> Vec<Section> {
        self.sections()
            .map(|(kind, content)| Section::new(kind, content))
            .collect()
    }

    /// Expand a stored script (non-empty sections only) back to all five
    /// kinds for editing. Existing content is kept untouched.
    pub fn rehydrate(mut self) -> Self {
        for kind in ALL_SECTION_KINDS {
            self.sections.entry(kind).or_default();
        }
        self
    }
}

/// A script that passed [`validate`]: name, objective and call type are set
/// and every remaining section has content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidScript {
    script: Script,
    #[serde(skip)]
    call_type: CallType,
}

impl ValidScript {
    pub fn call_type(&self) -> CallType {
        self.call_type
    }

    pub fn into_inner(self) -> Script {
        self.script
    }
}

impl Deref for ValidScript {
    type Target = Script;

    fn deref(&self) -> &Script {
        &self.script
    }
}

/// Check a script before create/update and drop its blank sections.
///
/// Checks run in field order: name, objective, call type, content.
pub fn validate(mut script: Script) -> Result<ValidScript, ValidationError> {
    if script.name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if script.objective.trim().is_empty() {
        return Err(ValidationError::MissingObjective);
    }
    let call_type = script.call_type.ok_or(ValidationError::MissingType)?;

    script.sections.retain(|_, content| !content.trim().is_empty());
    if script.sections.is_empty() {
        return Err(ValidationError::NoContent);
    }

    Ok(ValidScript { script, call_type })
}

// ---------------------------------------------------------------------------
// Serde representation
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct ScriptRepr {
    #[serde(default)]
    id: Option<DbId>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    objective: String,
    #[serde(default)]
    call_type: Option<CallType>,
    #[serde(default)]
    internal_notes: Option<String>,
    #[serde(default)]
    status: ScriptStatus,
    #[serde(default)]
    sections: Vec<Section>,
}

impl TryFrom<ScriptRepr> for Script {
    type Error = ValidationError;

    fn try_from(repr: ScriptRepr) -> Result<Self, Self::Error> {
        Script {
            id: repr.id,
            name: repr.name,
            objective: repr.objective,
            call_type: repr.call_type,
            internal_notes: repr.internal_notes,
            status: repr.status,
            sections: BTreeMap::new(),
        }
        .with_sections(repr.sections)
    }
}

impl From<Script> for ScriptRepr {
    fn from(script: Script) -> Self {
        let sections = script.to_sections();
        ScriptRepr {
            id: script.id,
            name: script.name,
            objective: script.objective,
            call_type: script.call_type,
            internal_notes: script.internal_notes,
            status: script.status,
            sections,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
