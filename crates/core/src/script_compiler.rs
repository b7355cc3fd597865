//! Compiles a [`Script`] into the single document agents read during a call.
//!
//! The same output backs the live call screen, the authoring preview and the
//! markdown file stored against a campaign. Section content is editor markup
//! and passes through untouched; escaping is the renderer's job.

use serde::Serialize;

use crate::script::{CallType, Script, SectionKind};

/// Title used when a draft has no name yet.
pub const UNTITLED: &str = "Untitled";

/// Placeholder for metadata fields a draft has not filled in.
pub const NOT_DEFINED: &str = "Not defined";

/// Compiled script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub title: String,
    pub metadata: DocumentMetadata,
    /// Non-blank sections in rank order.
    pub sections: Vec<DocumentSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub objective: String,
    pub call_type: Option<CallType>,
    pub internal_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSection {
    pub kind: SectionKind,
    pub heading: &'static str,
    pub content: String,
}

/// Compile `script` into a [`Document`].
///
/// Pure and deterministic: the same script always yields an identical
/// document. Blank sections and blank internal notes are omitted.
pub fn compile(script: &Script) -> Document {
    let internal_notes = script
        .internal_notes
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(str::to_owned);

    let sections = script
        .sections()
        .filter(|(_, content)| !content.trim().is_empty())
        .map(|(kind, content)| DocumentSection {
            kind,
            heading: kind.label(),
            content: content.to_owned(),
        })
        .collect();

    Document {
        title: script.name.clone(),
        metadata: DocumentMetadata {
            objective: script.objective.clone(),
            call_type: script.call_type,
            internal_notes,
        },
        sections,
    }
}

impl Document {
    /// Render as the markdown stored for a campaign's script file.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("# {}\n\n", or_placeholder(&self.title, UNTITLED)));

        out.push_str("## Script Information\n\n");
        out.push_str(&format!(
            "**Objective:** {}\n\n",
            or_placeholder(&self.metadata.objective, NOT_DEFINED)
        ));
        out.push_str(&format!(
            "**Type:** {}\n\n",
            self.metadata.call_type.map_or(NOT_DEFINED, CallType::as_str)
        ));
        if let Some(notes) = &self.metadata.internal_notes {
            out.push_str(&format!("**Internal Notes:** {notes}\n\n"));
        }
        out.push_str("---\n\n");

        for section in &self.sections {
            out.push_str(&format!("## {}\n\n{}\n\n", section.heading, section.content));
        }

        out
    }

    /// Suggested file name for the stored markdown: the title with anything
    /// outside `[A-Za-z0-9.-]` replaced by `_`.
    pub fn file_name(&self) -> String {
        let stem: String = or_placeholder(&self.title, UNTITLED)
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{stem}.md")
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
