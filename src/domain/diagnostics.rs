//! Non-fatal findings collected while building a metamodel.

use crate::domain::semantic::SourceLocation;
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The reference could not be bound to any project symbol (usually a third-party type).
    UnresolvedReference,
    /// A member matched more than one classification rule; the stronger one was used.
    AmbiguousClassification,
}

/// Syntactic position the reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceContext {
    Supertype,
    Member,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Reference text as written.
    pub reference: String,
    pub location: SourceLocation,
    /// FQN of the unit the reference appeared in.
    pub enclosing_fqn: String,
    pub context: ReferenceContext,
    pub message: String,
}

impl Diagnostic {
    pub fn unresolved(
        reference: &str,
        location: &SourceLocation,
        enclosing_fqn: &str,
        context: ReferenceContext,
    ) -> Self {
        Self {
            kind: DiagnosticKind::UnresolvedReference,
            reference: reference.to_string(),
            location: location.clone(),
            enclosing_fqn: enclosing_fqn.to_string(),
            context,
            message: format!("'{reference}' does not resolve to a project type"),
        }
    }

    pub fn ambiguous(
        reference: &str,
        location: &SourceLocation,
        enclosing_fqn: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: DiagnosticKind::AmbiguousClassification,
            reference: reference.to_string(),
            location: location.clone(),
            enclosing_fqn: enclosing_fqn.to_string(),
            context: ReferenceContext::Member,
            message: message.into(),
        }
    }
}

/// Outcome summary returned next to a finished metamodel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BuildReport {
    pub source_units: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub fn unresolved(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::UnresolvedReference)
    }

    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }
}
