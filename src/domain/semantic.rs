//! Parsed-syntax contract between a language front end and the cartographer.
//!
//! The core never tokenizes or parses source text. A front end (tree-sitter extractor, compiler
//! plugin, LSP bridge, ...) reports per-file definitions, members, references and import
//! bindings in this shape, and the two construction passes consume it.

use crate::domain::node::ClassifierKind;
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Whole-project payload as written by a front end into a single JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyntaxIndex {
    /// Optional project name; used as the root package when no explicit one is configured.
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub units: Vec<SourceUnit>,
}

/// One source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Path relative to the project root, `/` or `\` separated.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub language: String,
    /// Unit-level import bindings in source order. Later bindings shadow earlier ones.
    #[serde(default)]
    pub imports: Vec<ImportBinding>,
    #[serde(default)]
    pub definitions: Vec<DefinitionNode>,
    #[serde(default)]
    pub references: Vec<ReferenceNode>,
}

/// `local_name` is bound to `target`.
///
/// A target starting with `.` is relative: one dot is the unit's own package, each further dot
/// climbs one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBinding {
    pub local_name: String,
    pub target: String,
    #[serde(default)]
    pub location: SourceLocation,
}

impl ImportBinding {
    pub fn new(local_name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            target: target.into(),
            location: SourceLocation::default(),
        }
    }
}

/// A type definition found in the unit (class, interface, trait, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionNode {
    pub name: String,
    #[serde(default)]
    pub kind: ClassifierKind,
    /// Unit-local dotted path of the enclosing definition (`Outer.Inner`); `None` at top level.
    #[serde(default)]
    pub enclosing: Option<String>,
    /// Supertype names exactly as written (`Base`, `models.Base`).
    #[serde(default)]
    pub supertypes: Vec<String>,
    #[serde(default)]
    pub members: Vec<MemberNode>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub location: SourceLocation,
}

impl DefinitionNode {
    /// Unit-local path of this definition (`Outer.Inner.Name`).
    pub fn local_path(&self) -> String {
        match &self.enclosing {
            Some(e) if !e.is_empty() => format!("{e}.{}", self.name),
            _ => self.name.clone(),
        }
    }

    pub fn nesting_depth(&self) -> usize {
        match &self.enclosing {
            Some(e) if !e.is_empty() => e.split('.').count(),
            _ => 0,
        }
    }
}

/// Attribute or field declared by a definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberNode {
    pub name: String,
    /// Declared or inferred type; `None` when the front end could not tell.
    #[serde(default)]
    pub type_ref: Option<TypeRef>,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Element type name as written (for collections, the element type).
    pub name: String,
    #[serde(default)]
    pub multiplicity: Multiplicity,
    #[serde(default)]
    pub ownership: Ownership,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    #[default]
    Single,
    Collection,
}

/// Whether the holder owns the lifetime of the referenced value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    /// Constructed by/embedded in the holder (`self.repo = Repo()`, a by-value field).
    Owned,
    #[default]
    Shared,
}

/// A use of a name inside executable code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceNode {
    /// Name as written, possibly dotted (`user.User`).
    pub name: String,
    /// Unit-local dotted path of the enclosing scope (may name a method). Empty = module level.
    #[serde(default)]
    pub enclosing: String,
    #[serde(default)]
    pub kind: ReferenceKind,
    /// Bindings visible only at this point (function-local imports). They shadow unit imports.
    #[serde(default)]
    pub imports: Vec<ImportBinding>,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Call,
    Instantiation,
    Annotation,
    TypeUsage,
    #[default]
    Other,
}

/// Position in a source file (0-based line and column).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct SourceLocation {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl SourceLocation {
    pub fn new(path: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            path: path.into(),
            line,
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_and_depth() {
        let top = DefinitionNode {
            name: "Outer".into(),
            ..Default::default()
        };
        assert_eq!(top.local_path(), "Outer");
        assert_eq!(top.nesting_depth(), 0);

        let nested = DefinitionNode {
            name: "Leaf".into(),
            enclosing: Some("Outer.Inner".into()),
            ..Default::default()
        };
        assert_eq!(nested.local_path(), "Outer.Inner.Leaf");
        assert_eq!(nested.nesting_depth(), 2);
    }

    #[test]
    fn test_minimal_unit_deserializes_with_defaults() {
        let json = r#"{
            "path": "pkg/a.py",
            "definitions": [
                {"name": "A", "members": [{"name": "items", "type_ref": {"name": "B", "multiplicity": "collection"}}]}
            ],
            "references": [{"name": "os.getcwd", "kind": "call"}]
        }"#;
        let unit: SourceUnit = serde_json::from_str(json).unwrap();
        assert_eq!(unit.definitions[0].kind, ClassifierKind::Class);
        let ty = unit.definitions[0].members[0].type_ref.as_ref().unwrap();
        assert_eq!(ty.multiplicity, Multiplicity::Collection);
        assert_eq!(ty.ownership, Ownership::Shared);
        assert_eq!(unit.references[0].kind, ReferenceKind::Call);
        assert!(unit.references[0].enclosing.is_empty());
    }
}
