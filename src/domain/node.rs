use petgraph::graph::NodeIndex;
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Stable identifier of a unit inside one metamodel arena.
pub type UnitId = NodeIndex;

/// Discriminator shared by all unit variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Package,
    Module,
    Classifier,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Package => "package",
            UnitKind::Module => "module",
            UnitKind::Classifier => "classifier",
        }
    }

    /// Packages and modules hold other units; classifiers only hold nested classifiers.
    pub fn is_container(&self) -> bool {
        matches!(self, UnitKind::Package | UnitKind::Module)
    }
}

/// Classifier flavour as reported by the source-unit provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    Class,
    Interface, // Java/Go/TypeScript
    Trait,     // Rust, Scala
    Struct,
    Enum,
    Protocol, // Python, Swift
    TypeAlias,
}

/// Kind-specific payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitDetails {
    Package,
    Module {
        /// Source path (relative to the project) this module was built from.
        source_path: String,
    },
    Classifier {
        classifier_kind: ClassifierKind,
        is_abstract: bool,
    },
}

impl UnitDetails {
    pub fn kind(&self) -> UnitKind {
        match self {
            UnitDetails::Package => UnitKind::Package,
            UnitDetails::Module { .. } => UnitKind::Module,
            UnitDetails::Classifier { .. } => UnitKind::Classifier,
        }
    }
}

/// A node of the structural hierarchy.
///
/// Ownership flows from the arena only; `parent` and `children` are ids into the same
/// arena, so the hierarchy can be walked both ways without owning cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeUnit {
    pub name: String,
    pub fqn: String,
    pub parent: Option<UnitId>,
    pub children: Vec<UnitId>,
    pub details: UnitDetails,
}

impl CodeUnit {
    pub fn kind(&self) -> UnitKind {
        self.details.kind()
    }

    pub fn is_classifier(&self) -> bool {
        matches!(self.details, UnitDetails::Classifier { .. })
    }
}

/// Join a parent FQN and a local name.
pub fn join_fqn(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(p) if !p.is_empty() => format!("{p}.{name}"),
        _ => name.to_string(),
    }
}
