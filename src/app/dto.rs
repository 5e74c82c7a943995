use crate::domain::diagnostics::Diagnostic;
use crate::domain::edge::RelationshipType;
use crate::domain::node::{ClassifierKind, UnitKind};
use crate::domain::query::{DEFAULT_DEPTH, Query};
use crate::domain::view::{ViewEdge, ViewState};
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_depth() -> u32 {
    DEFAULT_DEPTH
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    pub source_path: String,
    pub root_package: Option<String>,
    pub unit_count: usize,
    pub relationship_count: usize,
    pub diagnostic_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub health: HealthResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QueryRequest {
    /// Root FQNs. `.` stands for the whole project; names without the root package get it prefixed.
    pub roots: Vec<String>,
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Relationship types to leave out (e.g. `DEPENDENCY`).
    #[serde(default)]
    pub exclude: Vec<RelationshipType>,
    /// Expand packages and modules into their contents without spending depth.
    #[serde(default)]
    pub include_children: bool,
}

impl QueryRequest {
    pub fn new<I, S>(roots: I, depth: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            depth,
            exclude: Vec::new(),
            include_children: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UnitSummary {
    pub fqn: String,
    pub name: String,
    pub kind: UnitKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KindCount<K> {
    pub kind: K,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProjectInfo {
    pub project_name: String,
    pub root_package: Option<String>,
    pub source_units: usize,
    /// Top-level units in FQN order.
    pub roots: Vec<UnitSummary>,
    pub units_by_kind: Vec<KindCount<UnitKind>>,
    pub relationships_by_type: Vec<KindCount<RelationshipType>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UnitResponse {
    pub fqn: String,
    pub name: String,
    pub kind: UnitKind,
    pub parent_fqn: Option<String>,
    pub children: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier_kind: Option<ClassifierKind>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    pub outgoing: Vec<ViewEdge>,
    pub incoming: Vec<ViewEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiagnosticsRequest {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiagnosticsResponse {
    pub total: usize,
    pub unresolved: usize,
    pub ambiguous: usize,
    pub items: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionResponse {
    pub query: Query,
    pub view: ViewState,
    pub can_undo: bool,
    pub can_redo: bool,
}
