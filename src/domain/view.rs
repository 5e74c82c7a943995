//! Flat, self-contained query result handed to renderers and transports.

use crate::domain::edge::{Relationship, RelationshipType};
use crate::domain::graph::Metamodel;
use crate::domain::node::{CodeUnit, UnitKind};
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ViewNode {
    pub fqn: String,
    pub name: String,
    pub kind: UnitKind,
    /// Set only when the parent is part of the same view.
    pub parent_fqn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ViewEdge {
    pub source_fqn: String,
    pub target_fqn: String,
    pub relationship_type: RelationshipType,
}

impl From<&Relationship> for ViewEdge {
    fn from(r: &Relationship) -> Self {
        Self {
            source_fqn: r.source_fqn.clone(),
            target_fqn: r.target_fqn.clone(),
            relationship_type: r.relationship_type,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ViewState {
    pub nodes: Vec<ViewNode>,
    pub edges: Vec<ViewEdge>,
}

impl ViewState {
    pub fn node(&self, fqn: &str) -> Option<&ViewNode> {
        self.nodes.iter().find(|n| n.fqn == fqn)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Flatten visited units (in visit order) and relationships into a view.
pub fn assemble(
    metamodel: &Metamodel,
    visited: &[&CodeUnit],
    relationships: &[&Relationship],
) -> ViewState {
    let members: HashSet<&str> = visited.iter().map(|u| u.fqn.as_str()).collect();

    let nodes = visited
        .iter()
        .map(|unit| ViewNode {
            fqn: unit.fqn.clone(),
            name: unit.name.clone(),
            kind: unit.kind(),
            parent_fqn: metamodel
                .parent_of(unit)
                .filter(|p| members.contains(p.fqn.as_str()))
                .map(|p| p.fqn.clone()),
        })
        .collect();
    let edges = relationships.iter().map(|r| ViewEdge::from(*r)).collect();

    ViewState { nodes, edges }
}
