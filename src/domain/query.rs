//! Bounded breadth-first traversal over a finalized metamodel.

use crate::domain::edge::{Relationship, RelationshipType};
use crate::domain::error::QueryError;
use crate::domain::graph::{Direction, Metamodel};
use crate::domain::node::CodeUnit;
use crate::domain::view::{ViewState, assemble};
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Query {
    /// Seed units, all at distance 0. Later duplicates are ignored.
    pub root_fqns: Vec<String>,
    /// Maximum hop count from the nearest root.
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Relationship types excluded from traversal and output.
    #[serde(default)]
    pub filter_rules: BTreeSet<RelationshipType>,
    /// Visit the descendants of every visited package/module without spending a hop.
    #[serde(default)]
    pub include_children: bool,
}

/// Depth used when a query does not name one.
pub const DEFAULT_DEPTH: u32 = 1;

fn default_depth() -> u32 {
    DEFAULT_DEPTH
}

impl Query {
    pub fn new<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root_fqns: roots.into_iter().map(Into::into).collect(),
            depth: DEFAULT_DEPTH,
            filter_rules: BTreeSet::new(),
            include_children: false,
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn excluding(mut self, relationship_type: RelationshipType) -> Self {
        self.filter_rules.insert(relationship_type);
        self
    }

    pub fn with_children(mut self, include_children: bool) -> Self {
        self.include_children = include_children;
        self
    }

    fn admits(&self, relationship: &Relationship) -> bool {
        !self.filter_rules.contains(&relationship.relationship_type)
    }
}

/// Run `query` against `metamodel`.
///
/// Roots are validated before any traversal. Nodes come out in first-visit order: roots as given,
/// then level by level, where each level lists container contents (with `include_children`)
/// and new neighbors in ascending FQN per expanded node. Edges are every admitted relationship
/// between two visited nodes, ordered by (source, target, type).
pub fn execute(metamodel: &Metamodel, query: &Query) -> Result<ViewState, QueryError> {
    if query.root_fqns.is_empty() {
        return Err(QueryError::EmptyRoots);
    }
    let missing: Vec<String> = query
        .root_fqns
        .iter()
        .filter(|fqn| !metamodel.contains(fqn))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(QueryError::UnknownRoot { fqns: missing });
    }

    let mut traversal = Traversal {
        visited: HashSet::new(),
        order: Vec::new(),
    };

    // Every root is emitted before anything reachable from one of them.
    let mut frontier: VecDeque<&CodeUnit> = VecDeque::new();
    for fqn in &query.root_fqns {
        if let Some(unit) = metamodel.lookup(fqn)
            && traversal.visit(unit)
        {
            frontier.push_back(unit);
        }
    }

    let mut distance = 0;
    loop {
        let mut next = VecDeque::new();
        while let Some(unit) = frontier.pop_front() {
            // Container contents join the current level, behind what is already queued.
            if query.include_children && unit.kind().is_container() {
                for child in metamodel.children_of(unit) {
                    if traversal.visit(child) {
                        frontier.push_back(child);
                    }
                }
            }
            if distance < query.depth {
                for (relationship, other) in metamodel.neighbors(&unit.fqn, Direction::Both) {
                    if query.admits(relationship) && traversal.visit(other) {
                        next.push_back(other);
                    }
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
        distance += 1;
    }

    let mut edges: Vec<&Relationship> = metamodel
        .relationships()
        .filter(|r| query.admits(r))
        .filter(|r| {
            traversal.visited.contains(r.source_fqn.as_str())
                && traversal.visited.contains(r.target_fqn.as_str())
        })
        .collect();
    edges.sort();

    tracing::debug!(
        roots = query.root_fqns.len(),
        depth = query.depth,
        nodes = traversal.order.len(),
        edges = edges.len(),
        "query executed"
    );

    Ok(assemble(metamodel, &traversal.order, &edges))
}

/// Private per-query state; nothing here outlives one `execute` call.
struct Traversal<'m> {
    visited: HashSet<&'m str>,
    order: Vec<&'m CodeUnit>,
}

impl<'m> Traversal<'m> {
    /// Record `unit` on first sighting. Returns `false` when it was already seen.
    fn visit(&mut self, unit: &'m CodeUnit) -> bool {
        if !self.visited.insert(unit.fqn.as_str()) {
            return false;
        }
        self.order.push(unit);
        true
    }
}
