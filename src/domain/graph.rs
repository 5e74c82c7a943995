//! Metamodel - the structural tree plus the relationship set.
//!
//! Construction goes through [`MetamodelBuilder`], the only mutable handle. `finalize()`
//! validates referential integrity and hands out an immutable [`Metamodel`] that can be shared
//! across threads without locking.

use crate::domain::edge::{Relationship, RelationshipType};
use crate::domain::error::ModelError;
use crate::domain::node::{CodeUnit, UnitDetails, UnitId, join_fqn};
use petgraph::Direction as PgDirection;
use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

/// Neighbor direction relative to the queried unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// Mutable, build-phase registry.
#[derive(Debug, Default)]
pub struct MetamodelBuilder {
    graph: DiGraph<CodeUnit, Relationship>,
    fqn_index: HashMap<String, UnitId>,
    pending: Vec<Relationship>,
    seen: HashSet<Relationship>,
}

impl MetamodelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new unit under `parent` (or as a top-level unit).
    ///
    /// Fails with `DuplicateFqn` when the resulting FQN is taken, which also covers
    /// duplicate local names under one parent.
    pub fn register(
        &mut self,
        parent: Option<UnitId>,
        name: &str,
        details: UnitDetails,
    ) -> Result<UnitId, ModelError> {
        let parent_fqn = parent.map(|p| self.graph[p].fqn.clone());
        if name.is_empty() || name.contains('.') {
            return Err(ModelError::InvalidName {
                name: name.to_string(),
                context: parent_fqn.unwrap_or_else(|| "<root>".to_string()),
            });
        }

        let fqn = join_fqn(parent_fqn.as_deref(), name);
        if self.fqn_index.contains_key(&fqn) {
            return Err(ModelError::DuplicateFqn { fqn });
        }

        let id = self.graph.add_node(CodeUnit {
            name: name.to_string(),
            fqn: fqn.clone(),
            parent,
            children: Vec::new(),
            details,
        });
        if let Some(p) = parent {
            self.graph[p].children.push(id);
        }
        self.fqn_index.insert(fqn, id);
        Ok(id)
    }

    /// Queue a relationship. Returns `false` when the same (source, target, type) triple
    /// was already added.
    pub fn add_relationship(&mut self, relationship: Relationship) -> bool {
        if !self.seen.insert(relationship.clone()) {
            return false;
        }
        self.pending.push(relationship);
        true
    }

    pub fn lookup(&self, fqn: &str) -> Option<&CodeUnit> {
        self.fqn_index.get(fqn).map(|&id| &self.graph[id])
    }

    pub fn lookup_id(&self, fqn: &str) -> Option<UnitId> {
        self.fqn_index.get(fqn).copied()
    }

    pub fn unit(&self, id: UnitId) -> &CodeUnit {
        &self.graph[id]
    }

    pub fn units(&self) -> impl Iterator<Item = (UnitId, &CodeUnit)> {
        self.graph
            .node_indices()
            .map(move |idx| (idx, &self.graph[idx]))
    }

    pub fn unit_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Check every queued relationship against the unit index and wire it into the graph.
    ///
    /// Edges are inserted in (source, target, type) order so two builds over the same input
    /// produce identical adjacency.
    pub fn finalize(mut self) -> Result<Metamodel, ModelError> {
        let mut pending = std::mem::take(&mut self.pending);
        pending.sort();

        let mut wired = Vec::with_capacity(pending.len());
        for rel in pending {
            let source = self.fqn_index.get(&rel.source_fqn).copied();
            let target = self.fqn_index.get(&rel.target_fqn).copied();
            match (source, target) {
                (Some(s), Some(t)) => wired.push((s, t, rel)),
                (s, _) => {
                    let missing = if s.is_none() {
                        rel.source_fqn.clone()
                    } else {
                        rel.target_fqn.clone()
                    };
                    return Err(ModelError::DanglingReference {
                        source_fqn: rel.source_fqn,
                        target_fqn: rel.target_fqn,
                        relationship_type: rel.relationship_type.to_string(),
                        missing,
                    });
                }
            }
        }
        for (s, t, rel) in wired {
            self.graph.add_edge(s, t, rel);
        }

        for idx in self.graph.node_indices().collect::<Vec<_>>() {
            let mut children = std::mem::take(&mut self.graph[idx].children);
            children.sort_by(|a, b| self.graph[*a].fqn.cmp(&self.graph[*b].fqn));
            self.graph[idx].children = children;
        }

        Ok(Metamodel {
            graph: self.graph,
            fqn_index: self.fqn_index,
        })
    }
}

/// Finalized, read-only model. All reads are side-effect free.
#[derive(Debug)]
pub struct Metamodel {
    graph: DiGraph<CodeUnit, Relationship>,
    fqn_index: HashMap<String, UnitId>,
}

impl Metamodel {
    pub fn lookup(&self, fqn: &str) -> Option<&CodeUnit> {
        self.fqn_index.get(fqn).map(|&id| &self.graph[id])
    }

    pub fn lookup_id(&self, fqn: &str) -> Option<UnitId> {
        self.fqn_index.get(fqn).copied()
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.fqn_index.contains_key(fqn)
    }

    pub fn unit(&self, id: UnitId) -> &CodeUnit {
        &self.graph[id]
    }

    pub fn parent_of(&self, unit: &CodeUnit) -> Option<&CodeUnit> {
        unit.parent.map(|p| &self.graph[p])
    }

    /// Children in FQN order.
    pub fn children_of<'a>(&'a self, unit: &'a CodeUnit) -> impl Iterator<Item = &'a CodeUnit> {
        unit.children.iter().map(move |&c| &self.graph[c])
    }

    /// Top-level units in FQN order.
    pub fn roots(&self) -> Vec<&CodeUnit> {
        let mut roots: Vec<&CodeUnit> = self
            .graph
            .node_weights()
            .filter(|u| u.parent.is_none())
            .collect();
        roots.sort_by(|a, b| a.fqn.cmp(&b.fqn));
        roots
    }

    pub fn units(&self) -> impl Iterator<Item = &CodeUnit> {
        self.graph.node_weights()
    }

    /// All relationships ordered by (source, target, type).
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.graph.edge_weights()
    }

    pub fn unit_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn relationship_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Relationships touching `fqn` together with the unit on the other end, ordered by
    /// (other FQN, relationship type). Unknown FQNs yield an empty list.
    pub fn neighbors(&self, fqn: &str, direction: Direction) -> Vec<(&Relationship, &CodeUnit)> {
        let Some(&idx) = self.fqn_index.get(fqn) else {
            return Vec::new();
        };

        let mut out: Vec<(&Relationship, &CodeUnit)> = Vec::new();
        if matches!(direction, Direction::Outgoing | Direction::Both) {
            for edge in self.graph.edges_directed(idx, PgDirection::Outgoing) {
                out.push((edge.weight(), &self.graph[edge.target()]));
            }
        }
        if matches!(direction, Direction::Incoming | Direction::Both) {
            for edge in self.graph.edges_directed(idx, PgDirection::Incoming) {
                out.push((edge.weight(), &self.graph[edge.source()]));
            }
        }

        out.sort_by(|(ra, ua), (rb, ub)| {
            ua.fqn
                .cmp(&ub.fqn)
                .then(ra.relationship_type.cmp(&rb.relationship_type))
                .then(ra.source_fqn.cmp(&rb.source_fqn))
        });
        out
    }

    /// Relationships of one type, in (source, target) order.
    pub fn relationships_of_type(
        &self,
        relationship_type: RelationshipType,
    ) -> impl Iterator<Item = &Relationship> {
        self.relationships()
            .filter(move |r| r.relationship_type == relationship_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::{ClassifierKind, UnitKind};

    fn class() -> UnitDetails {
        UnitDetails::Classifier {
            classifier_kind: ClassifierKind::Class,
            is_abstract: false,
        }
    }

    fn sample() -> MetamodelBuilder {
        let mut b = MetamodelBuilder::new();
        let pkg = b.register(None, "pkg", UnitDetails::Package).unwrap();
        b.register(Some(pkg), "A", class()).unwrap();
        b.register(Some(pkg), "B", class()).unwrap();
        b.register(Some(pkg), "C", class()).unwrap();
        b
    }

    #[test]
    fn test_register_builds_fqn_and_links_parent() {
        let b = sample();
        let a = b.lookup("pkg.A").unwrap();
        assert_eq!(a.name, "A");
        let parent = b.unit(a.parent.unwrap());
        assert_eq!(parent.fqn, "pkg");
        assert_eq!(parent.children.len(), 3);
    }

    #[test]
    fn test_register_duplicate_fqn_fails() {
        let mut b = sample();
        let pkg = b.lookup_id("pkg").unwrap();
        let err = b.register(Some(pkg), "A", class()).unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateFqn {
                fqn: "pkg.A".into()
            }
        );
    }

    #[test]
    fn test_register_rejects_dotted_name() {
        let mut b = MetamodelBuilder::new();
        let err = b.register(None, "a.b", UnitDetails::Package).unwrap_err();
        assert!(matches!(err, ModelError::InvalidName { .. }));
        assert!(b.register(None, "", UnitDetails::Package).is_err());
    }

    #[test]
    fn test_add_relationship_dedupes_same_triple() {
        let mut b = sample();
        assert!(b.add_relationship(Relationship::new(
            "pkg.B",
            "pkg.A",
            RelationshipType::Inheritance
        )));
        assert!(!b.add_relationship(Relationship::new(
            "pkg.B",
            "pkg.A",
            RelationshipType::Inheritance
        )));
        assert!(b.add_relationship(Relationship::new(
            "pkg.B",
            "pkg.A",
            RelationshipType::Dependency
        )));
        let model = b.finalize().unwrap();
        assert_eq!(model.relationship_count(), 2);
    }

    #[test]
    fn test_finalize_rejects_dangling_endpoint() {
        let mut b = sample();
        b.add_relationship(Relationship::new(
            "pkg.A",
            "pkg.Missing",
            RelationshipType::Association,
        ));
        match b.finalize().unwrap_err() {
            ModelError::DanglingReference { missing, .. } => assert_eq!(missing, "pkg.Missing"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_neighbors_by_direction() {
        let mut b = sample();
        b.add_relationship(Relationship::new("pkg.B", "pkg.A", RelationshipType::Inheritance));
        b.add_relationship(Relationship::new("pkg.C", "pkg.B", RelationshipType::Dependency));
        let model = b.finalize().unwrap();

        let out: Vec<&str> = model
            .neighbors("pkg.B", Direction::Outgoing)
            .iter()
            .map(|(_, u)| u.fqn.as_str())
            .collect();
        assert_eq!(out, vec!["pkg.A"]);

        let inc: Vec<&str> = model
            .neighbors("pkg.B", Direction::Incoming)
            .iter()
            .map(|(_, u)| u.fqn.as_str())
            .collect();
        assert_eq!(inc, vec!["pkg.C"]);

        let both: Vec<&str> = model
            .neighbors("pkg.B", Direction::Both)
            .iter()
            .map(|(_, u)| u.fqn.as_str())
            .collect();
        assert_eq!(both, vec!["pkg.A", "pkg.C"]);

        assert!(model.neighbors("pkg.Nope", Direction::Both).is_empty());
    }

    #[test]
    fn test_finalized_model_reads() {
        let model = sample().finalize().unwrap();
        assert_eq!(model.unit_count(), 4);
        assert!(model.contains("pkg.C"));
        let roots = model.roots();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].kind(), UnitKind::Package);
        let names: Vec<&str> = model
            .children_of(roots[0])
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        let a = model.lookup("pkg.A").unwrap();
        assert_eq!(model.parent_of(a).unwrap().fqn, "pkg");
    }

    #[test]
    fn test_metamodel_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Metamodel>();
    }
}
