//! Interactive exploration state: a query plus undo/redo over the commands that changed it.

use crate::domain::edge::RelationshipType;
use crate::domain::query::Query;
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One user action on the current query. Applying a command never mutates its input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum QueryCommand {
    /// Replace the roots with a single unit.
    FocusOn { fqn: String },
    ChangeDepth { depth: u32 },
    ExcludeType { relationship_type: RelationshipType },
    IncludeType { relationship_type: RelationshipType },
    ToggleChildren,
}

impl QueryCommand {
    pub fn apply(&self, current: &Query) -> Query {
        let mut next = current.clone();
        match self {
            QueryCommand::FocusOn { fqn } => next.root_fqns = vec![fqn.clone()],
            QueryCommand::ChangeDepth { depth } => next.depth = *depth,
            QueryCommand::ExcludeType { relationship_type } => {
                next.filter_rules.insert(*relationship_type);
            }
            QueryCommand::IncludeType { relationship_type } => {
                next.filter_rules.remove(relationship_type);
            }
            QueryCommand::ToggleChildren => next.include_children = !next.include_children,
        }
        next
    }
}

/// Linear history of queries with a cursor. Recording after an undo drops the redo tail.
#[derive(Debug, Clone)]
pub struct QueryHistory {
    entries: Vec<Query>,
    cursor: usize,
}

impl QueryHistory {
    pub fn new(initial: Query) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &Query {
        &self.entries[self.cursor]
    }

    /// Record `query` as the new current state.
    pub fn push(&mut self, query: Query) -> &Query {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(query);
        self.cursor = self.entries.len() - 1;
        self.current()
    }

    pub fn execute(&mut self, command: &QueryCommand) -> &Query {
        let next = command.apply(self.current());
        self.push(next)
    }

    pub fn undo(&mut self) -> Option<&Query> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn redo(&mut self) -> Option<&Query> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_do_not_touch_input() {
        let q = Query::new(["pkg.A"]);
        let next = QueryCommand::ExcludeType {
            relationship_type: RelationshipType::Dependency,
        }
        .apply(&q);
        assert!(q.filter_rules.is_empty());
        assert!(next.filter_rules.contains(&RelationshipType::Dependency));

        let back = QueryCommand::IncludeType {
            relationship_type: RelationshipType::Dependency,
        }
        .apply(&next);
        assert!(back.filter_rules.is_empty());
    }

    #[test]
    fn test_undo_redo_and_truncation() {
        let mut h = QueryHistory::new(Query::new(["pkg.A"]));
        h.execute(&QueryCommand::ChangeDepth { depth: 3 });
        h.execute(&QueryCommand::FocusOn { fqn: "pkg.B".into() });
        assert_eq!(h.current().root_fqns, vec!["pkg.B"]);

        assert_eq!(h.undo().unwrap().root_fqns, vec!["pkg.A"]);
        assert_eq!(h.current().depth, 3);
        assert_eq!(h.undo().unwrap().depth, 1);
        assert!(h.undo().is_none());

        assert_eq!(h.redo().unwrap().depth, 3);
        h.execute(&QueryCommand::ToggleChildren);
        assert!(!h.can_redo());
        assert_eq!(h.len(), 3);
        assert!(h.current().include_children);
    }

    #[test]
    fn test_command_wire_format() {
        let cmd: QueryCommand =
            serde_json::from_str(r#"{"command": "exclude_type", "relationship_type": "DEPENDENCY"}"#)
                .unwrap();
        assert_eq!(
            cmd,
            QueryCommand::ExcludeType {
                relationship_type: RelationshipType::Dependency
            }
        );
    }
}
