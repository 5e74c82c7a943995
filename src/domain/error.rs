use thiserror::Error;

/// Build-fatal failures. Any of these aborts construction; no partial model is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("duplicate FQN: '{fqn}' is already registered")]
    DuplicateFqn { fqn: String },

    #[error("dangling relationship {source_fqn} -> {target_fqn} ({relationship_type}): endpoint '{missing}' is not registered")]
    DanglingReference {
        source_fqn: String,
        target_fqn: String,
        relationship_type: String,
        missing: String,
    },

    #[error("invalid unit name '{name}' in '{context}': names must be non-empty and contain no '.'")]
    InvalidName { name: String, context: String },
}

/// Query-time failures. They reject a single query; the model stays usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown root FQN(s): {}", fqns.join(", "))]
    UnknownRoot { fqns: Vec<String> },

    #[error("query must name at least one root FQN")]
    EmptyRoots,
}
