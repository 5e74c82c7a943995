use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relationship kind between two code units.
///
/// Declaration order is the tie-break order used when sorting edges.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    // ============ Structural ============
    Inheritance, // Subtype → Supertype

    // ============ Members ============
    Composition, // Owner → owned part (unshared lifetime)
    Association, // Holder → singular reference
    Aggregation, // Holder → collection of references

    // ============ Code ============
    Dependency, // User → used type (calls, annotations, instantiations)
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 5] = [
        RelationshipType::Inheritance,
        RelationshipType::Composition,
        RelationshipType::Association,
        RelationshipType::Aggregation,
        RelationshipType::Dependency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Inheritance => "INHERITANCE",
            RelationshipType::Composition => "COMPOSITION",
            RelationshipType::Association => "ASSOCIATION",
            RelationshipType::Aggregation => "AGGREGATION",
            RelationshipType::Dependency => "DEPENDENCY",
        }
    }

    /// Case-insensitive parse of the wire name (`INHERITANCE`, `dependency`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed, typed edge between two units, stored independently of either endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relationship {
    pub source_fqn: String,
    pub target_fqn: String,
    pub relationship_type: RelationshipType,
}

impl Relationship {
    pub fn new(
        source_fqn: impl Into<String>,
        target_fqn: impl Into<String>,
        relationship_type: RelationshipType,
    ) -> Self {
        Self {
            source_fqn: source_fqn.into(),
            target_fqn: target_fqn.into(),
            relationship_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            RelationshipType::parse("inheritance"),
            Some(RelationshipType::Inheritance)
        );
        assert_eq!(
            RelationshipType::parse(" DEPENDENCY "),
            Some(RelationshipType::Dependency)
        );
        assert_eq!(RelationshipType::parse("uses"), None);
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&RelationshipType::Aggregation).unwrap();
        assert_eq!(json, "\"AGGREGATION\"");
        let back: RelationshipType = serde_json::from_str("\"COMPOSITION\"").unwrap();
        assert_eq!(back, RelationshipType::Composition);
    }
}
