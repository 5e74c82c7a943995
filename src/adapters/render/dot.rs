use crate::domain::edge::RelationshipType;
use crate::domain::node::UnitKind;
use crate::domain::ports::ViewRenderer;
use crate::domain::view::ViewState;
use anyhow::Result;
use std::fmt::Write as _;

/// Graphviz DOT source; turning it into an image is left to `dot` itself.
pub struct DotRenderer;

fn edge_style(relationship_type: RelationshipType) -> &'static str {
    match relationship_type {
        RelationshipType::Inheritance => "arrowhead=empty, dir=back",
        RelationshipType::Composition => "arrowhead=diamond, style=dashed",
        RelationshipType::Aggregation => "arrowhead=odiamond, style=dashed",
        RelationshipType::Association => "arrowhead=vee, style=dotted",
        RelationshipType::Dependency => "arrowhead=normal, style=dashed",
    }
}

fn fill_color(kind: UnitKind) -> &'static str {
    match kind {
        UnitKind::Package => "#E6F2FA",
        UnitKind::Module => "#F5F5F5",
        UnitKind::Classifier => "#FFFFFF",
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl ViewRenderer for DotRenderer {
    fn name(&self) -> &'static str {
        "dot"
    }

    fn render(&self, view: &ViewState) -> Result<String> {
        let mut out = String::new();
        writeln!(out, "digraph cartographer {{")?;
        writeln!(out, "    graph [rankdir=TB, splines=ortho];")?;
        writeln!(out, "    node [shape=box, style=filled];")?;

        for node in &view.nodes {
            writeln!(
                out,
                "    {} [label={}, fillcolor={}];",
                quote(&node.fqn),
                quote(&node.name),
                quote(fill_color(node.kind))
            )?;
        }
        for edge in &view.edges {
            writeln!(
                out,
                "    {} -> {} [{}];",
                quote(&edge.source_fqn),
                quote(&edge.target_fqn),
                edge_style(edge.relationship_type)
            )?;
        }

        writeln!(out, "}}")?;
        Ok(out)
    }
}
