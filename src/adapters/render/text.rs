use crate::domain::edge::RelationshipType;
use crate::domain::ports::ViewRenderer;
use crate::domain::view::{ViewEdge, ViewNode, ViewState};
use anyhow::Result;
use std::collections::{HashMap, HashSet};

/// Containment tree with each node's outgoing relationships listed under it.
pub struct TextRenderer;

fn marker(relationship_type: RelationshipType) -> char {
    match relationship_type {
        RelationshipType::Inheritance => 'I',
        RelationshipType::Composition => 'C',
        RelationshipType::Aggregation => 'A',
        RelationshipType::Association => 'S',
        RelationshipType::Dependency => 'D',
    }
}

struct Tree<'v> {
    children: HashMap<&'v str, Vec<&'v ViewNode>>,
    edges: HashMap<&'v str, Vec<&'v ViewEdge>>,
}

impl ViewRenderer for TextRenderer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn render(&self, view: &ViewState) -> Result<String> {
        if view.nodes.is_empty() {
            return Ok(String::new());
        }

        let present: HashSet<&str> = view.nodes.iter().map(|n| n.fqn.as_str()).collect();
        let mut tree = Tree {
            children: HashMap::new(),
            edges: HashMap::new(),
        };
        let mut roots = Vec::new();
        for node in &view.nodes {
            match node.parent_fqn.as_deref().filter(|p| present.contains(p)) {
                Some(parent) => tree.children.entry(parent).or_default().push(node),
                None => roots.push(node),
            }
        }
        for edge in &view.edges {
            tree.edges
                .entry(edge.source_fqn.as_str())
                .or_default()
                .push(edge);
        }

        roots.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.fqn.cmp(&b.fqn)));
        for children in tree.children.values_mut() {
            children.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.fqn.cmp(&b.fqn)));
        }
        for edges in tree.edges.values_mut() {
            edges.sort_by(|a, b| {
                a.target_fqn
                    .cmp(&b.target_fqn)
                    .then(a.relationship_type.cmp(&b.relationship_type))
            });
        }

        let mut out = String::new();
        for (i, root) in roots.iter().enumerate() {
            render_node(root, "", i + 1 == roots.len(), &tree, &mut out);
        }
        Ok(out)
    }
}

fn render_node(node: &ViewNode, prefix: &str, is_last: bool, tree: &Tree<'_>, out: &mut String) {
    let connector = if is_last { "└── " } else { "├── " };
    out.push_str(&format!("{prefix}{connector}{}\n", node.name));

    let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
    if let Some(edges) = tree.edges.get(node.fqn.as_str()) {
        for edge in edges {
            out.push_str(&format!(
                "{child_prefix}[{}] -> {}\n",
                marker(edge.relationship_type),
                edge.target_fqn
            ));
        }
    }

    if let Some(children) = tree.children.get(node.fqn.as_str()) {
        for (i, child) in children.iter().enumerate() {
            render_node(child, &child_prefix, i + 1 == children.len(), tree, out);
        }
    }
}
