//! Pass 2 - bind syntactic references to registered units and materialize relationships.
//!
//! Lookup order for a name: (1) lexical scopes of the same module, (2) the same package,
//! (3) import bindings (last binding wins), (4) the global FQN index. The first rule that
//! matches decides; an unmatched name becomes an unresolved-reference diagnostic.

use crate::domain::diagnostics::{Diagnostic, ReferenceContext};
use crate::domain::edge::{Relationship, RelationshipType};
use crate::domain::graph::MetamodelBuilder;
use crate::domain::hierarchy::UnitScope;
use crate::domain::namespace::NamespaceScheme;
use crate::domain::node::{UnitId, UnitKind};
use crate::domain::semantic::{
    ImportBinding, MemberNode, Multiplicity, Ownership, SourceLocation, SourceUnit,
};
use std::collections::{HashMap, HashSet};

/// Outcome of resolving one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A classifier.
    Type(String),
    /// A package or module: a real unit, but not a relationship target.
    NotAType(String),
    Unresolved,
}

/// Name-resolution environment at one point of a source unit.
#[derive(Debug, Clone)]
struct Scope {
    /// Candidate prefixes, innermost first, ending with the module context.
    lexical: Vec<String>,
    /// Package owning the module context.
    package: Option<UnitId>,
    /// Local name → absolute target; `None` for a binding that points nowhere.
    imports: HashMap<String, Option<String>>,
}

pub struct ReferenceResolver<'a> {
    model: &'a mut MetamodelBuilder,
    scheme: &'a NamespaceScheme,
    /// Package → top-level classifier name of its modules → FQN.
    package_tables: HashMap<UnitId, HashMap<String, String>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ReferenceResolver<'a> {
    /// Snapshot the per-package symbol tables from the completed pass-1 registry.
    pub fn new(model: &'a mut MetamodelBuilder, scheme: &'a NamespaceScheme) -> Self {
        let mut classifiers: Vec<(UnitId, &str, &str)> = Vec::new();
        for (_, unit) in model.units() {
            if !unit.is_classifier() {
                continue;
            }
            let Some(module_id) = unit.parent else {
                continue;
            };
            let module = model.unit(module_id);
            if module.kind() != UnitKind::Module {
                continue;
            }
            if let Some(package_id) = module.parent {
                classifiers.push((package_id, unit.name.as_str(), unit.fqn.as_str()));
            }
        }
        // Ties resolve to the last binding in FQN order.
        classifiers.sort_by(|a, b| a.2.cmp(b.2));

        let mut package_tables: HashMap<UnitId, HashMap<String, String>> = HashMap::new();
        for (package_id, name, fqn) in classifiers {
            package_tables
                .entry(package_id)
                .or_default()
                .insert(name.to_string(), fqn.to_string());
        }

        Self {
            model,
            scheme,
            package_tables,
            diagnostics: Vec::new(),
        }
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn visit_unit(&mut self, unit: &SourceUnit, scope: &UnitScope) {
        let package = self.package_of(scope.context);
        let base_imports = self.bind_imports(&unit.imports, package, HashMap::new());

        // (source, target) pairs already linked by a declaration-level relationship.
        let mut structural: HashSet<(String, String)> = HashSet::new();

        let mut definitions: Vec<_> = unit.definitions.iter().collect();
        definitions.sort_by_key(|d| d.nesting_depth());
        for def in definitions {
            let local_path = def.local_path();
            let Some(&id) = scope.locals.get(&local_path) else {
                continue;
            };
            let source_fqn = self.model.unit(id).fqn.clone();
            let env = Scope {
                lexical: lexical_chain(&*self.model, id, scope.context),
                package,
                imports: base_imports.clone(),
            };

            for supertype in &def.supertypes {
                let location = located(&def.location, &unit.path);
                if let Some(target) = self.resolve_target(
                    supertype,
                    &env,
                    &source_fqn,
                    &location,
                    ReferenceContext::Supertype,
                ) {
                    self.link(
                        &source_fqn,
                        target,
                        RelationshipType::Inheritance,
                        &mut structural,
                    );
                }
            }

            for member in &def.members {
                self.visit_member(member, &env, &source_fqn, &unit.path, &mut structural);
            }
        }

        for reference in &unit.references {
            let enclosing = enclosing_unit(scope, &reference.enclosing);
            let source_fqn = self.model.unit(enclosing).fqn.clone();
            let env = Scope {
                lexical: lexical_chain(&*self.model, enclosing, scope.context),
                package,
                imports: self.bind_imports(&reference.imports, package, base_imports.clone()),
            };
            let location = located(&reference.location, &unit.path);
            let Some(target) = self.resolve_target(
                &reference.name,
                &env,
                &source_fqn,
                &location,
                ReferenceContext::Code,
            ) else {
                continue;
            };
            if target == source_fqn || structural.contains(&(source_fqn.clone(), target.clone())) {
                continue;
            }
            self.model.add_relationship(Relationship::new(
                source_fqn,
                target,
                RelationshipType::Dependency,
            ));
        }
    }

    fn visit_member(
        &mut self,
        member: &MemberNode,
        env: &Scope,
        source_fqn: &str,
        unit_path: &str,
        structural: &mut HashSet<(String, String)>,
    ) {
        let Some(type_ref) = &member.type_ref else {
            return;
        };
        let location = located(&member.location, unit_path);
        let Some(target) = self.resolve_target(
            &type_ref.name,
            env,
            source_fqn,
            &location,
            ReferenceContext::Member,
        ) else {
            return;
        };

        let relationship_type = match (type_ref.ownership, type_ref.multiplicity) {
            (Ownership::Owned, Multiplicity::Single) => RelationshipType::Composition,
            (Ownership::Owned, Multiplicity::Collection) => {
                self.diagnostics.push(Diagnostic::ambiguous(
                    &type_ref.name,
                    &location,
                    source_fqn,
                    format!(
                        "member '{}' owns a collection of '{}'; classified as COMPOSITION rather than AGGREGATION",
                        member.name, target
                    ),
                ));
                RelationshipType::Composition
            }
            (Ownership::Shared, Multiplicity::Collection) => RelationshipType::Aggregation,
            (Ownership::Shared, Multiplicity::Single) => RelationshipType::Association,
        };
        self.link(source_fqn, target, relationship_type, structural);
    }

    fn link(
        &mut self,
        source_fqn: &str,
        target: String,
        relationship_type: RelationshipType,
        structural: &mut HashSet<(String, String)>,
    ) {
        if target == source_fqn {
            return;
        }
        structural.insert((source_fqn.to_string(), target.clone()));
        self.model.add_relationship(Relationship::new(
            source_fqn,
            target,
            relationship_type,
        ));
    }

    /// Resolve and record a diagnostic when nothing in the project matches.
    fn resolve_target(
        &mut self,
        name: &str,
        env: &Scope,
        enclosing_fqn: &str,
        location: &SourceLocation,
        context: ReferenceContext,
    ) -> Option<String> {
        match self.resolve(name, env) {
            Resolution::Type(fqn) => Some(fqn),
            Resolution::NotAType(fqn) => {
                tracing::debug!(reference = name, resolved = %fqn, "reference names a container, skipped");
                None
            }
            Resolution::Unresolved => {
                self.diagnostics
                    .push(Diagnostic::unresolved(name, location, enclosing_fqn, context));
                None
            }
        }
    }

    fn resolve(&self, name: &str, env: &Scope) -> Resolution {
        let name = name.trim();
        if name.is_empty() {
            return Resolution::Unresolved;
        }
        let (head, tail) = match name.split_once('.') {
            Some((h, t)) => (h, Some(t)),
            None => (name, None),
        };

        // (1) same module, innermost scope first
        for prefix in &env.lexical {
            if let Some(r) = self.classify(&format!("{prefix}.{name}")) {
                return r;
            }
        }

        // (2) same package
        if let Some(package_id) = env.package {
            let package_fqn = &self.model.unit(package_id).fqn;
            if let Some(r) = self.classify(&format!("{package_fqn}.{name}")) {
                return r;
            }
            if let Some(fqn) = self
                .package_tables
                .get(&package_id)
                .and_then(|t| t.get(head))
                && let Some(r) = self.classify(&append(fqn, tail))
            {
                return r;
            }
        }

        // (3) import bindings
        if let Some(binding) = env.imports.get(head) {
            let Some(target) = binding else {
                return Resolution::Unresolved;
            };
            let candidate = append(target, tail);
            return self
                .classify(&candidate)
                .or_else(|| {
                    self.scheme
                        .qualify(&candidate)
                        .and_then(|q| self.classify(&q))
                })
                .unwrap_or(Resolution::Unresolved);
        }

        // (4) fully-qualified
        self.classify(name)
            .or_else(|| self.scheme.qualify(name).and_then(|q| self.classify(&q)))
            .unwrap_or(Resolution::Unresolved)
    }

    fn classify(&self, fqn: &str) -> Option<Resolution> {
        let unit = self.model.lookup(fqn)?;
        Some(if unit.is_classifier() {
            Resolution::Type(unit.fqn.clone())
        } else {
            Resolution::NotAType(unit.fqn.clone())
        })
    }

    /// Package that owns a module context (the context itself for init files).
    fn package_of(&self, context: UnitId) -> Option<UnitId> {
        let unit = self.model.unit(context);
        match unit.kind() {
            UnitKind::Package => Some(context),
            _ => unit.parent,
        }
    }

    /// Layer `bindings` over `base`, in order, so the last binding of a name wins.
    fn bind_imports(
        &self,
        bindings: &[ImportBinding],
        package: Option<UnitId>,
        mut base: HashMap<String, Option<String>>,
    ) -> HashMap<String, Option<String>> {
        for binding in bindings {
            if binding.local_name.is_empty() {
                continue;
            }
            let target = self.absolute_import(&binding.target, package);
            base.insert(binding.local_name.clone(), target);
        }
        base
    }

    fn absolute_import(&self, target: &str, package: Option<UnitId>) -> Option<String> {
        let level = target.chars().take_while(|&c| c == '.').count();
        if level == 0 {
            return Some(target.to_string());
        }
        let rest = &target[level..];

        let mut base = package;
        for _ in 1..level {
            base = base.and_then(|id| self.model.unit(id).parent);
            base?;
        }
        let base_fqn = base.map(|id| self.model.unit(id).fqn.clone());
        match (base_fqn, rest.is_empty()) {
            (Some(b), true) => Some(b),
            (Some(b), false) => Some(format!("{b}.{rest}")),
            (None, false) => Some(rest.to_string()),
            (None, true) => None,
        }
    }
}

/// Innermost registered definition on a reference's enclosing path, else the module context.
fn enclosing_unit(scope: &UnitScope, enclosing: &str) -> UnitId {
    let mut path = enclosing.trim();
    while !path.is_empty() {
        if let Some(&id) = scope.locals.get(path) {
            return id;
        }
        path = match path.rfind('.') {
            Some(pos) => &path[..pos],
            None => "",
        };
    }
    scope.context
}

/// FQNs from `id` up through its registered parents to `context`, innermost first.
/// Follows where pass 1 placed each unit, not the textual enclosing path.
fn lexical_chain(model: &MetamodelBuilder, id: UnitId, context: UnitId) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = Some(id);
    while let Some(unit_id) = current {
        let unit = model.unit(unit_id);
        chain.push(unit.fqn.clone());
        if unit_id == context {
            break;
        }
        current = unit.parent;
    }
    chain
}

fn append(base: &str, tail: Option<&str>) -> String {
    match tail {
        Some(t) => format!("{base}.{t}"),
        None => base.to_string(),
    }
}

fn located(location: &SourceLocation, unit_path: &str) -> SourceLocation {
    if location.path.is_empty() {
        SourceLocation {
            path: unit_path.to_string(),
            ..location.clone()
        }
    } else {
        location.clone()
    }
}
