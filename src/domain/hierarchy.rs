//! Pass 1 - discover every structural unit and register it. No name resolution happens here.

use crate::domain::error::ModelError;
use crate::domain::graph::MetamodelBuilder;
use crate::domain::namespace::NamespaceScheme;
use crate::domain::node::{UnitDetails, UnitId, UnitKind, join_fqn};
use crate::domain::semantic::SourceUnit;
use std::collections::HashMap;

/// What pass 1 learned about one source unit; pass 2 resolves against it.
#[derive(Debug, Clone)]
pub struct UnitScope {
    /// Unit hosting the file's top-level definitions (module, or package for init files).
    pub context: UnitId,
    /// Unit-local definition path (`Outer.Inner`) → registered classifier.
    pub locals: HashMap<String, UnitId>,
}

pub struct HierarchyBuilder<'a> {
    model: &'a mut MetamodelBuilder,
    scheme: &'a NamespaceScheme,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(model: &'a mut MetamodelBuilder, scheme: &'a NamespaceScheme) -> Self {
        Self { model, scheme }
    }

    pub fn visit_unit(&mut self, unit: &SourceUnit) -> Result<UnitScope, ModelError> {
        let module_path = self.scheme.module_path(&unit.path);

        let mut parent: Option<UnitId> = None;
        for package in &module_path.packages {
            parent = Some(self.ensure_package(parent, package)?);
        }

        let context = match (&module_path.module, parent) {
            (Some(module), parent) => self.model.register(
                parent,
                module,
                UnitDetails::Module {
                    source_path: unit.path.clone(),
                },
            )?,
            (None, Some(package)) => package,
            (None, None) => {
                return Err(ModelError::InvalidName {
                    name: unit.path.clone(),
                    context: "<root>".to_string(),
                });
            }
        };

        // Parents before children, source order otherwise.
        let mut order: Vec<usize> = (0..unit.definitions.len()).collect();
        order.sort_by_key(|&i| unit.definitions[i].nesting_depth());

        let mut locals: HashMap<String, UnitId> = HashMap::new();
        for i in order {
            let def = &unit.definitions[i];
            let parent = match def.enclosing.as_deref().filter(|e| !e.is_empty()) {
                None => context,
                Some(enclosing) => match locals.get(enclosing) {
                    Some(&id) => id,
                    None => {
                        tracing::warn!(
                            path = %unit.path,
                            definition = %def.name,
                            enclosing,
                            "enclosing definition not found; attaching to module"
                        );
                        context
                    }
                },
            };

            let id = self.model.register(
                Some(parent),
                &def.name,
                UnitDetails::Classifier {
                    classifier_kind: def.kind,
                    is_abstract: def.is_abstract,
                },
            )?;
            locals.insert(def.local_path(), id);
        }

        Ok(UnitScope { context, locals })
    }

    /// Packages are shared by every file below them, so they are created on first sight.
    fn ensure_package(&mut self, parent: Option<UnitId>, name: &str) -> Result<UnitId, ModelError> {
        let parent_fqn = parent.map(|p| self.model.unit(p).fqn.clone());
        let fqn = join_fqn(parent_fqn.as_deref(), name);
        if let Some(id) = self.model.lookup_id(&fqn) {
            return match self.model.unit(id).kind() {
                UnitKind::Package => Ok(id),
                _ => Err(ModelError::DuplicateFqn { fqn }),
            };
        }
        self.model.register(parent, name, UnitDetails::Package)
    }
}
