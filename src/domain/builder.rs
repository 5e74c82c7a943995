use crate::domain::diagnostics::{BuildReport, DiagnosticKind};
use crate::domain::error::ModelError;
use crate::domain::graph::{Metamodel, MetamodelBuilder};
use crate::domain::hierarchy::HierarchyBuilder;
use crate::domain::namespace::NamespaceScheme;
use crate::domain::ports::SourceUnitProvider;
use crate::domain::resolver::ReferenceResolver;
use crate::domain::semantic::SourceUnit;
use anyhow::{Context, Result};

/// A finalized metamodel together with what the build noticed along the way.
#[derive(Debug)]
pub struct BuildOutput {
    pub metamodel: Metamodel,
    pub report: BuildReport,
}

/// Model builder - Domain Service driving the two construction passes
pub struct ModelBuilder {
    scheme: NamespaceScheme,
}

impl ModelBuilder {
    pub fn new(scheme: NamespaceScheme) -> Self {
        Self { scheme }
    }

    /// Load every unit from `provider` and build.
    pub fn build(&self, provider: &dyn SourceUnitProvider) -> Result<BuildOutput> {
        let units = provider.load().context("failed to load source units")?;
        self.build_units(units)
            .context("failed to build metamodel")
    }

    /// Two-pass build strategy
    pub fn build_units(&self, mut units: Vec<SourceUnit>) -> Result<BuildOutput, ModelError> {
        // Enumeration order of the provider must not leak into the result.
        units.sort_by(|a, b| a.path.cmp(&b.path));

        let mut model = MetamodelBuilder::new();

        // Pass 1: Hierarchy Registration
        let mut scopes = Vec::with_capacity(units.len());
        {
            let mut hierarchy = HierarchyBuilder::new(&mut model, &self.scheme);
            for unit in &units {
                scopes.push(hierarchy.visit_unit(unit)?);
            }
        }
        tracing::info!(
            source_units = units.len(),
            units = model.unit_count(),
            "hierarchy pass complete"
        );

        // Pass 2: Reference Resolution
        let diagnostics = {
            let mut resolver = ReferenceResolver::new(&mut model, &self.scheme);
            for (unit, scope) in units.iter().zip(&scopes) {
                resolver.visit_unit(unit, scope);
            }
            resolver.into_diagnostics()
        };

        // Pass 3: Finalization
        let metamodel = model.finalize()?;
        let report = BuildReport {
            source_units: units.len(),
            diagnostics,
        };
        tracing::info!(
            units = metamodel.unit_count(),
            relationships = metamodel.relationship_count(),
            unresolved = report.count_of(DiagnosticKind::UnresolvedReference),
            ambiguous = report.count_of(DiagnosticKind::AmbiguousClassification),
            "metamodel finalized"
        );

        Ok(BuildOutput { metamodel, report })
    }
}
