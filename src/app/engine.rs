use crate::adapters::json::JsonUnitProvider;
use crate::app::dto::*;
use crate::app::session::{QueryCommand, QueryHistory};
use crate::domain::builder::{BuildOutput, ModelBuilder};
use crate::domain::diagnostics::{BuildReport, DiagnosticKind};
use crate::domain::edge::RelationshipType;
use crate::domain::error::QueryError;
use crate::domain::graph::{Direction, Metamodel};
use crate::domain::namespace::NamespaceScheme;
use crate::domain::node::{UnitDetails, UnitKind};
use crate::domain::query::{self, Query};
use crate::domain::view::{ViewEdge, ViewState};
use anyhow::{Context as _, Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

/// Stateful facade over one loaded project. Cloning shares the same state.
#[derive(Clone)]
pub struct CartographerEngine {
    inner: Arc<RwLock<EngineData>>,
}

struct EngineData {
    source_path: PathBuf,
    /// Scheme as configured; the effective one may add a root package from the index.
    configured_scheme: NamespaceScheme,
    scheme: NamespaceScheme,
    project_name: String,
    metamodel: Arc<Metamodel>,
    report: Arc<BuildReport>,
}

impl CartographerEngine {
    /// Construct an engine from an already-built metamodel.
    ///
    /// Used for testing or when units come from an in-process front end rather than a file.
    pub fn from_prebuilt(source_path: PathBuf, scheme: NamespaceScheme, output: BuildOutput) -> Self {
        let project_name = project_name_for(&source_path, &scheme, None);
        Self {
            inner: Arc::new(RwLock::new(EngineData {
                source_path,
                configured_scheme: scheme.clone(),
                scheme,
                project_name,
                metamodel: Arc::new(output.metamodel),
                report: Arc::new(output.report),
            })),
        }
    }

    /// Load a syntax index file or directory and build its metamodel.
    pub fn load(source_path: &Path, scheme: NamespaceScheme) -> Result<Self> {
        let data = build_data(source_path, scheme)?;
        Ok(Self {
            inner: Arc::new(RwLock::new(data)),
        })
    }

    /// Rebuild from the same source. The old model keeps serving until the new one is ready.
    pub fn reload(&self) -> Result<HealthResponse> {
        let (path, scheme) = {
            let data = self.read();
            (data.source_path.clone(), data.configured_scheme.clone())
        };
        let fresh = build_data(&path, scheme)?;

        let mut data = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *data = fresh;
        Ok(health_of(&data))
    }

    pub fn health(&self) -> HealthResponse {
        health_of(&self.read())
    }

    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            health: self.health(),
        }
    }

    pub fn project_info(&self) -> ProjectInfo {
        let data = self.read();
        let model = data.metamodel.as_ref();

        let roots = model
            .roots()
            .into_iter()
            .map(|u| UnitSummary {
                fqn: u.fqn.clone(),
                name: u.name.clone(),
                kind: u.kind(),
            })
            .collect();
        let units_by_kind = [UnitKind::Package, UnitKind::Module, UnitKind::Classifier]
            .into_iter()
            .map(|kind| KindCount {
                kind,
                count: model.units().filter(|u| u.kind() == kind).count(),
            })
            .collect();
        let relationships_by_type = RelationshipType::ALL
            .into_iter()
            .map(|kind| KindCount {
                kind,
                count: model.relationships_of_type(kind).count(),
            })
            .collect();

        ProjectInfo {
            project_name: data.project_name.clone(),
            root_package: data.scheme.root_package.clone(),
            source_units: data.report.source_units,
            roots,
            units_by_kind,
            relationships_by_type,
        }
    }

    /// Translate a transport request into a domain query, normalizing root names.
    pub fn to_query(&self, req: &QueryRequest) -> Query {
        let data = self.read();
        Query {
            root_fqns: normalize_roots(&data, &req.roots),
            depth: req.depth,
            filter_rules: req.exclude.iter().copied().collect(),
            include_children: req.include_children,
        }
    }

    pub fn query(&self, req: QueryRequest) -> Result<ViewState, QueryError> {
        let query = self.to_query(&req);
        self.execute(&query)
    }

    /// Run a query without holding the lock during traversal.
    pub fn execute(&self, query: &Query) -> Result<ViewState, QueryError> {
        let metamodel = self.metamodel();
        query::execute(&metamodel, query)
    }

    /// Apply `command` to the session's current query; the history only advances on success.
    pub fn apply_command(
        &self,
        history: &mut QueryHistory,
        command: &QueryCommand,
    ) -> Result<SessionResponse, QueryError> {
        let command = match command {
            QueryCommand::FocusOn { fqn } => QueryCommand::FocusOn {
                fqn: self.normalize_fqn(fqn),
            },
            other => other.clone(),
        };
        let next = command.apply(history.current());
        let view = self.execute(&next)?;
        history.push(next);
        Ok(session_response(history, view))
    }

    /// Re-run the session's current query.
    pub fn session_view(&self, history: &QueryHistory) -> Result<SessionResponse, QueryError> {
        let view = self.execute(history.current())?;
        Ok(session_response(history, view))
    }

    pub fn diagnostics(&self, limit: Option<usize>) -> DiagnosticsResponse {
        let report = self.read().report.clone();
        let items = report
            .diagnostics
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        DiagnosticsResponse {
            total: report.diagnostics.len(),
            unresolved: report.count_of(DiagnosticKind::UnresolvedReference),
            ambiguous: report.count_of(DiagnosticKind::AmbiguousClassification),
            items,
        }
    }

    pub fn unit(&self, fqn: &str) -> Result<UnitResponse> {
        let fqn = self.normalize_fqn(fqn);
        let metamodel = self.metamodel();
        let unit = metamodel
            .lookup(&fqn)
            .ok_or_else(|| anyhow!("Unit not found: {}", fqn))?;

        let (classifier_kind, is_abstract, source_path) = match &unit.details {
            UnitDetails::Classifier {
                classifier_kind,
                is_abstract,
            } => (Some(*classifier_kind), *is_abstract, None),
            UnitDetails::Module { source_path } => (None, false, Some(source_path.clone())),
            UnitDetails::Package => (None, false, None),
        };
        let outgoing = metamodel
            .neighbors(&unit.fqn, Direction::Outgoing)
            .into_iter()
            .map(|(r, _)| ViewEdge::from(r))
            .collect();
        let incoming = metamodel
            .neighbors(&unit.fqn, Direction::Incoming)
            .into_iter()
            .map(|(r, _)| ViewEdge::from(r))
            .collect();

        Ok(UnitResponse {
            fqn: unit.fqn.clone(),
            name: unit.name.clone(),
            kind: unit.kind(),
            parent_fqn: metamodel.parent_of(unit).map(|p| p.fqn.clone()),
            children: metamodel.children_of(unit).map(|c| c.fqn.clone()).collect(),
            classifier_kind,
            is_abstract,
            source_path,
            outgoing,
            incoming,
        })
    }

    /// Every unit in FQN order.
    pub fn units(&self) -> Vec<UnitSummary> {
        let metamodel = self.metamodel();
        let mut units: Vec<UnitSummary> = metamodel
            .units()
            .map(|u| UnitSummary {
                fqn: u.fqn.clone(),
                name: u.name.clone(),
                kind: u.kind(),
            })
            .collect();
        units.sort_by(|a, b| a.fqn.cmp(&b.fqn));
        units
    }

    pub fn metamodel(&self) -> Arc<Metamodel> {
        self.read().metamodel.clone()
    }

    pub fn normalize_fqn(&self, fqn: &str) -> String {
        let data = self.read();
        qualify_root(&data, fqn.trim())
    }

    fn read(&self) -> RwLockReadGuard<'_, EngineData> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

fn build_data(source_path: &Path, configured_scheme: NamespaceScheme) -> Result<EngineData> {
    let provider = JsonUnitProvider::new(source_path);
    let index = provider
        .load_index()
        .with_context(|| format!("Failed to load {}", source_path.display()))?;

    let mut scheme = configured_scheme.clone();
    if scheme.root_package.is_none() {
        scheme.root_package = index.project_name.clone().filter(|n| !n.is_empty());
    }
    let project_name = project_name_for(source_path, &scheme, index.project_name.as_deref());

    let output = ModelBuilder::new(scheme.clone())
        .build_units(index.units)
        .context("Failed to build metamodel")?;

    Ok(EngineData {
        source_path: source_path.to_path_buf(),
        configured_scheme,
        scheme,
        project_name,
        metamodel: Arc::new(output.metamodel),
        report: Arc::new(output.report),
    })
}

fn project_name_for(path: &Path, scheme: &NamespaceScheme, indexed: Option<&str>) -> String {
    scheme
        .root_package
        .clone()
        .or_else(|| indexed.map(String::from))
        .or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().to_string())
        })
        .unwrap_or_default()
}

fn health_of(data: &EngineData) -> HealthResponse {
    HealthResponse {
        source_path: data.source_path.to_string_lossy().to_string(),
        root_package: data.scheme.root_package.clone(),
        unit_count: data.metamodel.unit_count(),
        relationship_count: data.metamodel.relationship_count(),
        diagnostic_count: data.report.diagnostics.len(),
    }
}

fn session_response(history: &QueryHistory, view: ViewState) -> SessionResponse {
    SessionResponse {
        query: history.current().clone(),
        view,
        can_undo: history.can_undo(),
        can_redo: history.can_redo(),
    }
}

/// `.` expands to the root package, or every top-level unit without one.
fn normalize_roots(data: &EngineData, roots: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(roots.len());
    for root in roots {
        let root = root.trim();
        if root == "." {
            match &data.scheme.root_package {
                Some(package) => out.push(package.clone()),
                None => out.extend(data.metamodel.roots().into_iter().map(|u| u.fqn.clone())),
            }
        } else {
            out.push(qualify_root(data, root));
        }
    }
    out
}

fn qualify_root(data: &EngineData, fqn: &str) -> String {
    if data.metamodel.contains(fqn) {
        return fqn.to_string();
    }
    data.scheme.qualify(fqn).unwrap_or_else(|| fqn.to_string())
}
