use crate::app::dto::*;
use crate::app::engine::CartographerEngine;
use crate::domain::view::ViewState;
use rmcp::{
    Json, ServerHandler, ServiceExt, handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters, model::*, tool, tool_handler, tool_router,
    transport::stdio,
};
use tokio::task::spawn_blocking;

#[derive(Clone)]
pub struct CartographerMcpServer {
    engine: CartographerEngine,
    tool_router: ToolRouter<Self>,
}

impl CartographerMcpServer {
    pub fn new(engine: CartographerEngine) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }

    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        let service = self.serve(stdio()).await?;
        service.waiting().await?;
        Ok(())
    }
}

#[tool_router]
impl CartographerMcpServer {
    #[tool(
        description = "Return the structural view around root units: nodes within `depth` relationship hops and the relationships between them."
    )]
    async fn query_view(&self, params: Parameters<QueryRequest>) -> Result<Json<ViewState>, String> {
        let engine = self.engine.clone();
        let req = params.0;
        spawn_blocking(move || engine.query(req))
            .await
            .map_err(|e| format!("task join error: {e}"))?
            .map(Json)
            .map_err(|e| e.to_string())
    }

    #[tool(description = "Summarize the loaded project: top-level units and counts by kind.")]
    async fn project_info(&self) -> Result<Json<ProjectInfo>, String> {
        let engine = self.engine.clone();
        spawn_blocking(move || engine.project_info())
            .await
            .map(Json)
            .map_err(|e| format!("task join error: {e}"))
    }

    #[tool(description = "Look up one unit by FQN with its children and relationships.")]
    async fn lookup_unit(
        &self,
        params: Parameters<LookupUnitParams>,
    ) -> Result<Json<UnitResponse>, String> {
        let engine = self.engine.clone();
        let fqn = params.0.fqn;
        spawn_blocking(move || engine.unit(&fqn))
            .await
            .map_err(|e| format!("task join error: {e}"))?
            .map(Json)
            .map_err(|e| e.to_string())
    }

    #[tool(description = "List references that could not be resolved and other build findings.")]
    async fn list_diagnostics(
        &self,
        params: Parameters<DiagnosticsRequest>,
    ) -> Result<Json<DiagnosticsResponse>, String> {
        let engine = self.engine.clone();
        let limit = params.0.limit;
        spawn_blocking(move || engine.diagnostics(limit))
            .await
            .map(Json)
            .map_err(|e| format!("task join error: {e}"))
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, rmcp::schemars::JsonSchema)]
pub struct LookupUnitParams {
    pub fqn: String,
}

#[tool_handler]
impl ServerHandler for CartographerMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Explore the package/module/class structure of a codebase and the typed relationships between its classes."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
