use crate::app::dto::*;
use crate::app::engine::CartographerEngine;
use crate::app::session::{QueryCommand, QueryHistory};
use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::spawn_blocking;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct HttpState {
    pub engine: CartographerEngine,
    /// Single interactive exploration session shared by all clients of this server.
    pub session: Arc<Mutex<Option<QueryHistory>>>,
}

#[derive(Debug, Clone, Deserialize)]
struct DiagnosticsQuery {
    limit: Option<usize>,
}

#[derive(Debug, Clone, serde::Serialize)]
struct ApiErrorBody {
    error: String,
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> impl IntoResponse {
    (status, Json(ApiErrorBody { error: msg.into() }))
}

fn join_error(e: tokio::task::JoinError) -> axum::response::Response {
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("task join error: {e}"),
    )
    .into_response()
}

pub fn build_router(engine: CartographerEngine) -> Router {
    let state = Arc::new(HttpState {
        engine,
        session: Arc::new(Mutex::new(None)),
    });

    Router::new()
        .route("/health", get(health))
        .route("/reload", post(reload))
        .route("/api/v1/status", get(status))
        .route("/api/v1/project-info", get(project_info))
        .route("/api/v1/query", post(query))
        .route("/api/v1/units/{fqn}", get(unit))
        .route("/api/v1/diagnostics", get(diagnostics))
        .route("/api/v1/session", post(session_start).get(session_current))
        .route("/api/v1/session/command", post(session_command))
        .route("/api/v1/session/undo", post(session_undo))
        .route("/api/v1/session/redo", post(session_redo))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(engine: CartographerEngine, addr: SocketAddr) -> Result<()> {
    let app = build_router(engine);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(state.engine.health())
}

async fn status(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(state.engine.status())
}

async fn project_info(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.project_info()).await {
        Ok(res) => Json(res).into_response(),
        Err(e) => join_error(e),
    }
}

async fn reload(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.reload()).await {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => {
            api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")).into_response()
        }
        Err(e) => join_error(e),
    }
}

async fn query(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<QueryRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.query(req)).await {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => api_error(StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        Err(e) => join_error(e),
    }
}

async fn unit(State(state): State<Arc<HttpState>>, Path(fqn): Path<String>) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.unit(&fqn)).await {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => api_error(StatusCode::NOT_FOUND, e.to_string()).into_response(),
        Err(e) => join_error(e),
    }
}

async fn diagnostics(
    State(state): State<Arc<HttpState>>,
    Query(q): Query<DiagnosticsQuery>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.diagnostics(q.limit)).await {
        Ok(res) => Json(res).into_response(),
        Err(e) => join_error(e),
    }
}

// ============ Session ============

async fn session_start(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<QueryRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    let session = state.session.clone();
    match spawn_blocking(move || {
        let history = QueryHistory::new(engine.to_query(&req));
        let res = engine.session_view(&history)?;
        *session.lock().unwrap_or_else(PoisonError::into_inner) = Some(history);
        Ok::<_, crate::domain::error::QueryError>(res)
    })
    .await
    {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => api_error(StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        Err(e) => join_error(e),
    }
}

async fn session_current(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    with_session(state, |engine, history| engine.session_view(history)).await
}

async fn session_command(
    State(state): State<Arc<HttpState>>,
    Json(command): Json<QueryCommand>,
) -> impl IntoResponse {
    with_session(state, move |engine, history| {
        engine.apply_command(history, &command)
    })
    .await
}

async fn session_undo(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    with_session(state, |engine, history| {
        history.undo();
        engine.session_view(history)
    })
    .await
}

async fn session_redo(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    with_session(state, |engine, history| {
        history.redo();
        engine.session_view(history)
    })
    .await
}

/// Run `f` against the active session; 409 when none was started.
async fn with_session<F>(state: Arc<HttpState>, f: F) -> axum::response::Response
where
    F: FnOnce(
            &CartographerEngine,
            &mut QueryHistory,
        ) -> Result<SessionResponse, crate::domain::error::QueryError>
        + Send
        + 'static,
{
    let engine = state.engine.clone();
    let session = state.session.clone();
    match spawn_blocking(move || {
        let mut guard = session.lock().unwrap_or_else(PoisonError::into_inner);
        guard.as_mut().map(|history| f(&engine, history))
    })
    .await
    {
        Ok(Some(Ok(res))) => Json(res).into_response(),
        Ok(Some(Err(e))) => api_error(StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        Ok(None) => api_error(StatusCode::CONFLICT, "no active session").into_response(),
        Err(e) => join_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::ModelBuilder;
    use crate::domain::namespace::NamespaceScheme;
    use crate::domain::semantic::{DefinitionNode, SourceUnit};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn make_engine() -> CartographerEngine {
        let units = vec![SourceUnit {
            path: "pkg.py".into(),
            definitions: vec![
                DefinitionNode {
                    name: "A".into(),
                    ..Default::default()
                },
                DefinitionNode {
                    name: "B".into(),
                    supertypes: vec!["A".into()],
                    ..Default::default()
                },
            ],
            ..Default::default()
        }];
        let scheme = NamespaceScheme::default();
        let output = ModelBuilder::new(scheme.clone()).build_units(units).unwrap();
        CartographerEngine::from_prebuilt("index.json".into(), scheme, output)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_http_health_and_query() {
        let app = build_router(make_engine());

        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app
            .oneshot(post_json(
                "/api/v1/query",
                serde_json::json!({"roots": ["pkg.B"], "depth": 1}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["nodes"][0]["fqn"], "pkg.B");
        assert_eq!(body["nodes"][1]["fqn"], "pkg.A");
        assert_eq!(body["edges"][0]["relationship_type"], "INHERITANCE");
    }

    #[tokio::test]
    async fn test_http_unknown_root_is_bad_request() {
        let app = build_router(make_engine());
        let res = app
            .oneshot(post_json(
                "/api/v1/query",
                serde_json::json!({"roots": ["pkg.Nope"]}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_http_unit_lookup() {
        let app = build_router(make_engine());
        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/units/pkg.B")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["parent_fqn"], "pkg");

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/units/pkg.Zed")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_http_session_flow() {
        let app = build_router(make_engine());

        let res = app
            .clone()
            .oneshot(post_json("/api/v1/session/undo", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let res = app
            .clone()
            .oneshot(post_json(
                "/api/v1/session",
                serde_json::json!({"roots": ["pkg.B"], "depth": 0}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["view"]["nodes"].as_array().unwrap().len(), 1);

        let res = app
            .clone()
            .oneshot(post_json(
                "/api/v1/session/command",
                serde_json::json!({"command": "change_depth", "depth": 1}),
            ))
            .await
            .unwrap();
        let body = body_json(res).await;
        assert_eq!(body["view"]["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(body["can_undo"], true);

        let res = app
            .oneshot(post_json("/api/v1/session/undo", serde_json::json!({})))
            .await
            .unwrap();
        let body = body_json(res).await;
        assert_eq!(body["query"]["depth"], 0);
        assert_eq!(body["can_redo"], true);
    }
}
