use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::gateway;
use crate::infra::mcp::GeminiMcpSvc;
use crate::infra::runtime::mcp_transport::{make_streamable_http_service, LocalSessionManager};
use crate::tools::ToolHost;

/// REST gateway under `/api` plus the streamable MCP transport under `/mcp`,
/// both answering from the same `ToolHost`.
pub fn build_app(host: ToolHost) -> Router {
    let session_mgr = Arc::new(LocalSessionManager::default());
    let mcp_service = make_streamable_http_service(GeminiMcpSvc::new(host.clone()), session_mgr);

    Router::new()
        .route("/api/ping", get(gateway::ping))
        .route("/api/mcp/tools", get(gateway::list_tools))
        .route("/api/mcp/resources", get(gateway::list_resources))
        .route("/api/mcp/prompts", get(gateway::list_prompts))
        .route("/api/mcp/tools/call", post(gateway::call_tool))
        .nest_service("/mcp", mcp_service)
        .with_state(host)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::store::InMemoryProfileStore;
    use crate::tools::testing::StubModel;
    use axum::body::{to_bytes, Body};
    use hyper::{Request, StatusCode};
    use serde_json::{json, Value as J};
    use tower::ServiceExt;

    fn app() -> Router {
        let host = crate::tools::build_tool_host(
            Arc::new(StubModel::replying("ok")),
            Arc::new(InMemoryProfileStore::seeded()),
            "test",
        )
        .unwrap();
        build_app(host)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, J) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn resources_list_static_and_templated() {
        let (status, v) = get_json(app(), "/api/mcp/resources").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["resources"][0]["uri"], "config://app");
        assert_eq!(v["resources"][1]["uriTemplate"], "users://{user_id}/profile");
    }

    #[tokio::test]
    async fn prompts_are_listed() {
        let (status, v) = get_json(app(), "/api/mcp/prompts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["prompts"][0]["name"], "analyze_data");
        assert_eq!(v["prompts"][0]["arguments"][0], json!({
            "name": "data",
            "description": "The data to analyze",
            "required": true
        }));
    }

    #[tokio::test]
    async fn ping_through_full_stack() {
        let (status, v) = get_json(app(), "/api/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["status"], "ok");
    }

    #[tokio::test]
    async fn cors_preflight_is_allowed() {
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/mcp/tools/call")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert!(resp.status().is_success());
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let req = Request::builder().uri("/api/nope").body(Body::empty()).unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
