use std::net::SocketAddr;
use std::sync::Arc;

use crate::clients::gemini::GeminiClient;
use crate::infra::config::Config;
use crate::infra::mcp::GeminiMcpSvc;
use crate::infra::store::InMemoryProfileStore;
use crate::tools::{build_tool_host, ToolHost};

/// Assemble the tool host from configuration. A missing API key is not
/// fatal here; model-backed tools fail per call instead.
pub fn build_host(cfg: &Config) -> anyhow::Result<ToolHost> {
    if cfg.gemini.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; model-backed tools will fail");
    }
    let model = GeminiClient::from_config(&cfg.gemini)?;
    let profiles = InMemoryProfileStore::seeded();
    let host = build_tool_host(Arc::new(model), Arc::new(profiles), cfg.environment.clone())?;
    Ok(host)
}

pub async fn run_server() -> anyhow::Result<()> {
    let cfg = Config::from_env_and_toml()?;
    tracing::info!(
        mode = %cfg.mode,
        host = %cfg.host,
        port = cfg.port,
        environment = %cfg.environment,
        model = %cfg.gemini.model,
        "BOOT gemini-mcp-gateway"
    );

    let host = build_host(&cfg)?;

    if cfg.mode == "stdio" {
        crate::infra::runtime::mcp_transport::serve_stdio(GeminiMcpSvc::new(host))
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(());
    }

    let app = crate::infra::http_app::build_app(host);
    let addr = SocketAddr::new(cfg.host, cfg.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
