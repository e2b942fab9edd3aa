//! HTTP relay: any request whose body is valid JSON is forwarded verbatim to the chat
//! webhook and the webhook's answer is passed back.

use crate::config::{self, Config};
use crate::gateway::{GatewayClient, GatewayError};
use crate::raw::correlation_id;
use anyhow::{Context, Result};
use axum::{body::Bytes, extract::State, http::StatusCode, Router};
use std::sync::Arc;

/// Shared state for the relay handler.
#[derive(Clone)]
pub struct RelayState {
    pub webhook: Arc<GatewayClient>,
}

pub fn router(state: RelayState) -> Router {
    Router::new().fallback(forward).with_state(state)
}

/// Bind the configured socket and serve until SIGINT/SIGTERM.
pub async fn run_relay(config: &Config) -> Result<()> {
    let Some(post_url) = config::resolve_relay_post_url(config) else {
        anyhow::bail!("no webhook URL configured (set relay.postUrl or SLACK_GW_URL)");
    };
    let webhook = GatewayClient::new(post_url, config.relay.timeout())
        .context("building webhook client")?;
    log::info!("slack url   : {}", webhook.url());
    log::info!("listening on: {}", config.relay.listen);

    let listener = tokio::net::TcpListener::bind(&config.relay.listen)
        .await
        .with_context(|| format!("binding to {}", config.relay.listen))?;
    let app = router(RelayState {
        webhook: Arc::new(webhook),
    });
    log::info!("CTRL+C or SIGTERM to stop service");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("relay server exited")?;
    log::info!("relay stopped");
    Ok(())
}

async fn forward(State(state): State<RelayState>, body: Bytes) -> (StatusCode, String) {
    let rid = correlation_id();
    if serde_json::from_slice::<serde::de::IgnoredAny>(&body).is_err() {
        log::info!("[{}] body: {}", rid, String::from_utf8_lossy(&body));
        return request_error(&rid, StatusCode::BAD_REQUEST, "Unable to parse JSON".to_string());
    }
    let payload = String::from_utf8_lossy(&body).into_owned();
    log::info!("[{}] sending: {}", rid, payload);
    match state.webhook.post(payload).await {
        Ok(resp) => {
            log::info!("[{}] {}", rid, resp);
            (StatusCode::OK, resp)
        }
        Err(e) => request_error(&rid, StatusCode::BAD_GATEWAY, format!("slack resp: {}", upstream_reason(&e))),
    }
}

fn request_error(rid: &str, code: StatusCode, message: String) -> (StatusCode, String) {
    log::warn!("[{}] {} - {}", rid, code.as_u16(), message);
    (code, message)
}

/// Status line and body for upstream rejections, status line and read error when the
/// body was lost, the error text otherwise.
fn upstream_reason(e: &GatewayError) -> String {
    match e {
        GatewayError::Status { status, body } => format!("{} - {}", status, body),
        GatewayError::Body { .. } | GatewayError::Transport(_) => e.to_string(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
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
    log::info!("shutdown signal received, draining connections");
}
