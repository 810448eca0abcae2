//! 健康检查模块
//!
//! 提供 /health、/ready、/ping 和 /metrics 端点

use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ditto_adapter_postgres::ping;
use ditto_telemetry::MetricsRecorder;
use serde::Serialize;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// 健康检查状态
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// 数据库往返耗时，仅 /ready 返回
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            message: None,
            latency_ms: None,
        }
    }

    pub fn with_latency(mut self, latency: std::time::Duration) -> Self {
        self.latency_ms = Some(latency.as_millis() as u64);
        self
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: "unhealthy",
            message: Some(message.into()),
            latency_ms: None,
        }
    }
}

#[derive(Clone)]
struct HealthServerState {
    pool: PgPool,
    metrics: Option<MetricsRecorder>,
}

/// HTTP 健康检查服务器
pub struct HealthServer {
    state: HealthServerState,
    port: u16,
}

impl HealthServer {
    pub fn new(pool: PgPool, metrics: Option<MetricsRecorder>, port: u16) -> Self {
        Self {
            state: HealthServerState { pool, metrics },
            port,
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(liveness))
            .route("/ready", get(readiness))
            .route("/ping", get(pong))
            .route("/metrics", get(metrics))
            .with_state(self.state.clone())
    }

    /// 启动 HTTP 服务器，直到 `shutdown` 被取消
    pub async fn serve(self, shutdown: CancellationToken) -> Result<(), std::io::Error> {
        let app = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "Health server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await
    }
}

async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthStatus::healthy()))
}

async fn readiness(State(state): State<HealthServerState>) -> impl IntoResponse {
    match ping(&state.pool).await {
        Ok(latency) => (StatusCode::OK, Json(HealthStatus::healthy().with_latency(latency))),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus::unhealthy(e.to_string())),
        ),
    }
}

async fn pong() -> &'static str {
    "pong"
}

async fn metrics(State(state): State<HealthServerState>) -> impl IntoResponse {
    match &state.metrics {
        Some(recorder) => (StatusCode::OK, recorder.render()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}
