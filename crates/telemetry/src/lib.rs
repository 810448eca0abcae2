//! telemetry - 可观测性库
//!
//! 日志与指标都在启动时显式初始化一次，之后通过 `metrics` 门面记录。

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to install Prometheus recorder: {0}")]
    Recorder(String),
}

/// 初始化 tracing
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// 初始化 JSON 格式的 tracing（生产环境）
pub fn init_tracing_json(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init();
}

/// Prometheus 指标记录器
///
/// 必须在第一次记录指标之前创建；进程内只能安装一次。
#[derive(Clone)]
pub struct MetricsRecorder {
    handle: PrometheusHandle,
}

impl MetricsRecorder {
    pub fn install() -> Result<Self, TelemetryError> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| TelemetryError::Recorder(e.to_string()))?;
        Ok(Self { handle })
    }

    /// Prometheus 文本格式
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// 记录一次 gRPC 调用
pub fn record_grpc_request(service: &'static str, method: &'static str, status: &str, elapsed: Duration) {
    let labels = [
        ("service", service.to_string()),
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];

    counter!("grpc_requests_total", &labels).increment(1);
    histogram!("grpc_request_duration_ms", &labels).record(elapsed.as_secs_f64() * 1000.0);
}

/// 记录业务计数器
pub fn record_outcome(name: &'static str, success: bool) {
    let metric = if success {
        format!("{}_success_total", name)
    } else {
        format!("{}_failure_total", name)
    };
    counter!(metric).increment(1);
}
