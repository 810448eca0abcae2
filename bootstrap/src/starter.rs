//! 服务启动器
//!
//! 提供统一的服务启动模式

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use ditto_config::AppConfig;
use ditto_errors::AppResult;
use ditto_telemetry::MetricsRecorder;
use tonic::transport::Server;
use tonic::transport::server::Router;
use tracing::{error, info};

use crate::health::HealthServer;
use crate::infrastructure::Infrastructure;
use crate::runtime::{init_runtime, shutdown_signal};

/// 运行 gRPC 服务
///
/// 所有服务的统一入口：加载配置、初始化日志与指标、建立带重试的数据库连接、
/// 启动健康检查端口，然后由 `build` 在预配置的 [`Server`] 上注册服务。
/// 收到 SIGINT/SIGTERM 后停止接收新请求，并取消所有进行中请求的上下文。
///
/// # 示例
///
/// ```ignore
/// use ditto_bootstrap::run_server;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     run_server("config", |infra, mut server| async move {
///         let service = MyServiceImpl::new(infra.postgres_pool());
///         Ok(server.add_service(MyServiceServer::new(service)))
///     })
///     .await
/// }
/// ```
pub async fn run_server<F, Fut>(config_dir: &str, build: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(Infrastructure, Server) -> Fut,
    Fut: Future<Output = AppResult<Router>>,
{
    let config = AppConfig::load(config_dir)?;
    init_runtime(&config);
    info!("Starting {} service", config.app_name);

    let metrics = MetricsRecorder::install()?;
    let infra = Infrastructure::from_config(config.clone()).await?;
    let shutdown = infra.shutdown().clone();

    let health_server = HealthServer::new(
        infra.postgres_pool(),
        Some(metrics),
        config.server.health_port(),
    );
    let health_token = shutdown.token().clone();
    let health_handle = tokio::spawn(async move {
        if let Err(e) = health_server.serve(health_token).await {
            error!("Health server error: {}", e);
        }
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let server = Server::builder()
        .http2_keepalive_interval(Some(Duration::from_secs(config.server.keep_alive_time)))
        .http2_keepalive_timeout(Some(Duration::from_secs(config.server.keep_alive_timeout)));
    let router = build(infra, server).await?;

    let signal_controller = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_controller.shutdown();
    });

    info!(%addr, "gRPC server starting");
    router.serve_with_shutdown(addr, shutdown.wait()).await?;

    shutdown.shutdown();
    if let Err(e) = health_handle.await {
        error!("Health server task failed: {}", e);
    }

    info!("Service stopped");
    Ok(())
}
