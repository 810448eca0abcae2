//! 基础设施资源管理

use std::sync::Arc;

use ditto_adapter_postgres::{PoolSettings, create_pool};
use ditto_auth_core::TokenService;
use ditto_common::{RetryConfig, with_retry};
use ditto_config::AppConfig;
use ditto_errors::AppResult;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

use crate::ShutdownController;

/// 基础设施资源容器
///
/// 由 bootstrap 统一初始化，克隆开销很小，可在服务构建闭包与健康检查之间共享。
#[derive(Clone)]
pub struct Infrastructure {
    config: AppConfig,
    postgres_pool: PgPool,
    token_service: Arc<TokenService>,
    shutdown: ShutdownController,
}

impl Infrastructure {
    /// 从配置创建基础设施资源（带重试）
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let retry_config = RetryConfig::default();

        let pool_settings = PoolSettings::new(config.database.url.expose_secret())
            .with_max_connections(config.database.max_connections)
            .with_application_name(&config.app_name);
        let postgres_pool = with_retry(&retry_config, "PostgreSQL connection", || {
            let settings = pool_settings.clone();
            async move { create_pool(&settings).await }
        })
        .await?;
        info!(
            max_connections = config.database.max_connections,
            "PostgreSQL connection pool created"
        );

        let token_service = Arc::new(TokenService::new(
            config.jwt.secret.expose_secret(),
            config.jwt.expires_in as i64,
            config.jwt.issuer.clone(),
        ));

        Ok(Self::new(config, postgres_pool, token_service))
    }

    /// 由已就绪的资源组装，测试中也使用
    pub fn new(config: AppConfig, postgres_pool: PgPool, token_service: Arc<TokenService>) -> Self {
        Self {
            config,
            postgres_pool,
            token_service,
            shutdown: ShutdownController::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn postgres_pool(&self) -> PgPool {
        self.postgres_pool.clone()
    }

    pub fn token_service(&self) -> Arc<TokenService> {
        Arc::clone(&self.token_service)
    }

    pub fn shutdown(&self) -> &ShutdownController {
        &self.shutdown
    }
}
