//! 连接池

use std::str::FromStr;
use std::time::{Duration, Instant};

use ditto_errors::{AppError, AppResult};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::error::map_sqlx_error;

/// 连接池参数
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    /// 出现在 `pg_stat_activity.application_name` 中
    pub application_name: Option<String>,
}

impl PoolSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            application_name: None,
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self.min_connections = self.min_connections.min(max);
        self
    }

    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// 解析连接串；格式错误属于配置问题，不是存储故障
    pub fn connect_options(&self) -> AppResult<PgConnectOptions> {
        let options = PgConnectOptions::from_str(&self.url)
            .map_err(|e| AppError::invalid_argument(format!("database url: {}", e)))?;
        Ok(match &self.application_name {
            Some(name) => options.application_name(name),
            None => options,
        })
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
    }
}

/// 建立连接池并完成首个连接
pub async fn create_pool(settings: &PoolSettings) -> AppResult<PgPool> {
    let options = settings.connect_options()?;
    settings
        .pool_options()
        .connect_with(options)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// 往返一次 `SELECT 1`，返回耗时
pub async fn ping(pool: &PgPool) -> AppResult<Duration> {
    let started = Instant::now();
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("ping", e))?;
    Ok(started.elapsed())
}
