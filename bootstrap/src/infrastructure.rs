//! 基础设施资源管理
//!
//! 按配置装配存储适配器、Token 服务和密码哈希器

use std::sync::Arc;

use secrecy::ExposeSecret;
use tasker_adapter_memory::{InMemoryAccountRepository, InMemoryTaskRepository};
use tasker_adapter_postgres::{
    MigrationManager, PostgresAccountRepository, PostgresConfig, PostgresTaskRepository,
    check_connection, create_pool, migrations,
};
use tasker_auth_core::{CredentialHasher, HashingCost, TokenService};
use tasker_common::TimeoutPolicy;
use tasker_config::{AppConfig, StorageBackend};
use tasker_errors::{AppError, AppResult};
use tasker_ports::{AccountRepository, TaskRepository};
use tracing::info;

use crate::retry::{RetryConfig, with_retry};

/// 基础设施资源容器
pub struct Infrastructure {
    config: AppConfig,
    accounts: Arc<dyn AccountRepository>,
    tasks: Arc<dyn TaskRepository>,
    token_service: Arc<TokenService>,
    hasher: CredentialHasher,
    timeouts: TimeoutPolicy,
}

impl Infrastructure {
    /// 从配置创建基础设施资源（数据库连接带重试）
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let token_lifetime = i64::try_from(config.jwt.expires_in_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| {
                AppError::internal(format!(
                    "jwt.expires_in_secs out of range: {}",
                    config.jwt.expires_in_secs
                ))
            })?;

        let (accounts, tasks) = match config.storage.backend {
            StorageBackend::Postgres => Self::postgres_repositories(&config).await?,
            StorageBackend::Memory => {
                info!("Using in-memory storage, data is lost on restart");
                let accounts: Arc<dyn AccountRepository> =
                    Arc::new(InMemoryAccountRepository::new());
                let tasks: Arc<dyn TaskRepository> = Arc::new(InMemoryTaskRepository::new());
                (accounts, tasks)
            }
        };

        let token_service = Arc::new(TokenService::new(
            config.jwt.secret.expose_secret().as_bytes(),
            token_lifetime,
        ));

        let hasher = CredentialHasher::new(HashingCost {
            memory_kib: config.password.memory_kib,
            iterations: config.password.iterations,
            parallelism: config.password.parallelism,
        })?;

        let timeouts = TimeoutPolicy::new(config.usecase.timeout());

        info!(
            token_lifetime_secs = config.jwt.expires_in_secs,
            usecase_timeout_secs = config.usecase.timeout_secs,
            "Infrastructure initialized"
        );

        Ok(Self {
            config,
            accounts,
            tasks,
            token_service,
            hasher,
            timeouts,
        })
    }

    async fn postgres_repositories(
        config: &AppConfig,
    ) -> AppResult<(Arc<dyn AccountRepository>, Arc<dyn TaskRepository>)> {
        let database = config.database.as_ref().ok_or_else(|| {
            AppError::internal("storage.backend = \"postgres\" requires a [database] section")
        })?;

        let pg_config = PostgresConfig::new(database.url.expose_secret())
            .with_max_connections(database.max_connections);
        let pool = with_retry(&RetryConfig::default(), "PostgreSQL connection", || {
            let cfg = pg_config.clone();
            async move {
                let pool = create_pool(&cfg).await?;
                check_connection(&pool).await?;
                Ok::<_, AppError>(pool)
            }
        })
        .await?;
        info!(
            max_connections = database.max_connections,
            "PostgreSQL connection pool created"
        );

        let report = MigrationManager::new(pool.clone())
            .migrate(&migrations())
            .await?;
        info!(
            applied = report.applied_count(),
            skipped = report.skipped.len(),
            "Database schema up to date"
        );

        Ok((
            Arc::new(PostgresAccountRepository::new(pool.clone())),
            Arc::new(PostgresTaskRepository::new(pool)),
        ))
    }

    /// 获取应用配置
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn account_repository(&self) -> Arc<dyn AccountRepository> {
        self.accounts.clone()
    }

    pub fn task_repository(&self) -> Arc<dyn TaskRepository> {
        self.tasks.clone()
    }

    /// 获取 Token 服务
    pub fn token_service(&self) -> Arc<TokenService> {
        self.token_service.clone()
    }

    pub fn credential_hasher(&self) -> CredentialHasher {
        self.hasher.clone()
    }

    pub fn timeout_policy(&self) -> TimeoutPolicy {
        self.timeouts
    }

    /// 获取服务器配置
    pub fn server_config(&self) -> &tasker_config::ServerConfig {
        &self.config.server
    }
}
