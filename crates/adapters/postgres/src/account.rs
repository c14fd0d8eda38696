//! PostgreSQL 账户仓储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tasker_auth_core::HashedPassword;
use tasker_common::{AccountId, AuditInfo, OperationScope, Role};
use tasker_domain_core::{
    ACCOUNT_NOT_FOUND, Account, BOOTSTRAP_CONFLICT, DUPLICATE_USERNAME, Username,
};
use tasker_errors::{AppError, AppResult};
use tasker_ports::AccountRepository;
use tracing::debug;
use uuid::Uuid;

use crate::BOOTSTRAP_INDEX;

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    is_bootstrap: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let username = Username::new(row.username)
            .map_err(|e| AppError::database(format!("Corrupt account row {}: {}", row.id, e)))?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| AppError::database(format!("Corrupt account row {}: {}", row.id, e)))?;

        Ok(Account {
            id: AccountId::from_uuid(row.id),
            username,
            password_hash: HashedPassword::from_hash(row.password_hash),
            role,
            bootstrap: row.is_bootstrap,
            audit_info: AuditInfo {
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        })
    }
}

/// 唯一约束冲突映射为业务冲突
fn map_insert_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some(BOOTSTRAP_INDEX) => AppError::conflict(BOOTSTRAP_CONFLICT),
                _ => AppError::conflict(DUPLICATE_USERNAME),
            };
        }
    }
    AppError::database(format!("Failed to insert account: {}", e))
}

#[derive(Debug, Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_by_username(
        &self,
        scope: &OperationScope,
        username: &str,
    ) -> AppResult<Option<Account>> {
        let row = scope
            .run(async {
                sqlx::query_as::<_, AccountRow>(
                    r#"
                    SELECT id, username, password_hash, role, is_bootstrap, created_at, updated_at
                    FROM accounts
                    WHERE username = $1
                    "#,
                )
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to find account: {}", e)))
            })
            .await?;

        row.map(Account::try_from).transpose()
    }

    async fn count_all(&self, scope: &OperationScope) -> AppResult<u64> {
        let count: i64 = scope
            .run(async {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| AppError::database(format!("Failed to count accounts: {}", e)))
            })
            .await?;

        Ok(count as u64)
    }

    async fn insert(&self, scope: &OperationScope, account: &Account) -> AppResult<()> {
        scope
            .run(async {
                sqlx::query(
                    r#"
                    INSERT INTO accounts
                        (id, username, password_hash, role, is_bootstrap, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(account.id.0)
                .bind(account.username.as_str())
                .bind(account.password_hash.as_str())
                .bind(account.role.as_str())
                .bind(account.bootstrap)
                .bind(account.audit_info.created_at)
                .bind(account.audit_info.updated_at)
                .execute(&self.pool)
                .await
                .map_err(map_insert_error)
            })
            .await?;

        debug!(account_id = %account.id, "Account stored");
        Ok(())
    }

    async fn promote_by_id(&self, scope: &OperationScope, id: &AccountId) -> AppResult<bool> {
        let admin = Role::Administrator.as_str();

        let result = scope
            .run(async {
                sqlx::query(
                    "UPDATE accounts SET role = $1, updated_at = NOW() WHERE id = $2 AND role <> $1",
                )
                .bind(admin)
                .bind(id.0)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to promote account: {}", e)))
            })
            .await?;

        if result.rows_affected() > 0 {
            debug!(account_id = %id, "Account promoted");
            return Ok(true);
        }

        // 未更新：账户不存在或已是管理员
        let exists: bool = scope
            .run(async {
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
                    .bind(id.0)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| AppError::database(format!("Failed to find account: {}", e)))
            })
            .await?;

        if !exists {
            return Err(AppError::not_found(ACCOUNT_NOT_FOUND));
        }
        Ok(false)
    }
}
