//! 内置表结构迁移

use crate::Migration;

/// 账户用户名唯一约束
pub const USERNAME_CONSTRAINT: &str = "accounts_username_key";

/// 初始管理员唯一索引：`is_bootstrap = true` 的记录最多一条
pub const BOOTSTRAP_INDEX: &str = "accounts_single_bootstrap";

pub fn migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "create_accounts",
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id UUID PRIMARY KEY,
                username VARCHAR(64) NOT NULL,
                password_hash TEXT NOT NULL,
                role VARCHAR(16) NOT NULL CHECK (role IN ('MEMBER', 'ADMINISTRATOR')),
                is_bootstrap BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                CONSTRAINT accounts_username_key UNIQUE (username)
            )
            "#,
        ),
        Migration::new(
            2,
            "accounts_single_bootstrap",
            "CREATE UNIQUE INDEX IF NOT EXISTS accounts_single_bootstrap \
             ON accounts (is_bootstrap) WHERE is_bootstrap",
        ),
        Migration::new(
            3,
            "create_tasks",
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                due_date TIMESTAMPTZ NOT NULL,
                status TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        ),
    ]
}
