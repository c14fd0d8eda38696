//! 账户开通与登录

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tasker_auth_core::{CredentialHasher, TokenService};
use tasker_common::{AccountId, CancellationToken, TimeoutPolicy};
use tasker_domain_core::{Account, DUPLICATE_USERNAME, Password, Username};
use tasker_errors::{AppError, AppResult};
use tasker_ports::AccountRepository;
use tasker_telemetry::{ACCOUNTS_CREATED_TOTAL, LOGINS_TOTAL};
use tracing::{debug, info, warn};

use super::blocking::run_blocking;
use crate::error::AuthError;

/// 健康检查的存储探测上限
const READINESS_TIMEOUT: Duration = Duration::from_secs(2);

/// 注册请求
///
/// 请求体中的角色字段不会到达这里，角色只由开通规则决定
#[derive(Debug, Clone)]
pub struct RegisterAccount {
    pub username: String,
    pub password: String,
}

/// 账户用例
#[derive(Clone)]
pub struct AccountService {
    repository: Arc<dyn AccountRepository>,
    hasher: CredentialHasher,
    tokens: Arc<TokenService>,
    timeouts: TimeoutPolicy,
}

impl AccountService {
    pub fn new(
        repository: Arc<dyn AccountRepository>,
        hasher: CredentialHasher,
        tokens: Arc<TokenService>,
        timeouts: TimeoutPolicy,
    ) -> Self {
        Self {
            repository,
            hasher,
            tokens,
            timeouts,
        }
    }

    /// 开通账户
    ///
    /// 空存储中的第一个账户成为初始管理员，其余为普通成员
    pub async fn create_account(
        &self,
        parent: &CancellationToken,
        command: RegisterAccount,
    ) -> AppResult<Account> {
        let username = Username::new(command.username)?;
        let password = Password::new(command.password)?;
        let scope = self.timeouts.scope(parent);

        if self
            .repository
            .find_by_username(&scope, username.as_str())
            .await?
            .is_some()
        {
            warn!(username = %username, "Registration rejected, username taken");
            return Err(AppError::conflict(DUPLICATE_USERNAME));
        }

        let existing = self.repository.count_all(&scope).await?;

        let hasher = self.hasher.clone();
        let password_hash = scope
            .run(run_blocking(move || hasher.hash(password.expose())))
            .await??;

        let account = Account::register(username, password_hash, existing);
        self.repository.insert(&scope, &account).await?;

        counter!(ACCOUNTS_CREATED_TOTAL, "role" => account.role.as_str()).increment(1);
        info!(
            account_id = %account.id,
            username = %account.username,
            role = %account.role,
            bootstrap = account.bootstrap,
            "Account created"
        );

        Ok(account)
    }

    /// 校验用户名和密码，成功时签发令牌
    pub async fn authenticate(
        &self,
        parent: &CancellationToken,
        username: &str,
        password: &str,
    ) -> Result<(Account, String), AuthError> {
        let scope = self.timeouts.scope(parent);

        let Some(account) = self.repository.find_by_username(&scope, username).await? else {
            counter!(LOGINS_TOTAL, "outcome" => "user_not_found").increment(1);
            warn!(username = %username, "Login failed, user not found");
            return Err(AuthError::UserNotFound);
        };

        let hasher = self.hasher.clone();
        let candidate = password.to_string();
        let stored = account.password_hash.clone();
        let matches = scope
            .run(run_blocking(move || hasher.verify(&candidate, &stored)))
            .await?;

        if !matches {
            counter!(LOGINS_TOTAL, "outcome" => "wrong_password").increment(1);
            warn!(account_id = %account.id, "Login failed, wrong password");
            return Err(AuthError::WrongPassword);
        }

        let token = self
            .tokens
            .issue(&account.id, account.username.as_str(), account.role)
            .map_err(AppError::from)?;

        counter!(LOGINS_TOTAL, "outcome" => "success").increment(1);
        info!(account_id = %account.id, role = %account.role, "Login succeeded");

        Ok((account, token))
    }

    /// 将账户提升为管理员
    pub async fn promote(&self, parent: &CancellationToken, account_id: &str) -> AppResult<()> {
        let id = AccountId::from_string(account_id)
            .map_err(|_| AppError::validation("invalid account id"))?;
        let scope = self.timeouts.scope(parent);

        if self.repository.promote_by_id(&scope, &id).await? {
            info!(account_id = %id, "Account promoted to administrator");
        } else {
            debug!(account_id = %id, "Account already administrator");
        }
        Ok(())
    }

    /// 存储是否可用
    pub async fn storage_ready(&self, parent: &CancellationToken) -> AppResult<()> {
        let scope = TimeoutPolicy::new(READINESS_TIMEOUT).scope(parent);
        let count = self.repository.count_all(&scope).await?;
        debug!(accounts = count, "Storage probe succeeded");
        Ok(())
    }
}
