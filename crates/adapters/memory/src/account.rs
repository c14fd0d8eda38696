//! 内存账户仓储

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tasker_common::{AccountId, OperationScope};
use tasker_domain_core::{ACCOUNT_NOT_FOUND, Account, BOOTSTRAP_CONFLICT, DUPLICATE_USERNAME};
use tasker_errors::{AppError, AppResult};
use tasker_ports::AccountRepository;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_username(
        &self,
        scope: &OperationScope,
        username: &str,
    ) -> AppResult<Option<Account>> {
        scope
            .run(async {
                let accounts = self.accounts.read().await;
                Ok(accounts
                    .values()
                    .find(|a| a.username.as_str() == username)
                    .cloned())
            })
            .await
    }

    async fn count_all(&self, scope: &OperationScope) -> AppResult<u64> {
        scope
            .run(async { Ok(self.accounts.read().await.len() as u64) })
            .await
    }

    async fn insert(&self, scope: &OperationScope, account: &Account) -> AppResult<()> {
        scope
            .run(async {
                let mut accounts = self.accounts.write().await;

                if accounts
                    .values()
                    .any(|a| a.username.as_str() == account.username.as_str())
                {
                    return Err(AppError::conflict(DUPLICATE_USERNAME));
                }

                if account.bootstrap && accounts.values().any(|a| a.bootstrap) {
                    return Err(AppError::conflict(BOOTSTRAP_CONFLICT));
                }

                accounts.insert(account.id, account.clone());
                debug!(account_id = %account.id, "Account stored");
                Ok(())
            })
            .await
    }

    async fn promote_by_id(&self, scope: &OperationScope, id: &AccountId) -> AppResult<bool> {
        scope
            .run(async {
                let mut accounts = self.accounts.write().await;
                let Some(account) = accounts.get_mut(id) else {
                    return Err(AppError::not_found(ACCOUNT_NOT_FOUND));
                };

                Ok(account.promote())
            })
            .await
    }
}
