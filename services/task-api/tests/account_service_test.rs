//! 账户用例测试

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use task_api::application::{AccountService, RegisterAccount};
use task_api::error::AuthError;
use tasker_adapter_memory::InMemoryAccountRepository;
use tasker_auth_core::{CredentialHasher, HashedPassword, HashingCost, TokenService};
use tasker_common::{AccountId, CancellationToken, OperationScope, Role, TimeoutPolicy};
use tasker_domain_core::{Account, DUPLICATE_USERNAME, Username};
use tasker_errors::{AppError, AppResult};
use tasker_ports::{AccountRepository, MockAccountRepository};

const SECRET: &[u8] = b"account-service-test-secret-0123456789";

fn cheap_hasher() -> CredentialHasher {
    CredentialHasher::new(HashingCost {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}

fn tokens() -> Arc<TokenService> {
    Arc::new(TokenService::new(SECRET, chrono::Duration::hours(24)))
}

fn service_with(repository: Arc<dyn AccountRepository>, timeout: Duration) -> AccountService {
    AccountService::new(
        repository,
        cheap_hasher(),
        tokens(),
        TimeoutPolicy::new(timeout),
    )
}

fn memory_service() -> (AccountService, InMemoryAccountRepository) {
    let repo = InMemoryAccountRepository::new();
    let service = service_with(Arc::new(repo.clone()), Duration::from_secs(5));
    (service, repo)
}

fn candidate(username: &str, password: &str) -> RegisterAccount {
    RegisterAccount {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_first_account_is_administrator() {
    let (service, _) = memory_service();
    let cancel = CancellationToken::new();

    let first = service
        .create_account(&cancel, candidate("root", "s3cret"))
        .await
        .unwrap();
    assert_eq!(first.role, Role::Administrator);
    assert!(first.bootstrap);

    let second = service
        .create_account(&cancel, candidate("alice", "s3cret"))
        .await
        .unwrap();
    assert_eq!(second.role, Role::Member);
    assert!(!second.bootstrap);
}

#[tokio::test]
async fn test_password_is_hashed_before_storage() {
    let (service, repo) = memory_service();
    let cancel = CancellationToken::new();

    service
        .create_account(&cancel, candidate("root", "plain-text"))
        .await
        .unwrap();

    let scope = TimeoutPolicy::default().scope(&cancel);
    let stored = repo
        .find_by_username(&scope, "root")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.password_hash.as_str(), "plain-text");
    assert!(stored.password_hash.as_str().starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let (service, repo) = memory_service();
    let cancel = CancellationToken::new();

    service
        .create_account(&cancel, candidate("alice", "one"))
        .await
        .unwrap();
    let err = service
        .create_account(&cancel, candidate("alice", "two"))
        .await
        .unwrap_err();

    assert_eq!(err, AppError::conflict(DUPLICATE_USERNAME));
    let scope = TimeoutPolicy::default().scope(&cancel);
    assert_eq!(repo.count_all(&scope).await.unwrap(), 1);
}

#[tokio::test]
async fn test_invalid_candidates_rejected() {
    let (service, _) = memory_service();
    let cancel = CancellationToken::new();

    for (username, password) in [("", "pw"), ("alice", ""), (" alice", "pw")] {
        let err = service
            .create_account(&cancel, candidate(username, password))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{username:?}");
    }

    let long_name = "a".repeat(65);
    let err = service
        .create_account(&cancel, candidate(&long_name, "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_duplicate_is_rejected_without_insert() {
    let mut repo = MockAccountRepository::new();
    repo.expect_find_by_username().times(1).returning(|_, name| {
        Ok(Some(Account::register(
            Username::new(name).unwrap(),
            HashedPassword::from_hash("$argon2id$stub"),
            1,
        )))
    });
    repo.expect_count_all().times(0);
    repo.expect_insert().times(0);

    let service = service_with(Arc::new(repo), Duration::from_secs(5));
    let err = service
        .create_account(&CancellationToken::new(), candidate("alice", "pw"))
        .await
        .unwrap_err();

    assert_eq!(err, AppError::conflict(DUPLICATE_USERNAME));
}

#[tokio::test]
async fn test_register_role_follows_existing_count() {
    let mut repo = MockAccountRepository::new();
    repo.expect_find_by_username().returning(|_, _| Ok(None));
    repo.expect_count_all().returning(|_| Ok(3));
    repo.expect_insert()
        .times(1)
        .withf(|_, account| account.role == Role::Member && !account.bootstrap)
        .returning(|_, _| Ok(()));

    let service = service_with(Arc::new(repo), Duration::from_secs(5));
    let account = service
        .create_account(&CancellationToken::new(), candidate("bob", "pw"))
        .await
        .unwrap();

    assert_eq!(account.role, Role::Member);
}

#[tokio::test]
async fn test_authenticate_paths() {
    let (service, _) = memory_service();
    let cancel = CancellationToken::new();
    let created = service
        .create_account(&cancel, candidate("alice", "correct horse"))
        .await
        .unwrap();

    let err = service
        .authenticate(&cancel, "nobody", "correct horse")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::UserNotFound);
    assert_eq!(err.to_string(), "user not found");

    let err = service
        .authenticate(&cancel, "alice", "battery staple")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::WrongPassword);
    assert_eq!(err.to_string(), "wrong password");

    let (account, token) = service
        .authenticate(&cancel, "alice", "correct horse")
        .await
        .unwrap();
    assert_eq!(account.id, created.id);
    assert!(!token.is_empty());

    let claims = tokens().validate(&token).unwrap();
    assert_eq!(claims.id, created.id.to_string());
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.role, Role::Administrator);
}

#[tokio::test]
async fn test_promote() {
    let (service, repo) = memory_service();
    let cancel = CancellationToken::new();

    service
        .create_account(&cancel, candidate("root", "pw"))
        .await
        .unwrap();
    let member = service
        .create_account(&cancel, candidate("alice", "pw"))
        .await
        .unwrap();

    service
        .promote(&cancel, &member.id.to_string())
        .await
        .unwrap();

    let scope = TimeoutPolicy::default().scope(&cancel);
    let stored = repo
        .find_by_username(&scope, "alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.role, Role::Administrator);
    assert!(!stored.bootstrap);

    // 重复提升仍然成功，且不改动记录
    service
        .promote(&cancel, &member.id.to_string())
        .await
        .unwrap();
    let again = repo
        .find_by_username(&scope, "alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.audit_info, stored.audit_info);

    let err = service.promote(&cancel, "not-a-uuid").await.unwrap_err();
    assert_eq!(err, AppError::validation("invalid account id"));

    let err = service
        .promote(&cancel, &AccountId::new().to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_registrations_yield_one_administrator() {
    let (service, repo) = memory_service();
    let cancel = CancellationToken::new();

    let attempts = (0..8).map(|i| {
        let service = service.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            service
                .create_account(&cancel, candidate(&format!("user{i}"), "pw"))
                .await
        })
    });

    let results: Vec<AppResult<Account>> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let admins = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .filter(|a| a.role == Role::Administrator)
        .count();
    assert_eq!(admins, 1);

    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(err, AppError::Conflict(_)), "{err:?}");
    }

    let scope = TimeoutPolicy::default().scope(&cancel);
    let stored = repo.count_all(&scope).await.unwrap();
    assert_eq!(stored as usize, results.iter().filter(|r| r.is_ok()).count());
}

/// 永不返回的仓储，并记录最后一次收到的作用域令牌
#[derive(Default)]
struct StalledRepository {
    seen: Mutex<Option<CancellationToken>>,
}

impl StalledRepository {
    async fn stall<T: Send>(&self, scope: &OperationScope) -> AppResult<T> {
        if let Ok(mut seen) = self.seen.lock() {
            *seen = Some(scope.token().clone());
        }
        scope.run(std::future::pending::<AppResult<T>>()).await
    }
}

#[async_trait]
impl AccountRepository for StalledRepository {
    async fn find_by_username(
        &self,
        scope: &OperationScope,
        _username: &str,
    ) -> AppResult<Option<Account>> {
        self.stall(scope).await
    }

    async fn count_all(&self, scope: &OperationScope) -> AppResult<u64> {
        self.stall(scope).await
    }

    async fn insert(&self, scope: &OperationScope, _account: &Account) -> AppResult<()> {
        self.stall(scope).await
    }

    async fn promote_by_id(&self, scope: &OperationScope, _id: &AccountId) -> AppResult<bool> {
        self.stall(scope).await
    }
}

#[tokio::test(start_paused = true)]
async fn test_stalled_storage_times_out() {
    let repo = Arc::new(StalledRepository::default());
    let service = service_with(repo.clone(), Duration::from_secs(3));

    let err = service
        .create_account(&CancellationToken::new(), candidate("alice", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Timeout(_)));

    let err = service
        .authenticate(&CancellationToken::new(), "alice", "pw")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::App(AppError::timeout("operation timed out")));

    let token = repo.seen.lock().unwrap().clone().unwrap();
    assert!(token.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_caller_yields_cancelled() {
    let repo = Arc::new(StalledRepository::default());
    let service = service_with(repo, Duration::from_secs(100));

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = service
        .create_account(&cancel, candidate("alice", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Cancelled(_)));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_mid_call() {
    let repo = Arc::new(StalledRepository::default());
    let service = service_with(repo, Duration::from_secs(100));
    let cancel = CancellationToken::new();

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            cancel.cancel();
        })
    };

    let err = service.promote(&cancel, &AccountId::new().to_string()).await;
    canceller.await.unwrap();

    assert!(matches!(err, Err(AppError::Cancelled(_))));
}

#[tokio::test]
async fn test_scope_token_released_after_success() {
    struct Recording {
        inner: InMemoryAccountRepository,
        seen: Mutex<Vec<CancellationToken>>,
    }

    #[async_trait]
    impl AccountRepository for Recording {
        async fn find_by_username(
            &self,
            scope: &OperationScope,
            username: &str,
        ) -> AppResult<Option<Account>> {
            self.seen.lock().unwrap().push(scope.token().clone());
            self.inner.find_by_username(scope, username).await
        }

        async fn count_all(&self, scope: &OperationScope) -> AppResult<u64> {
            self.inner.count_all(scope).await
        }

        async fn insert(&self, scope: &OperationScope, account: &Account) -> AppResult<()> {
            self.inner.insert(scope, account).await
        }

        async fn promote_by_id(&self, scope: &OperationScope, id: &AccountId) -> AppResult<bool> {
            self.inner.promote_by_id(scope, id).await
        }
    }

    let repo = Arc::new(Recording {
        inner: InMemoryAccountRepository::new(),
        seen: Mutex::new(Vec::new()),
    });
    let service = service_with(repo.clone(), Duration::from_secs(5));
    let cancel = CancellationToken::new();

    service
        .create_account(&cancel, candidate("alice", "pw"))
        .await
        .unwrap();

    let seen = repo.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].is_cancelled());
    assert!(!cancel.is_cancelled());
}
