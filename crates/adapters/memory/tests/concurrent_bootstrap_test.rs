//! 并发注册初始管理员

use futures::future::join_all;
use tasker_adapter_memory::InMemoryAccountRepository;
use tasker_auth_core::HashedPassword;
use tasker_common::{CancellationToken, TimeoutPolicy};
use tasker_domain_core::{Account, BOOTSTRAP_CONFLICT, Username};
use tasker_errors::AppError;
use tasker_ports::AccountRepository;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_only_one_bootstrap_account_is_stored() {
    let repo = InMemoryAccountRepository::new();
    let root = CancellationToken::new();

    let attempts = (0..16).map(|i| {
        let repo = repo.clone();
        let root = root.clone();
        tokio::spawn(async move {
            let scope = TimeoutPolicy::default().scope(&root);
            let account = Account::register(
                Username::new(format!("user{i}")).unwrap(),
                HashedPassword::from_hash("$argon2id$stub"),
                0,
            );
            repo.insert(&scope, &account).await
        })
    });

    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == AppError::conflict(BOOTSTRAP_CONFLICT))
    );

    let scope = TimeoutPolicy::default().scope(&root);
    assert_eq!(repo.count_all(&scope).await.unwrap(), 1);
}
