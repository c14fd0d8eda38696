//! 任务用例测试

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use task_api::application::TaskService;
use tasker_common::{CancellationToken, TaskId, TimeoutPolicy};
use tasker_domain_core::{TASK_NOT_FOUND, TaskDraft};
use tasker_errors::AppError;
use tasker_ports::MockTaskRepository;

fn draft(status: &str) -> TaskDraft {
    TaskDraft::new(
        "ship release",
        "tag and publish",
        Some(Utc.with_ymd_and_hms(2026, 11, 2, 8, 0, 0).unwrap()),
        status,
    )
    .unwrap()
}

fn service(repo: MockTaskRepository) -> TaskService {
    TaskService::new(Arc::new(repo), TimeoutPolicy::new(Duration::from_secs(5)))
}

#[tokio::test]
async fn test_get_missing_task() {
    let mut repo = MockTaskRepository::new();
    repo.expect_find_by_id().times(1).returning(|_, _| Ok(None));

    let err = service(repo)
        .get(&CancellationToken::new(), &TaskId::new().to_string())
        .await
        .unwrap_err();
    assert_eq!(err, AppError::not_found(TASK_NOT_FOUND));
}

#[tokio::test]
async fn test_invalid_id_never_reaches_storage() {
    let mut repo = MockTaskRepository::new();
    repo.expect_find_by_id().times(0);
    repo.expect_update_by_id().times(0);
    repo.expect_delete_by_id().times(0);
    let service = service(repo);
    let cancel = CancellationToken::new();

    let expected = AppError::validation("invalid task id");
    assert_eq!(service.get(&cancel, "42").await.unwrap_err(), expected);
    assert_eq!(
        service.update(&cancel, "42", draft("open")).await.unwrap_err(),
        expected
    );
    assert_eq!(service.delete(&cancel, "42").await.unwrap_err(), expected);
}

#[tokio::test]
async fn test_create_assigns_id_and_stores() {
    let mut repo = MockTaskRepository::new();
    repo.expect_insert()
        .times(1)
        .withf(|_, task| task.status == "open" && task.title == "ship release")
        .returning(|_, _| Ok(()));

    let task = service(repo)
        .create(&CancellationToken::new(), draft("open"))
        .await
        .unwrap();
    assert_eq!(task.description, "tag and publish");
}

#[tokio::test]
async fn test_storage_errors_propagate() {
    let mut repo = MockTaskRepository::new();
    repo.expect_find_all()
        .returning(|_| Err(AppError::database("connection reset")));

    let err = service(repo)
        .list(&CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Database(_)));
}
