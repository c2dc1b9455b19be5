//! E2E tests: status-filtered listing, per-status counts, and degraded
//! fetch failures.

use adrd_kg_lib::error::ClientError;
use adrd_kg_lib::models::{StatusFilter, UploadStatus};

use super::mock_catalog_api::MockUpload;
use super::test_helpers::*;

#[actix_rt::test]
async fn test_lists_filter_by_status() {
    let mock = start_mock().await;
    mock.seed(MockUpload::pending(1, "a.csv", dataset_rows(2)));
    mock.seed(MockUpload::pending(2, "b.csv", dataset_rows(2)));
    mock.seed(MockUpload::pending(3, "c.csv", dataset_rows(2)).with_status("approved"));
    mock.seed(MockUpload::pending(4, "d.csv", dataset_rows(2)).with_status("rejected"));

    let workflow = workflow_for(&mock);

    let pending = workflow.select_status(StatusFilter::Pending).await.unwrap();
    let ids: Vec<i64> = pending.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(pending.iter().all(|u| u.status == UploadStatus::Pending));

    let approved = workflow.select_status(StatusFilter::Approved).await.unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].id, 3);
    assert_eq!(approved[0].status, UploadStatus::Approved);

    let all = workflow.select_status(StatusFilter::All).await.unwrap();
    assert_eq!(all.len(), 4);
}

#[actix_rt::test]
async fn test_empty_result_is_not_an_error() {
    let mock = start_mock().await;
    let workflow = workflow_for(&mock);

    let uploads = workflow.select_status(StatusFilter::Pending).await.unwrap();
    assert!(uploads.is_empty());

    let snapshot = workflow.snapshot().await;
    assert!(snapshot.last_error.is_none());
    assert_eq!(snapshot.counts.get(&StatusFilter::Pending), Some(&0));
}

#[actix_rt::test]
async fn test_counts_do_not_cross_contaminate_between_statuses() {
    let mock = start_mock().await;
    mock.seed(MockUpload::pending(1, "a.csv", dataset_rows(1)));
    mock.seed(MockUpload::pending(2, "b.csv", dataset_rows(1)));
    mock.seed(MockUpload::pending(3, "c.csv", dataset_rows(1)).with_status("approved"));

    let workflow = workflow_for(&mock);
    workflow.select_status(StatusFilter::Pending).await.unwrap();
    workflow.select_status(StatusFilter::Approved).await.unwrap();

    assert_eq!(workflow.count(StatusFilter::Pending).await, Some(2));
    assert_eq!(workflow.count(StatusFilter::Approved).await, Some(1));
    assert_eq!(workflow.count(StatusFilter::Rejected).await, None);

    // A new pending record appears while another status is being viewed;
    // the pending count stays at its last successful fetch until pending is
    // fetched again.
    mock.seed(MockUpload::pending(9, "late.csv", dataset_rows(1)));
    workflow.select_status(StatusFilter::Approved).await.unwrap();
    assert_eq!(workflow.count(StatusFilter::Pending).await, Some(2));

    workflow.select_status(StatusFilter::Pending).await.unwrap();
    assert_eq!(workflow.count(StatusFilter::Pending).await, Some(3));
}

#[actix_rt::test]
async fn test_list_failure_degrades_and_recovers() {
    let mock = start_mock().await;
    mock.seed(MockUpload::pending(1, "a.csv", dataset_rows(1)));

    let workflow = workflow_for(&mock);
    workflow.select_status(StatusFilter::Pending).await.unwrap();

    mock.set_fail_listing(true);
    let err = workflow
        .refresh(adrd_kg_lib::workflow::RefreshTrigger::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 500, .. }));

    let snapshot = workflow.snapshot().await;
    assert!(snapshot.uploads.is_empty());
    assert!(snapshot.last_error.is_some());

    // Switching tabs afterwards works normally.
    mock.set_fail_listing(false);
    let uploads = workflow.select_status(StatusFilter::Pending).await.unwrap();
    assert_eq!(uploads.len(), 1);
    assert!(workflow.snapshot().await.last_error.is_none());
}

#[actix_rt::test]
async fn test_detail_fetch_failure_leaves_nothing_open() {
    let mock = start_mock().await;
    let workflow = workflow_for(&mock);

    let err = workflow.open_detail(999).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
    assert_eq!(err.to_string(), "Upload not found");

    let snapshot = workflow.snapshot().await;
    assert!(snapshot.open_detail.is_none());
    assert!(snapshot.last_error.is_some());
}

#[actix_rt::test]
async fn test_focus_regained_refresh_picks_up_external_edits() {
    let mock = start_mock().await;
    mock.seed(MockUpload::pending(1, "a.csv", dataset_rows(1)));

    let workflow = workflow_for(&mock);
    let before = workflow.select_status(StatusFilter::Pending).await.unwrap();
    assert_eq!(before.len(), 1);

    // Another reviewer submits a record elsewhere.
    mock.seed(MockUpload::pending(2, "b.csv", dataset_rows(1)));

    let after = workflow
        .refresh(adrd_kg_lib::workflow::RefreshTrigger::FocusRegained)
        .await
        .unwrap();
    assert_eq!(after.len(), 2);
}
