//! E2E tests: the upload submission entry point.

use adrd_kg_lib::models::{NewUpload, StatusFilter, UploadStatus};
use adrd_kg_lib::preview::RowPreview;

use super::test_helpers::*;

const CSV: &[u8] = b"Dataset Name,Disease Type,Sample Size\n\
ADNI,Alzheimer's Disease,800\n\
ROSMAP,Alzheimer's Disease,1200\n";

#[actix_rt::test]
async fn test_submitted_file_lands_in_pending_list() {
    let mock = start_mock().await;
    let client = client_for(&mock);

    let upload = NewUpload::from_bytes("cohorts.csv", CSV, "jane");
    let receipt = client.submit_upload(&upload).await.unwrap();
    assert!(receipt.success);
    assert!(receipt.message.contains("pending review"));

    let workflow = workflow_for(&mock);
    let pending = workflow.select_status(StatusFilter::Pending).await.unwrap();
    let record = pending
        .iter()
        .find(|u| u.id == receipt.upload_id)
        .expect("submitted upload listed");
    assert_eq!(record.file_name, "cohorts.csv");
    assert_eq!(record.file_type, "csv");
    assert_eq!(record.uploaded_by.as_deref(), Some("jane"));
    assert_eq!(record.status, UploadStatus::Pending);
}

#[actix_rt::test]
async fn test_submitted_rows_survive_to_the_detail_preview() {
    let mock = start_mock().await;
    let client = client_for(&mock);

    let upload = NewUpload::from_bytes("cohorts.csv", CSV, "jane");
    let receipt = client.submit_upload(&upload).await.unwrap();

    let workflow = workflow_for(&mock);
    let detail = workflow.open_detail(receipt.upload_id).await.unwrap();
    assert_eq!(detail.file_content.len(), 2);

    let preview = RowPreview::from_rows(&detail.file_content);
    assert_eq!(
        preview.headers,
        vec!["Dataset Name", "Disease Type", "Sample Size"]
    );
    assert_eq!(preview.rows[0][0], "ADNI");
    assert_eq!(preview.rows[1][2], "1200");
}

#[actix_rt::test]
async fn test_submit_then_full_review_cycle() {
    let mock = start_mock().await;
    let client = client_for(&mock);

    let receipt = client
        .submit_upload(&NewUpload::from_bytes("cohorts.csv", CSV, "jane"))
        .await
        .unwrap();

    let workflow = workflow_for(&mock);
    workflow.select_status(StatusFilter::Pending).await.unwrap();
    let outcome = workflow
        .submit_review(
            receipt.upload_id,
            adrd_kg_lib::models::ReviewDecision::Approve,
            "ingest",
            "admin",
        )
        .await
        .unwrap();

    assert_eq!(outcome.added_count, 2);
    assert_eq!(mock.status_of(receipt.upload_id).as_deref(), Some("approved"));
}
