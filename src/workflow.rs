//! Upload review workflow: the client-side state machine that lists
//! uploads by status, opens record detail, and submits review decisions.
//!
//! Per record the machine is:
//!
//! ```text
//! pending --approve(notes, reviewer)--> approved   [ingestion attempted; errors recorded]
//! pending --reject(notes, reviewer) --> rejected
//! approved, rejected: terminal, no further transition
//! ```
//!
//! The liveness policy is explicit: a UI layer invokes [`ReviewWorkflow::refresh`]
//! on defined triggers (tab switch, post-submit, focus regained) instead of
//! the workflow listening to any event source itself. All state lives behind
//! a lock so the workflow can be held in shared ownership.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::client::CatalogClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    ApproveResponse, ReviewDecision, ReviewRequest, StatusFilter, UploadDetail, UploadSummary,
};

/// Why a refresh is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// The active status tab changed.
    StatusChange,
    /// A review decision was just submitted.
    PostSubmit,
    /// The surface regained focus or visibility.
    FocusRegained,
    /// Explicit user request.
    Manual,
}

/// Outcome of a successful review submission, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub id: i64,
    pub decision: ReviewDecision,
    pub message: String,
    pub added_count: u64,
    /// Per-row ingest warnings on a partial success.
    pub warnings: Vec<String>,
}

/// Cloned view of the workflow state for rendering.
#[derive(Debug, Clone, Default)]
pub struct WorkflowSnapshot {
    pub filter: StatusFilter,
    pub uploads: Vec<UploadSummary>,
    pub counts: HashMap<StatusFilter, usize>,
    pub open_detail: Option<UploadDetail>,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct WorkflowState {
    filter: StatusFilter,
    uploads: Vec<UploadSummary>,
    /// Count from the most recent successful fetch, kept per status so one
    /// tab's result never overwrites another's.
    counts: HashMap<StatusFilter, usize>,
    open_detail: Option<UploadDetail>,
    last_error: Option<String>,
    review_in_flight: bool,
    /// Ids this workflow has already moved off `pending`. Transitions are
    /// single-fire.
    reviewed_ids: HashSet<i64>,
}

/// Client-orchestrated review workflow over the catalog's pending uploads.
pub struct ReviewWorkflow {
    client: CatalogClient,
    state: RwLock<WorkflowState>,
    /// Monotonic id for list fetches; a response is applied only if no newer
    /// fetch has started since (last-write-wins on tab switches).
    list_generation: AtomicU64,
    /// Pause before the post-submit follow-up refresh.
    settle_delay: Duration,
}

impl ReviewWorkflow {
    pub fn new(client: CatalogClient, settle_delay: Duration) -> Self {
        Self {
            client,
            state: RwLock::new(WorkflowState::default()),
            list_generation: AtomicU64::new(0),
            settle_delay,
        }
    }

    /// Currently selected status filter.
    pub async fn active_filter(&self) -> StatusFilter {
        self.state.read().await.filter
    }

    /// Count from the most recent successful fetch of `filter`, if any.
    pub async fn count(&self, filter: StatusFilter) -> Option<usize> {
        self.state.read().await.counts.get(&filter).copied()
    }

    /// Cloned view of the current state for rendering.
    pub async fn snapshot(&self) -> WorkflowSnapshot {
        let state = self.state.read().await;
        WorkflowSnapshot {
            filter: state.filter,
            uploads: state.uploads.clone(),
            counts: state.counts.clone(),
            open_detail: state.open_detail.clone(),
            last_error: state.last_error.clone(),
        }
    }

    /// Switch the active status tab and fetch its list.
    pub async fn select_status(&self, filter: StatusFilter) -> ClientResult<Vec<UploadSummary>> {
        {
            let mut state = self.state.write().await;
            state.filter = filter;
        }
        self.refresh(RefreshTrigger::StatusChange).await
    }

    /// Re-fetch the list for the active status.
    ///
    /// On failure the list degrades to empty and the error message is kept
    /// for display; the workflow stays usable and the next trigger fetches
    /// normally. A response superseded by a newer fetch is discarded.
    pub async fn refresh(&self, trigger: RefreshTrigger) -> ClientResult<Vec<UploadSummary>> {
        let filter = self.state.read().await.filter;
        let generation = self.list_generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(?trigger, status = %filter, "refreshing upload list");

        match self.client.list_uploads(filter).await {
            Ok(response) => {
                let mut state = self.state.write().await;
                if self.list_generation.load(Ordering::SeqCst) != generation {
                    debug!(status = %filter, "discarding superseded list response");
                    return Ok(state.uploads.clone());
                }
                state.uploads = response.uploads.clone();
                state.counts.insert(filter, response.uploads.len());
                state.last_error = None;
                Ok(response.uploads)
            }
            Err(err) => {
                warn!(status = %filter, "list fetch failed: {err}");
                let mut state = self.state.write().await;
                if self.list_generation.load(Ordering::SeqCst) == generation {
                    state.uploads.clear();
                    state.last_error = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    /// Fetch one upload's full detail and open it.
    ///
    /// On failure nothing is opened and the error is surfaced; the caller
    /// stays on the list. Preview normalization problems degrade inside
    /// [`UploadDetail`] and never fail the call.
    pub async fn open_detail(&self, id: i64) -> ClientResult<UploadDetail> {
        match self.client.upload_detail(id).await {
            Ok(detail) => {
                let mut state = self.state.write().await;
                state.open_detail = Some(detail.clone());
                state.last_error = None;
                Ok(detail)
            }
            Err(err) => {
                warn!(id, "detail fetch failed: {err}");
                let mut state = self.state.write().await;
                state.open_detail = None;
                state.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Close the open detail view, if any.
    pub async fn close_detail(&self) {
        self.state.write().await.open_detail = None;
    }

    /// Submit a review decision for a pending upload.
    ///
    /// Refuses locally, without a network call, when a review is already in
    /// flight on this workflow or the record is known to have left `pending`.
    /// An approval whose ingest added zero rows is promoted to
    /// [`ClientError::IngestRejected`] even though the HTTP call succeeded.
    /// After a transition the record is terminal: any open detail for it
    /// closes, a cached pending list drops it, and the active list is
    /// re-fetched. Callers should follow up with [`Self::settle_refresh`].
    pub async fn submit_review(
        &self,
        id: i64,
        decision: ReviewDecision,
        notes: &str,
        reviewer: &str,
    ) -> ClientResult<ReviewOutcome> {
        {
            let mut state = self.state.write().await;
            if state.review_in_flight {
                return Err(ClientError::ReviewInFlight);
            }
            if state.reviewed_ids.contains(&id) {
                return Err(ClientError::AlreadyReviewed(id));
            }
            // Review controls are absent for non-pending records; refuse the
            // transition when cached state already shows the record terminal.
            let known_terminal = state
                .uploads
                .iter()
                .find(|u| u.id == id)
                .map(|u| u.status.is_terminal())
                .or_else(|| {
                    state
                        .open_detail
                        .as_ref()
                        .filter(|d| d.id == id)
                        .map(|d| d.status.is_terminal())
                });
            if known_terminal == Some(true) {
                return Err(ClientError::AlreadyReviewed(id));
            }
            state.review_in_flight = true;
        }

        let review = ReviewRequest {
            review_notes: notes.to_string(),
            reviewed_by: reviewer.to_string(),
        };

        let result = match decision {
            ReviewDecision::Approve => match self.client.approve_upload(id, &review).await {
                Ok(response) => Self::check_ingest(id, response),
                Err(err) => Err(err),
            },
            ReviewDecision::Reject => {
                self.client
                    .reject_upload(id, &review)
                    .await
                    .map(|response| ReviewOutcome {
                        id,
                        decision,
                        message: if response.message.is_empty() {
                            "Upload rejected".to_string()
                        } else {
                            response.message
                        },
                        added_count: 0,
                        warnings: Vec::new(),
                    })
            }
        };

        let mut should_refresh = false;
        {
            let mut state = self.state.write().await;
            state.review_in_flight = false;
            match &result {
                Ok(outcome) => {
                    state.reviewed_ids.insert(id);
                    state.retain_after_transition(id);
                    state.last_error = None;
                    info!(id, decision = %outcome.decision, "review recorded");
                    should_refresh = true;
                }
                Err(err @ ClientError::IngestRejected { .. }) => {
                    // The catalog flips the record even when no rows land, so
                    // it is terminal on the server; the refresh reflects that.
                    state.reviewed_ids.insert(id);
                    state.retain_after_transition(id);
                    state.last_error = Some(err.to_string());
                    should_refresh = true;
                }
                Err(err) => {
                    state.last_error = Some(err.to_string());
                }
            }
        }

        if should_refresh {
            // Failures here already degrade inside refresh.
            let _ = self.refresh(RefreshTrigger::PostSubmit).await;
        }

        result
    }

    /// Delayed follow-up refresh after a submission, tolerating an
    /// eventually-consistent collaborator store. A zero delay skips the
    /// pause.
    pub async fn settle_refresh(&self) -> ClientResult<Vec<UploadSummary>> {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        self.refresh(RefreshTrigger::PostSubmit).await
    }

    /// Promote a zero-row ingest to an error; carry row errors as warnings
    /// on a partial success.
    fn check_ingest(id: i64, response: ApproveResponse) -> ClientResult<ReviewOutcome> {
        if response.added_count == 0 {
            return Err(ClientError::IngestRejected {
                message: format!("No rows from upload {id} could be added to the catalog"),
                errors: response.errors,
            });
        }
        Ok(ReviewOutcome {
            id,
            decision: ReviewDecision::Approve,
            message: response.message,
            added_count: response.added_count,
            warnings: response.errors,
        })
    }
}

impl WorkflowState {
    /// Drop a transitioned record from a cached pending view and close its
    /// detail dialog.
    fn retain_after_transition(&mut self, id: i64) {
        if self.filter == StatusFilter::Pending {
            self.uploads.retain(|u| u.id != id);
            self.counts.insert(StatusFilter::Pending, self.uploads.len());
        }
        if self.open_detail.as_ref().is_some_and(|d| d.id == id) {
            self.open_detail = None;
        }
    }
}
