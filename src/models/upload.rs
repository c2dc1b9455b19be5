//! Upload review domain models and wire schemas.
//!
//! Every response from the catalog API is parsed into one of these typed
//! shapes at the client boundary; a payload that does not match surfaces as
//! `ClientError::InvalidResponse` instead of propagating untyped values into
//! callers. The one exception is upload row records, whose columns are
//! submitter-defined and are kept as JSON objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Review state of an uploaded spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Pending,
    Approved,
    Rejected,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// A record that has left `pending` never transitions again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status filter for upload list queries. `All` returns every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    Pending,
    Approved,
    Rejected,
    All,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::All => "all",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Whether a record with the given status belongs in this view.
    pub fn matches(&self, status: UploadStatus) -> bool {
        match self {
            Self::Pending => status == UploadStatus::Pending,
            Self::Approved => status == UploadStatus::Approved,
            Self::Rejected => status == UploadStatus::Rejected,
            Self::All => true,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reviewer decision on a pending upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

impl std::fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Upload list item as returned by `GET /management/pending`.
///
/// Summaries never carry `file_content`; the full rows come from the detail
/// endpoint only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSummary {
    pub id: i64,
    pub file_name: String,
    pub file_type: String,
    #[serde(default)]
    pub uploaded_by: Option<String>,
    pub status: UploadStatus,
    #[serde(default)]
    pub review_notes: Option<String>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl UploadSummary {
    /// Attribution shown when the submitter left the field blank.
    pub fn uploader_label(&self) -> &str {
        match self.uploaded_by.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => "Anonymous",
        }
    }
}

/// Full upload record including the normalized row preview.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadDetail {
    pub id: i64,
    pub file_name: String,
    pub file_type: String,
    #[serde(default, deserialize_with = "deserialize_rows")]
    pub file_content: Vec<Map<String, Value>>,
    #[serde(default)]
    pub uploaded_by: Option<String>,
    pub status: UploadStatus,
    #[serde(default)]
    pub review_notes: Option<String>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

fn deserialize_rows<'de, D>(deserializer: D) -> Result<Vec<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize_rows(raw))
}

/// Normalize `file_content` into an ordered sequence of row records.
///
/// The catalog API may return the rows as a JSON array or as a JSON-encoded
/// string. Both forms normalize identically; anything else (null, an
/// unparsable string, a non-array value) degrades to an empty sequence so a
/// bad preview never fails the detail fetch. Non-object array entries are
/// skipped.
pub fn normalize_rows(raw: Value) -> Vec<Map<String, Value>> {
    let parsed = match raw {
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!("file_content string did not parse as JSON: {err}");
                return Vec::new();
            }
        },
        other => other,
    };

    match parsed {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// `POST /auth/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// `GET /management/pending` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadListResponse {
    pub uploads: Vec<UploadSummary>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub status_filter: Option<String>,
}

/// Review submission body for the approve and reject endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequest {
    pub review_notes: String,
    pub reviewed_by: String,
}

/// `POST /management/pending/{id}/approve` response.
///
/// The server reports how many rows were ingested; `added_count == 0` is
/// promoted to an error by the workflow even though the HTTP call succeeded.
/// The error list is already truncated server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct ApproveResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub added_count: u64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// `POST /management/pending/{id}/reject` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RejectResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// `POST /upload` request body. `file_content` is base64 of the raw bytes.
#[derive(Debug, Clone, Serialize)]
pub struct NewUpload {
    pub file_name: String,
    pub file_content: String,
    pub file_type: String,
    pub uploaded_by: String,
}

impl NewUpload {
    /// Build a submission from raw file bytes, base64-encoding the content.
    /// The file type is inferred from the extension, defaulting to csv.
    pub fn from_bytes(file_name: &str, bytes: &[u8], uploaded_by: &str) -> Self {
        use base64::Engine;

        let file_type = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_else(|| "csv".to_string());

        Self {
            file_name: file_name.to_string(),
            file_content: base64::engine::general_purpose::STANDARD.encode(bytes),
            file_type,
            uploaded_by: uploaded_by.to_string(),
        }
    }
}

/// `POST /upload` response.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub upload_id: i64,
}
