//! Typed HTTP client for the catalog API.
//!
//! Wraps reqwest with explicit timeouts and parse-or-reject response
//! handling: every 2xx body must match its typed schema, and every non-2xx
//! body is mapped onto `ClientError::Api` (or `NotFound`). Transport
//! failures surface as `ClientError::Connectivity`.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::models::{
    ApproveResponse, LoginResponse, NewUpload, RejectResponse, ReviewRequest, StatusFilter,
    UploadDetail, UploadListResponse, UploadReceipt,
};

/// HTTP connect timeout for catalog API calls.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP total timeout for catalog API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error body shape used by the catalog API on non-2xx responses.
#[derive(serde::Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// Client for the catalog management API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a client for the given base URL (a trailing slash is trimmed).
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET with query parameters, parsed into `T`.
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> ClientResult<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        let mut request = self.http.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        Self::read_json(response).await
    }

    /// POST a JSON body, parsed into `T`.
    async fn post_json<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self.http.post(&url).json(body).send().await?;
        Self::read_json(response).await
    }

    /// Decode a response: typed error body on non-2xx, typed schema on 2xx.
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let mut message = serde_json::from_slice::<ApiErrorBody>(&bytes)
                .map(|body| body.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).trim().to_string());
            if message.is_empty() {
                message = status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string();
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ClientError::NotFound(message));
            }
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|err| {
            warn!("response body did not match the expected schema: {err}");
            ClientError::InvalidResponse(err.to_string())
        })
    }

    /// `POST /auth/login`.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> ClientResult<LoginResponse> {
        #[derive(Serialize)]
        struct Credentials<'a> {
            username: &'a str,
            password: &'a str,
        }

        self.post_json(
            "/auth/login",
            &Credentials {
                username,
                password: password.expose_secret(),
            },
        )
        .await
    }

    /// `POST /auth/logout`. The caller decides what a failure means.
    pub async fn logout(&self) -> ClientResult<()> {
        let url = self.url("/auth/logout");
        debug!(%url, "POST");
        let response = self.http.post(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: "logout failed".to_string(),
            });
        }
        Ok(())
    }

    /// `GET /management/pending?status={filter}`.
    pub async fn list_uploads(&self, filter: StatusFilter) -> ClientResult<UploadListResponse> {
        self.get("/management/pending", &[("status", filter.as_str())])
            .await
    }

    /// `GET /management/pending/{id}`.
    pub async fn upload_detail(&self, id: i64) -> ClientResult<UploadDetail> {
        self.get(&format!("/management/pending/{id}"), &[]).await
    }

    /// `POST /management/pending/{id}/approve`.
    pub async fn approve_upload(
        &self,
        id: i64,
        review: &ReviewRequest,
    ) -> ClientResult<ApproveResponse> {
        self.post_json(&format!("/management/pending/{id}/approve"), review)
            .await
    }

    /// `POST /management/pending/{id}/reject`.
    pub async fn reject_upload(
        &self,
        id: i64,
        review: &ReviewRequest,
    ) -> ClientResult<RejectResponse> {
        self.post_json(&format!("/management/pending/{id}/reject"), review)
            .await
    }

    /// `POST /upload` - the submission entry point.
    pub async fn submit_upload(&self, upload: &NewUpload) -> ClientResult<UploadReceipt> {
        self.post_json("/upload", upload).await
    }
}
