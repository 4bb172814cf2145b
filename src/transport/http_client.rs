use crate::constants::USER_AGENT;
use crate::error::{body_excerpt, AppError};
use crate::session::interface::NoteSession;
use crate::transport::headers::{extract_cookies, session_headers};
use async_trait::async_trait;
use reqwest::{header, multipart, Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Transport seam for the platform API. Services are generic over this so
/// they can be pointed at a local server in tests.
#[async_trait]
pub trait NoteHttpClient: Send + Sync {
    /// Sends an authenticated JSON request.
    async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        session: &NoteSession,
        body: Option<&B>,
    ) -> Result<T, AppError>
    where
        B: Serialize + Debug + Send + Sync,
        T: DeserializeOwned + Debug;

    /// Sends an unauthenticated POST and returns the parsed body together
    /// with the cookies the server set on the response.
    async fn post_anonymous<B, T>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(T, Vec<(String, String)>), AppError>
    where
        B: Serialize + Debug + Send + Sync,
        T: DeserializeOwned + Debug;

    /// Uploads a single file as one multipart field on an authenticated POST.
    async fn post_file<T>(
        &self,
        path: &str,
        session: &NoteSession,
        field: &str,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned + Debug;
}

#[derive(Debug)]
pub struct NoteHttpClientImpl {
    client: Client,
    base_url: String,
}

impl NoteHttpClientImpl {
    pub fn new(base_url: &str, timeout: u64) -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn handle_response<T: DeserializeOwned + Debug>(response: Response) -> Result<T, AppError> {
        let status = response.status();
        let body_text = response.text().await?;

        debug!("Response Status: {}", status);
        debug!("Response Body: {}", body_text);

        if status.is_success() {
            let body: T = serde_json::from_str(&body_text)?;
            Ok(body)
        } else {
            error!(
                "API request failed. Status: {}, Body: {}",
                status, body_text
            );
            Err(AppError::Api(status, body_excerpt(&body_text)))
        }
    }
}

#[async_trait]
impl NoteHttpClient for NoteHttpClientImpl {
    #[instrument(skip(self, session, body))]
    async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        session: &NoteSession,
        body: Option<&B>,
    ) -> Result<T, AppError>
    where
        B: Serialize + Debug + Send + Sync,
        T: DeserializeOwned + Debug,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Sending {} request to {}", method, url);

        let headers = session_headers(&self.base_url, session)?;
        let mut request = self.client.request(method, &url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    #[instrument(skip(self, body))]
    async fn post_anonymous<B, T>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(T, Vec<(String, String)>), AppError>
    where
        B: Serialize + Debug + Send + Sync,
        T: DeserializeOwned + Debug,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Sending POST request to {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        let cookies = extract_cookies(&response);

        let parsed = Self::handle_response(response).await?;
        Ok((parsed, cookies))
    }

    #[instrument(skip(self, session, bytes))]
    async fn post_file<T>(
        &self,
        path: &str,
        session: &NoteSession,
        field: &str,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned + Debug,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Uploading {} ({} bytes) to {}", file_name, bytes.len(), url);

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = multipart::Form::new().part(field.to_string(), part);

        let headers = session_headers(&self.base_url, session)?;
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .multipart(form)
            .send()
            .await?;

        Self::handle_response(response).await
    }
}
