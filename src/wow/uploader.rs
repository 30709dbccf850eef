use std::future::Future;
use std::time::Duration;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::wow::{Credentials, Observation, RequestParams, SOFTWARE_TYPE, WOW_API_URL};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Why an upload did not go through. `Display` is the operator-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("No sensor data available")]
    NoData,

    #[error("Rate limit exceeded (429)")]
    RateLimited,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out")]
    Timeout,

    #[error("{0}")]
    Unexpected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Connection(String),
}

impl From<TransportError> for UploadError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => UploadError::Timeout,
            TransportError::Connection(detail) => UploadError::Connection(detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,

    pub body: String,
}

/// Issues a single GET and reports status and body. Must not retry.
pub trait Transport {
    fn get(&self, url: Url) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// [`Transport`] over reqwest, bounded by a total request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: Url) -> Result<TransportResponse, TransportError> {
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        Ok(TransportResponse { status, body })
    }
}

fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout;
    }

    // The query carries the authentication key.
    let err = err.without_url();
    TransportError::Connection(error_chain(&err))
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

/// Sends readings to the ingestion endpoint.
#[derive(Debug, Clone)]
pub struct Uploader<T> {
    transport: T,

    endpoint: Url,

    debug_mode: bool,
}

impl<T: Transport> Uploader<T> {
    pub fn new(transport: T) -> anyhow::Result<Self> {
        let endpoint = Url::parse(WOW_API_URL).context("failed to parse WOW endpoint")?;

        Ok(Self::with_endpoint(transport, endpoint))
    }

    pub fn with_endpoint(transport: T, endpoint: Url) -> Self {
        Self {
            transport,
            endpoint,
            debug_mode: false,
        }
    }

    /// Logs every outgoing request, with credentials masked.
    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Builds the request for `observation`. Fails without touching the
    /// network when there is nothing to send.
    pub fn prepare(
        &self,
        credentials: &Credentials,
        observation: &Observation,
        software_type: &str,
        at: DateTime<Utc>,
    ) -> Result<RequestParams, UploadError> {
        if observation.is_empty() {
            return Err(UploadError::NoData);
        }

        Ok(RequestParams::new(credentials, observation, software_type, at))
    }

    pub async fn upload(
        &self,
        credentials: &Credentials,
        observation: &Observation,
        software_type: &str,
        at: DateTime<Utc>,
    ) -> Result<(), UploadError> {
        let params = self.prepare(credentials, observation, software_type, at)?;
        self.send(&params).await
    }

    /// Sends `params` once and maps the response.
    pub async fn send(&self, params: &RequestParams) -> Result<(), UploadError> {
        if self.debug_mode {
            info!(params = %params.redacted(), "sending observation");
        }

        let response = self.request(params).await?;

        match StatusCode::from_u16(response.status) {
            Ok(StatusCode::OK) => Ok(()),
            Ok(StatusCode::TOO_MANY_REQUESTS) => {
                warn!("rate limit exceeded (429), consider a longer upload interval");
                Err(UploadError::RateLimited)
            }
            _ => Err(UploadError::Http {
                status: response.status,
                body: response.body,
            }),
        }
    }

    /// Sends a reading with no observations, to check that the endpoint
    /// accepts the credentials. Any reply other than 200, 429 included, is
    /// reported with its status and body.
    pub async fn test_connection(
        &self,
        credentials: &Credentials,
        at: DateTime<Utc>,
    ) -> Result<(), UploadError> {
        let software_type = format!("{SOFTWARE_TYPE}-test");
        let params = RequestParams::new(credentials, &Observation::new(), &software_type, at);

        let response = self.request(&params).await?;
        if response.status == StatusCode::OK.as_u16() {
            return Ok(());
        }

        Err(UploadError::Http {
            status: response.status,
            body: response.body,
        })
    }

    async fn request(&self, params: &RequestParams) -> Result<TransportResponse, UploadError> {
        let url = params.to_url(&self.endpoint);
        debug!(endpoint = %self.endpoint, parameters = params.len(), "sending request");

        Ok(self.transport.get(url).await?)
    }
}
