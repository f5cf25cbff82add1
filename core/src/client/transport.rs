use crate::api::request::FIELD_IMAGE;
use crate::api::DetectionRequest;
use std::future::Future;
use std::time::Duration;

/// Status and body of any response the endpoint sent back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connect failure, timeout, or a body cut short. Worth retrying.
    #[error("no response from detection endpoint: {0}")]
    NoResponse(String),
    /// The request could not be encoded; sending it again cannot help.
    #[error("cannot encode detection request: {0}")]
    Encode(String),
    #[error("building http client: {0}")]
    Setup(String),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::NoResponse(_))
    }
}

/// One POST of a detection request.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &DetectionRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// Multipart HTTP transport over `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(endpoint, None)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| TransportError::Setup(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(request: &DetectionRequest) -> Result<reqwest::multipart::Form, TransportError> {
        let image = reqwest::multipart::Part::bytes(request.image.to_vec())
            .file_name(request.file_name.clone())
            .mime_str(request.mime)
            .map_err(|err| TransportError::Encode(format!("image part: {}", err)))?;
        let form = request
            .threshold_fields()
            .into_iter()
            .fold(
                reqwest::multipart::Form::new().part(FIELD_IMAGE, image),
                |form, (name, value)| form.text(name, value),
            );
        Ok(form)
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &DetectionRequest) -> Result<RawResponse, TransportError> {
        let form = Self::form(request)?;
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| TransportError::NoResponse(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::NoResponse(format!("reading body: {}", err)))?;
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
