//! Client layer: signs and dispatches requests, classifies responses into domain results.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use once_cell::sync::OnceCell;
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderName, USER_AGENT};
use serde::Serialize;
use url::Url;

use crate::domain::{ApiKey, ApiSecret, MtSmsResponse, ServiceError, Sms, ValidationError};
use crate::transport::OAuthSigner;

const DEFAULT_MT_SMS_ENDPOINT: &str = "https://gatewayapi.com/rest/mtsms";
const DEFAULT_USER_AGENT: &str = concat!("gatewayapi-rs/", env!("CARGO_PKG_VERSION"));
const APPLICATION_JSON: &str = "application/json";

/// Deadline applied to every request, connect through body read.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

static SHARED: OnceCell<GatewayApiClient> = OnceCell::new();

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpRequest {
    method: Method,
    url: Url,
    headers: Vec<(HeaderName, String)>,
    body: Bytes,
}

#[derive(Debug, Clone)]
/// Raw HTTP response with its body fully read into memory.
///
/// The connection is released once the body has been read; the buffer is
/// dropped with the value.
pub struct HttpResponse {
    status: u16,
    body: Bytes,
}

impl HttpResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

trait HttpTransport: Send + Sync {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> BoxFuture<'_, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> BoxFuture<'_, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let mut builder = self.client.request(request.method, request.url);
            for (name, value) in request.headers {
                builder = builder.header(name, value);
            }
            let response = builder.body(request.body).send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
/// GatewayAPI consumer key and secret.
///
/// The secret never leaves the process; it keys the OAuth 1.0a HMAC-SHA1 signature.
pub struct Credentials {
    key: ApiKey,
    secret: ApiSecret,
}

impl Credentials {
    /// Validate that both parts are non-empty.
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            key: ApiKey::new(key)?,
            secret: ApiSecret::new(secret)?,
        })
    }

    pub fn key(&self) -> &ApiKey {
        &self.key
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`GatewayApiClient`].
///
/// The three fixed variants ([`Unauthorized`](Self::Unauthorized),
/// [`Forbidden`](Self::Forbidden), [`UnprocessableEntity`](Self::UnprocessableEntity))
/// are selected by status code alone; every other non-200 status carries the
/// service's structured error body in [`Api`](Self::Api).
pub enum GatewayApiError {
    /// The client could not be constructed (bad endpoint, TLS backend, signing key).
    ///
    /// Treat as fatal: nothing can be sent without a working client.
    #[error("configuration error: {0}")]
    Configuration(#[source] Box<dyn StdError + Send + Sync>),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Request encoding or HTTP failure (DNS, TLS, timeouts, etc); no response was received.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// HTTP 401.
    #[error("invalid API key or signature")]
    Unauthorized,

    /// HTTP 403.
    #[error("unauthorized ip address")]
    Forbidden,

    /// HTTP 422.
    #[error("invalid json request body")]
    UnprocessableEntity,

    /// Any other non-200 status with a structured error body.
    #[error("{error}")]
    Api { status: u16, error: ServiceError },

    /// A success or error body did not match the expected JSON shape.
    #[error("decode error: {0}")]
    Decode(#[source] Box<dyn StdError + Send + Sync>),
}

impl GatewayApiError {
    /// HTTP status behind a classified response error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::UnprocessableEntity => Some(422),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
/// Builder for [`GatewayApiClient`].
///
/// The request timeout is fixed at [`REQUEST_TIMEOUT`].
pub struct GatewayApiClientBuilder {
    credentials: Credentials,
    endpoint: String,
    user_agent: String,
    debug: bool,
}

impl GatewayApiClientBuilder {
    /// Create a builder with the default endpoint and user-agent, debug off.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoint: DEFAULT_MT_SMS_ENDPOINT.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            debug: false,
        }
    }

    /// Override the `mtsms` endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Echo every outgoing request body at `DEBUG` level through `tracing`.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build a [`GatewayApiClient`].
    ///
    /// Errors are [`GatewayApiError::Configuration`].
    pub fn build(self) -> Result<GatewayApiClient, GatewayApiError> {
        let endpoint = Url::parse(&self.endpoint)
            .map_err(|err| GatewayApiError::Configuration(Box::new(err)))?;
        let signer = OAuthSigner::new(&self.credentials.key, &self.credentials.secret)
            .map_err(|err| GatewayApiError::Configuration(Box::new(err)))?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| GatewayApiError::Configuration(Box::new(err)))?;

        tracing::debug!(
            endpoint = %endpoint,
            key = self.credentials.key.as_str(),
            debug = self.debug,
            "gatewayapi client initialised"
        );

        Ok(GatewayApiClient {
            key: self.credentials.key,
            endpoint,
            user_agent: self.user_agent,
            debug: self.debug,
            signer,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// GatewayAPI REST client.
///
/// Every request is signed with OAuth 1.0a (HMAC-SHA1, consumer key/secret, no
/// access token) and subject to [`REQUEST_TIMEOUT`]. Clones share one connection
/// pool. Each call performs exactly one HTTP round trip; there are no retries.
pub struct GatewayApiClient {
    key: ApiKey,
    endpoint: Url,
    user_agent: String,
    debug: bool,
    signer: OAuthSigner,
    http: Arc<dyn HttpTransport>,
}

impl GatewayApiClient {
    /// Create a client using the default endpoint.
    ///
    /// For more customization, use [`GatewayApiClient::builder`].
    pub fn new(credentials: Credentials) -> Result<Self, GatewayApiError> {
        GatewayApiClientBuilder::new(credentials).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials) -> GatewayApiClientBuilder {
        GatewayApiClientBuilder::new(credentials)
    }

    /// Process-wide client, created on the first successful call.
    ///
    /// **Warning:** once initialised, every later call returns the same client and
    /// ignores its arguments, even when they name different credentials. Prefer
    /// building one client with [`GatewayApiClient::new`] and passing it around.
    ///
    /// Concurrent first calls race safely; exactly one initialisation wins. A
    /// failed initialisation is returned as [`GatewayApiError::Configuration`]
    /// and leaves the slot empty.
    pub fn shared(
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<&'static GatewayApiClient, GatewayApiError> {
        SHARED.get_or_try_init(|| Self::from_raw_credentials(key, secret))
    }

    fn from_raw_credentials(
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, GatewayApiError> {
        let credentials = Credentials::new(key, secret)
            .map_err(|err| GatewayApiError::Configuration(Box::new(err)))?;
        Self::new(credentials)
    }

    pub fn key(&self) -> &ApiKey {
        &self.key
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Send an SMS through `POST /rest/mtsms`.
    ///
    /// Errors:
    /// - [`GatewayApiError::Transport`] when no response was received,
    /// - [`GatewayApiError::Unauthorized`], [`GatewayApiError::Forbidden`] and
    ///   [`GatewayApiError::UnprocessableEntity`] for 401, 403 and 422,
    /// - [`GatewayApiError::Api`] for any other non-200 status,
    /// - [`GatewayApiError::Decode`] when a body does not match its expected shape.
    pub async fn send_sms(&self, sms: &Sms) -> Result<MtSmsResponse, GatewayApiError> {
        let request = crate::transport::encode_mt_sms_json(sms);
        let response = self.send(Method::POST, &self.endpoint, &request).await?;
        classify_mt_sms_response(&response)
    }

    /// Serialize `body` as JSON, sign, and send it.
    ///
    /// The body is serialized once; with debug enabled the log line reads a
    /// clone of the same buffer that is transmitted.
    pub async fn send<T>(
        &self,
        method: Method,
        url: &Url,
        body: &T,
    ) -> Result<HttpResponse, GatewayApiError>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body)
            .map(Bytes::from)
            .map_err(|err| GatewayApiError::Transport(Box::new(err)))?;

        if self.debug {
            let echo = body.clone();
            tracing::debug!(
                %method,
                %url,
                body = %String::from_utf8_lossy(&echo),
                "gatewayapi request body"
            );
        }

        let authorization = self.signer.authorization_header(method.as_str(), url);
        let request = HttpRequest {
            method,
            url: url.clone(),
            headers: vec![
                (USER_AGENT, self.user_agent.clone()),
                (CONTENT_TYPE, APPLICATION_JSON.to_owned()),
                (ACCEPT, APPLICATION_JSON.to_owned()),
                (AUTHORIZATION, authorization),
            ],
            body,
        };

        let response = self.http.execute(request).await.map_err(|err| {
            tracing::debug!(%url, error = %err, "gatewayapi request failed");
            GatewayApiError::Transport(err)
        })?;
        tracing::trace!(%url, status = response.status, "gatewayapi response");
        Ok(response)
    }
}

fn classify_mt_sms_response(response: &HttpResponse) -> Result<MtSmsResponse, GatewayApiError> {
    match response.status {
        200 => crate::transport::decode_mt_sms_json_response(&response.body)
            .map_err(|err| GatewayApiError::Decode(Box::new(err))),
        401 => Err(GatewayApiError::Unauthorized),
        403 => Err(GatewayApiError::Forbidden),
        422 => Err(GatewayApiError::UnprocessableEntity),
        status => {
            let error = crate::transport::decode_error_json_response(&response.body)
                .map_err(|err| GatewayApiError::Decode(Box::new(err)))?;
            Err(GatewayApiError::Api { status, error })
        }
    }
}
