//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use url::Url;

use crate::api::{BotsApi, ChatApi, ConversationsApi, DatasetsApi, FilesApi, WorkflowsApi};
use crate::auth::{StaticToken, TokenProvider};
use crate::error::{Error, ErrorBody, Result};

/// Default API endpoint.
const DEFAULT_BASE_URL: &str = "https://api.palaver.ai";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for streaming requests.
const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(300);

/// Response header carrying the server-side log id.
pub(crate) const LOG_ID_HEADER: &str = "x-request-id";

/// Palaver API client.
///
/// Provides typed access to the platform endpoints. Cloning is cheap; clones
/// share one HTTP connection pool.
///
/// # Example
///
/// ```no_run
/// use palaver::PalaverClient;
///
/// # async fn example() -> palaver::Result<()> {
/// let client = PalaverClient::builder()
///     .auth_token("pat_xxx")
///     .build()?;
///
/// let bot = client.bots().retrieve("bot_id").await?;
/// println!("{}", bot.name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PalaverClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Base URL for API requests.
    pub(crate) base_url: Url,
    /// Bearer token source.
    pub(crate) auth: Arc<dyn TokenProvider>,
    /// Request timeout.
    pub(crate) timeout: Duration,
    /// Streaming timeout.
    pub(crate) stream_timeout: Duration,
}

impl PalaverClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the bots API.
    pub fn bots(&self) -> BotsApi {
        BotsApi::new(self.clone())
    }

    /// Access the chat API.
    pub fn chat(&self) -> ChatApi {
        ChatApi::new(self.clone())
    }

    /// Access the conversations API.
    pub fn conversations(&self) -> ConversationsApi {
        ConversationsApi::new(self.clone())
    }

    /// Access the workflows API.
    pub fn workflows(&self) -> WorkflowsApi {
        WorkflowsApi::new(self.clone())
    }

    /// Access the datasets API.
    pub fn datasets(&self) -> DatasetsApi {
        DatasetsApi::new(self.clone())
    }

    /// Access the files API.
    pub fn files(&self) -> FilesApi {
        FilesApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    /// Start a request with the bearer token attached. The token is fetched
    /// per request so rotating providers stay current.
    async fn request(&self, method: Method, url: Url) -> Result<reqwest::RequestBuilder> {
        let token = self.inner.auth.token().await?;
        Ok(self.inner.http.request(method, url).bearer_auth(token))
    }

    /// Make a GET request.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let response = self
            .request(Method::GET, url)
            .await?
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self
            .request(Method::GET, url)
            .await?
            .query(query)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a POST request.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        self.post_with_query(path, &[] as &[(&str, String)], body).await
    }

    /// Make a POST request with query parameters.
    pub(crate) async fn post_with_query<T, Q, B>(&self, path: &str, query: &Q, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self
            .request(Method::POST, url)
            .await?
            .query(query)
            .json(body)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a POST request for streaming (returns the response directly).
    ///
    /// HTTP-level rejections are decoded here; 200 responses that carry a
    /// JSON error body instead of an event stream are handled by the stream
    /// decoder's pre-flight check.
    pub(crate) async fn post_stream<Q, B>(
        &self,
        path: &str,
        query: &Q,
        body: &B,
    ) -> Result<reqwest::Response>
    where
        Q: serde::Serialize + ?Sized,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self
            .request(Method::POST, url)
            .await?
            .query(query)
            .json(body)
            .timeout(self.inner.stream_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        Ok(response)
    }

    /// Upload a file as multipart form data.
    pub(crate) async fn upload<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        file_name: String,
        content: Vec<u8>,
    ) -> Result<T> {
        let url = self.url(path)?;
        let part = reqwest::multipart::Part::bytes(content).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .request(Method::POST, url)
            .await?
            .multipart(form)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Handle a response, unwrapping the `{code, msg, data}` envelope.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let log_id = extract_log_id(&response);
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(decode_error_body(&body, status.as_u16(), log_id));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        if envelope.code != 0 {
            tracing::warn!(code = envelope.code, log_id = ?log_id, "request unsuccessful");
            return Err(Error::Api {
                code: envelope.code,
                message: envelope.msg,
                log_id,
            });
        }
        envelope.data.ok_or(Error::Api {
            code: 0,
            message: "response envelope carried no data".to_string(),
            log_id,
        })
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let log_id = extract_log_id(&response);
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        decode_error_body(&body, status, log_id)
    }
}

/// Decode a `{code, msg}` error body, falling back to the HTTP status.
fn decode_error_body(body: &str, status: u16, log_id: Option<String>) -> Error {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => err.into_error(log_id),
        Err(_) => Error::Api {
            code: i64::from(status),
            message: format!("HTTP {status}"),
            log_id,
        },
    }
}

/// Pull the log id out of the response headers.
pub(crate) fn extract_log_id(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(LOG_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Standard response envelope wrapping every non-streaming payload.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

/// Builder for creating a PalaverClient.
pub struct ClientBuilder {
    base_url: String,
    auth: Option<Arc<dyn TokenProvider>>,
    timeout: Duration,
    stream_timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth: None,
            timeout: DEFAULT_TIMEOUT,
            stream_timeout: DEFAULT_STREAM_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the base URL for the API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Authenticate with a fixed token, e.g. a personal access token.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(Arc::new(StaticToken::new(token)));
        self
    }

    /// Authenticate through a custom token provider.
    pub fn token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.auth = Some(provider);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the streaming request timeout.
    pub fn stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<PalaverClient> {
        let auth = self
            .auth
            .ok_or_else(|| Error::Config("an auth token or token provider is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&self.base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("palaver-rust/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(PalaverClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                auth,
                timeout: self.timeout,
                stream_timeout: self.stream_timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
