//! HTTP transport for the Iconfinder API.
//!
//! The [`Client`] type sends requests and turns error statuses into
//! [`Error`]s. Use [`ClientBuilder`] to configure and create clients.
//! Entity capabilities ([`Retrievable`](crate::Retrievable),
//! [`ListableByCursor`](crate::ListableByCursor)) take a `&Client`.

use crate::{capability::Bound, metadata::RequestMetadata, Error, Response, Result};
use http::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.iconfinder.com/v2";

/// Default site base URL.
pub const DEFAULT_SITE_URL: &str = "https://www.iconfinder.com";

const DEFAULT_USER_AGENT: &str = concat!("iconfinder-rs/", env!("CARGO_PKG_VERSION"));

/// An Iconfinder API client.
///
/// The client is designed to be reused across multiple requests. It holds a
/// connection pool and configuration that applies to all requests, and is
/// cheap to clone.
///
/// # Examples
///
/// ```no_run
/// use iconfinder::{Category, Client, ListableByCursor};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), iconfinder::Error> {
/// let client = Client::builder()
///     .credentials("my-client-id", "my-client-secret")
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// if let Some(page) = Category::list(&client, 5, None, None).await? {
///     for category in &page {
///         println!("{}: {}", category.identifier(), category.name());
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    api_base_url: Url,
    site_base_url: Url,
    credentials: Option<Credentials>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

#[derive(Clone)]
struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Client {
    /// Creates a client with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Creates a new `ClientBuilder` for configuring a client.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use iconfinder::Client;
    ///
    /// # fn example() -> Result<(), iconfinder::Error> {
    /// let client = Client::builder()
    ///     .base_url("http://localhost:8080/v2")?
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The API base URL.
    pub fn api_base_url(&self) -> &Url {
        &self.inner.api_base_url
    }

    /// The site base URL.
    pub fn site_base_url(&self) -> &Url {
        &self.inner.site_base_url
    }

    /// The configured client ID, if any.
    pub fn client_id(&self) -> Option<&str> {
        self.inner
            .credentials
            .as_ref()
            .map(|credentials| credentials.client_id.as_str())
    }

    /// Resolves a path against the API base URL.
    ///
    /// Absolute `http(s)://` paths are returned unchanged.
    pub fn api_url(&self, path: &str) -> Result<Url> {
        join(&self.inner.api_base_url, path)
    }

    /// Resolves a path against the site base URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use iconfinder::Client;
    ///
    /// # fn example() -> Result<(), iconfinder::Error> {
    /// let client = Client::new()?;
    /// let url = client.site_url("/iconsets/flat-ui")?;
    /// assert_eq!(url.as_str(), "https://www.iconfinder.com/iconsets/flat-ui");
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    pub fn site_url(&self, path: &str) -> Result<Url> {
        join(&self.inner.site_base_url, path)
    }

    /// Binds an entity type to this client.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use iconfinder::{Client, Style};
    ///
    /// # async fn example() -> Result<(), iconfinder::Error> {
    /// let client = Client::new()?;
    /// let styles = client.bind::<Style>();
    ///
    /// if let Some(style) = styles.get("flat", None).await? {
    ///     println!("{}", style.name());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn bind<E>(&self) -> Bound<'_, E> {
        Bound::new(self)
    }

    /// Sends a request and returns the raw response.
    ///
    /// Statuses of 400 and above are translated with
    /// [`Error::from_response`]. Redirects are not followed, so 3xx
    /// statuses (including `304 Not Modified`) come back as responses.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use iconfinder::{metadata::RequestMetadata, Client};
    /// use http::Method;
    ///
    /// # async fn example() -> Result<(), iconfinder::Error> {
    /// let client = Client::new()?;
    ///
    /// let metadata = RequestMetadata::new(Method::GET, "licenses").with_path_segment("5");
    /// let response = client.send(metadata).await?;
    /// println!("{} in {:?}", response.status, response.latency);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send(&self, metadata: RequestMetadata) -> Result<Response> {
        let mut url = self.api_url(&metadata.path)?;
        if !metadata.segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| Error::ConfigurationError("URL cannot have a path".to_string()))?
                .pop_if_empty()
                .extend(&metadata.segments);
        }

        if !metadata.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(&metadata.query_params);
        }

        // Logged before the credentials are attached.
        tracing::debug!(
            method = %metadata.method,
            url = %url,
            "Executing HTTP request"
        );

        if let Some(credentials) = &self.inner.credentials {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &credentials.client_id);
            if !credentials.client_secret.is_empty() {
                query.append_pair("client_secret", &credentials.client_secret);
            }
        }

        let mut request = self.inner.http_client.request(metadata.method.clone(), url);

        for (name, value) in &self.inner.default_headers {
            request = request.header(name, value);
        }

        for (name, value) in &metadata.headers {
            request = request.header(name, value);
        }

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(body) = &metadata.body {
            request = request.json(body);
        }

        let start_time = Instant::now();
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let raw_body = response.text().await.map_err(transport_error)?;
        let latency = start_time.elapsed();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            "Received HTTP response"
        );

        if status.is_client_error() {
            tracing::error!(
                status = status.as_u16(),
                response = %raw_body,
                "Client error (4xx)"
            );
            return Err(Error::from_response(status, &headers, &raw_body));
        }
        if status.is_server_error() {
            tracing::warn!(
                status = status.as_u16(),
                response = %raw_body,
                "Server error (5xx)"
            );
            return Err(Error::from_response(status, &headers, &raw_body));
        }

        Ok(Response::new(status, headers, raw_body, latency))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("api_base_url", &self.inner.api_base_url.as_str())
            .field("site_base_url", &self.inner.site_base_url.as_str())
            .field("client_id", &self.client_id())
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout
    } else {
        Error::Network(err)
    }
}

fn join(base: &Url, path: &str) -> Result<Url> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Ok(Url::parse(path)?);
    }

    let base = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Ok(Url::parse(&format!("{base}/{path}"))?)
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use iconfinder::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), iconfinder::Error> {
/// let client = ClientBuilder::new()
///     .credentials("my-client-id", "my-client-secret")
///     .timeout(Duration::from_secs(30))
///     .user_agent("my-app/1.0")?
///     .default_header("Accept-Language", "en")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api_base_url: Option<Url>,
    site_base_url: Option<Url>,
    credentials: Option<Credentials>,
    default_headers: HeaderMap,
    user_agent: Option<HeaderValue>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            api_base_url: None,
            site_base_url: None,
            credentials: None,
            default_headers: HeaderMap::new(),
            user_agent: None,
            timeout: None,
        }
    }

    /// Sets the API base URL. Defaults to [`DEFAULT_API_URL`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.api_base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Sets the site base URL. Defaults to [`DEFAULT_SITE_URL`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn site_base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.site_base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Sets the client credentials sent with every request.
    ///
    /// An empty client ID leaves the client unauthenticated.
    pub fn credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        let client_id = client_id.into();
        self.credentials = (!client_id.is_empty()).then(|| Credentials {
            client_id,
            client_secret: client_secret.into(),
        });
        self
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the `User-Agent` header.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid header value.
    pub fn user_agent(mut self, value: impl AsRef<str>) -> Result<Self> {
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid user agent: {}", e)))?;
        self.user_agent = Some(value);
        Ok(self)
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client configuration is invalid.
    pub fn build(self) -> Result<Client> {
        let api_base_url = match self.api_base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_API_URL)?,
        };
        let site_base_url = match self.site_base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_SITE_URL)?,
        };
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_USER_AGENT));

        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(Policy::none())
            .build()
            .map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                api_base_url,
                site_base_url,
                credentials: self.credentials,
                default_headers: self.default_headers,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
