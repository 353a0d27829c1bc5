//! Fetching documents.
//!
//! [`Fetcher`] is the seam between navigation and the network. The browser
//! only ever sees [`Request`] and [`Response`] values, so tests and offline
//! tools can plug in their own source of documents.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use strum_macros::Display;
use thiserror::Error;
use url::Url;

/// User-Agent header sent with all requests.
const USER_AGENT: &str = concat!("trawl/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Body encoding used for form posts.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    /// `GET`
    Get,
    /// `POST` with a form-encoded body
    Post,
    /// `HEAD`
    Head,
}

/// A request for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Request method.
    pub method: Method,
    /// Absolute URL.
    pub url: Url,
    /// Form-encoded body, for posts.
    pub body: Option<String>,
}

impl Request {
    /// A `GET` request.
    #[must_use]
    pub const fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            body: None,
        }
    }

    /// A `POST` request carrying an encoded form body.
    #[must_use]
    pub const fn post(url: Url, body: String) -> Self {
        Self {
            method: Method::Post,
            url,
            body: Some(body),
        }
    }

    /// A `HEAD` request.
    #[must_use]
    pub const fn head(url: Url) -> Self {
        Self {
            method: Method::Head,
            url,
            body: None,
        }
    }
}

/// A fetched document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The URL the document was finally served from.
    pub url: Url,
    /// HTTP status code.
    pub status: u16,
    /// The `Content-Type` header, if sent.
    pub content_type: Option<String>,
    /// Body text. Empty for `HEAD`.
    pub body: String,
}

impl Response {
    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Errors raised while fetching.
///
/// An error status is not a failure: it comes back as a [`Response`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be created.
    #[error("failed to create HTTP client")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent or no response arrived.
    #[error("request to {url} failed")]
    Http {
        /// Requested URL.
        url: Url,
        /// Transport error.
        source: reqwest::Error,
    },

    /// The response body could not be read as text.
    #[error("failed to read body of {url}")]
    Body {
        /// Requested URL.
        url: Url,
        /// Transport error.
        source: reqwest::Error,
    },

    /// A fetcher not backed by HTTP has no document for the URL.
    #[error("{url} is unavailable: {reason}")]
    Unavailable {
        /// Requested URL.
        url: Url,
        /// Explanation from the fetcher.
        reason: String,
    },
}

/// A source of documents.
pub trait Fetcher {
    /// Perform `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when no response could be obtained.
    fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// Blocking HTTP fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Fetcher with the default timeout.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be created.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(TIMEOUT)
    }

    /// Fetcher with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be created.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let url = request.url.clone();
        let builder = match request.method {
            Method::Get => self.client.get(url.clone()),
            Method::Head => self.client.head(url.clone()),
            Method::Post => self
                .client
                .post(url.clone())
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(request.body.clone().unwrap_or_default()),
        };
        tracing::debug!(method = %request.method, %url, "fetching");
        let response = builder
            .send()
            .map_err(|source| FetchError::Http {
                url: url.clone(),
                source,
            })?;

        let final_url = response.url().clone();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = if request.method == Method::Head {
            String::new()
        } else {
            response.text().map_err(|source| FetchError::Body { url, source })?
        };
        tracing::debug!(url = %final_url, status, bytes = body.len(), "fetched");

        Ok(Response {
            url: final_url,
            status,
            content_type,
            body,
        })
    }
}
