//! Navigation around the trawl page parser.
//!
//! # Scope
//!
//! This crate provides:
//! - **Fetching** - the [`Fetcher`] seam and a blocking HTTP implementation
//! - **History** - back/forward over the visited documents
//! - **Browser** - fetch, parse, record, and resolve the links and frames of
//!   the current page against its base URL
//!
//! # Not Implemented
//!
//! - Cookies, sessions and authentication
//! - Proxies
//! - Loading frame contents

/// Fetching documents.
pub mod fetch;
/// Navigation history.
pub mod history;

pub use fetch::{FetchError, Fetcher, HttpFetcher, Method, Request, Response};
pub use history::History;

use thiserror::Error;
use trawl_common::clear_warnings;
use trawl_html::{LexError, PageBuilder, ParserConfig};
use trawl_page::Page;
use url::Url;
use url::form_urlencoded;

/// Errors raised while navigating.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// The document could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The document was fetched but could not be parsed.
    #[error("failed to parse {url}")]
    Parse {
        /// Where the document came from.
        url: Url,
        /// Tokenizer failure.
        source: LexError,
    },

    /// A URL could not be parsed or resolved.
    #[error("invalid URL '{input}'")]
    Url {
        /// The URL as given.
        input: String,
        /// Parser diagnostic.
        source: url::ParseError,
    },

    /// There is nothing in the history to reload.
    #[error("no page has been loaded")]
    NoHistory,
}

/// Browser settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserConfig {
    /// How fetched documents are parsed.
    pub parser: ParserConfig,
}

impl BrowserConfig {
    /// Use `parser` for every fetched document.
    #[must_use]
    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }
}

#[derive(Debug)]
struct Loaded {
    response: Response,
    page: Page,
}

/// A minimal scripted browser.
///
/// Each successful `get`, `post` or navigation replaces the current page.
/// `get` and `post` also record a history entry; `retry`, `back` and
/// `forward` refetch an entry already recorded.
#[derive(Debug)]
pub struct Browser<F> {
    fetcher: F,
    config: BrowserConfig,
    history: History,
    current: Option<Loaded>,
}

impl<F: Fetcher> Browser<F> {
    /// Browser with the default configuration.
    #[must_use]
    pub fn new(fetcher: F) -> Self {
        Self::with_config(fetcher, BrowserConfig::default())
    }

    /// Browser with an explicit configuration.
    #[must_use]
    pub const fn with_config(fetcher: F, config: BrowserConfig) -> Self {
        Self {
            fetcher,
            config,
            history: History::new(),
            current: None,
        }
    }

    /// Fetch `url` (relative to the current page) and return its content.
    ///
    /// # Errors
    ///
    /// Fails if the URL does not resolve, the fetch fails or the document
    /// cannot be parsed. The current page is kept on failure.
    pub fn get(&mut self, url: &str) -> Result<&str, BrowserError> {
        let url = self.resolve_request_url(url)?;
        self.load(Request::get(url), true)?;
        Ok(self.content().unwrap_or_default())
    }

    /// Post form `fields` to `url` (relative to the current page) and return
    /// the response content.
    ///
    /// # Errors
    ///
    /// As for [`Browser::get`].
    pub fn post(&mut self, url: &str, fields: &[(&str, &str)]) -> Result<&str, BrowserError> {
        let url = self.resolve_request_url(url)?;
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.load(Request::post(url, body), true)?;
        Ok(self.content().unwrap_or_default())
    }

    /// Send a `HEAD` request. The response replaces the current page (with an
    /// empty one) but is not recorded in the history.
    ///
    /// Returns whether the status was 2xx.
    ///
    /// # Errors
    ///
    /// Fails if the URL does not resolve or the fetch fails.
    pub fn head(&mut self, url: &str) -> Result<bool, BrowserError> {
        let url = self.resolve_request_url(url)?;
        self.load(Request::head(url), false)?;
        Ok(self.current.as_ref().is_some_and(|loaded| loaded.response.is_success()))
    }

    /// Refetch the history entry at the cursor and return its content.
    ///
    /// # Errors
    ///
    /// [`BrowserError::NoHistory`] before the first visit; otherwise as for
    /// [`Browser::get`].
    pub fn retry(&mut self) -> Result<&str, BrowserError> {
        self.reload()?;
        Ok(self.content().unwrap_or_default())
    }

    /// Go back one entry. Returns false, touching nothing, at the start of
    /// the history.
    ///
    /// # Errors
    ///
    /// If the refetch fails the history cursor is restored and the error
    /// returned.
    pub fn back(&mut self) -> Result<bool, BrowserError> {
        if !self.history.back() {
            return Ok(false);
        }
        if let Err(err) = self.reload() {
            let _ = self.history.forward();
            return Err(err);
        }
        Ok(true)
    }

    /// Go forward one entry. Returns false, touching nothing, at the end of
    /// the history.
    ///
    /// # Errors
    ///
    /// If the refetch fails the history cursor is restored and the error
    /// returned.
    pub fn forward(&mut self) -> Result<bool, BrowserError> {
        if !self.history.forward() {
            return Ok(false);
        }
        if let Err(err) = self.reload() {
            let _ = self.history.back();
            return Err(err);
        }
        Ok(true)
    }

    /// The current page.
    #[must_use]
    pub fn page(&self) -> Option<&Page> {
        self.current.as_ref().map(|loaded| &loaded.page)
    }

    /// URL of the current page.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.current.as_ref().map(|loaded| &loaded.response.url)
    }

    /// The URL relative links resolve against: the page's `<base href>` when
    /// it parses, else the page URL.
    #[must_use]
    pub fn base_url(&self) -> Option<Url> {
        let url = self.url()?;
        let base = self
            .page()
            .and_then(Page::base_url)
            .and_then(|base| url.join(base).ok());
        Some(base.unwrap_or_else(|| url.clone()))
    }

    /// Title of the current page.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.page().and_then(Page::title)
    }

    /// Status code of the last response.
    #[must_use]
    pub fn response_code(&self) -> Option<u16> {
        self.current.as_ref().map(|loaded| loaded.response.status)
    }

    /// `Content-Type` of the last response.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.current
            .as_ref()
            .and_then(|loaded| loaded.response.content_type.as_deref())
    }

    /// Raw body of the last response.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.current
            .as_ref()
            .map(|loaded| loaded.response.body.as_str())
    }

    /// Every link on the page, resolved. Hrefs that do not resolve are
    /// skipped.
    #[must_use]
    pub fn absolute_link_urls(&self) -> Vec<Url> {
        self.page()
            .map(|page| self.resolve_all(page.links().iter().map(|link| link.href.as_str())))
            .unwrap_or_default()
    }

    /// Every frame source on the page, resolved.
    #[must_use]
    pub fn frame_urls(&self) -> Vec<Url> {
        self.page()
            .map(|page| self.resolve_all(page.frames().iter().map(|frame| frame.src.as_str())))
            .unwrap_or_default()
    }

    /// The navigation history.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// The underlying fetcher.
    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn resolve_request_url(&self, input: &str) -> Result<Url, BrowserError> {
        let resolved = match self.url() {
            Some(current) => current.join(input),
            None => Url::parse(input),
        };
        resolved.map_err(|source| BrowserError::Url {
            input: input.to_string(),
            source,
        })
    }

    fn resolve_all<'h>(&self, hrefs: impl Iterator<Item = &'h str>) -> Vec<Url> {
        let Some(base) = self.base_url() else {
            return Vec::new();
        };
        hrefs.filter_map(|href| base.join(href).ok()).collect()
    }

    fn reload(&mut self) -> Result<(), BrowserError> {
        let request = self
            .history
            .request()
            .cloned()
            .ok_or(BrowserError::NoHistory)?;
        self.load(request, false)
    }

    fn load(&mut self, request: Request, record: bool) -> Result<(), BrowserError> {
        clear_warnings();
        let response = self.fetcher.fetch(&request)?;
        let page = if request.method == Method::Head {
            Page::new(Some(response.url.to_string()))
        } else {
            PageBuilder::parse_at(&response.body, Some(response.url.as_str()), &self.config.parser)
                .map_err(|source| BrowserError::Parse {
                    url: response.url.clone(),
                    source,
                })?
        };
        tracing::debug!(url = %response.url, status = response.status, record, "loaded");
        if record {
            self.history.record_entry(response.url.clone(), request);
        }
        self.current = Some(Loaded { response, page });
        Ok(())
    }
}
