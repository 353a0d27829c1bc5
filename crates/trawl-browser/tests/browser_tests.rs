//! Integration tests for navigation over an in-memory fetcher.

use std::cell::RefCell;
use std::collections::HashMap;

use trawl_browser::{
    Browser, BrowserConfig, BrowserError, FetchError, Fetcher, Method, Request, Response,
};
use trawl_html::ParserConfig;
use url::Url;

/// Serves canned documents and remembers every request.
#[derive(Default)]
struct FakeFetcher {
    documents: RefCell<HashMap<String, (u16, String)>>,
    requests: RefCell<Vec<Request>>,
}

impl FakeFetcher {
    fn serve(self, url: &str, body: &str) -> Self {
        self.serve_status(url, 200, body)
    }

    fn serve_status(self, url: &str, status: u16, body: &str) -> Self {
        let _ = self
            .documents
            .borrow_mut()
            .insert(url.to_string(), (status, body.to_string()));
        self
    }

    fn remove(&self, url: &str) {
        let _ = self.documents.borrow_mut().remove(url);
    }

    fn last_request(&self) -> Request {
        self.requests.borrow().last().cloned().unwrap()
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.requests.borrow_mut().push(request.clone());
        let documents = self.documents.borrow();
        let Some((status, body)) = documents.get(request.url.as_str()) else {
            return Err(FetchError::Unavailable {
                url: request.url.clone(),
                reason: "not served".to_string(),
            });
        };
        Ok(Response {
            url: request.url.clone(),
            status: *status,
            content_type: Some("text/html".to_string()),
            body: if request.method == Method::Head {
                String::new()
            } else {
                body.clone()
            },
        })
    }
}

fn site() -> FakeFetcher {
    FakeFetcher::default()
        .serve(
            "http://site.test/",
            r#"<title>Home</title><a href="about.html">About</a><a href="/docs/">Docs</a>"#,
        )
        .serve("http://site.test/about.html", "<title>About</title>")
        .serve(
            "http://site.test/docs/",
            r#"<base href="http://cdn.test/v1/"><a href="guide.html">Guide</a>"#,
        )
}

fn urls(list: &[Url]) -> Vec<&str> {
    list.iter().map(Url::as_str).collect()
}

#[test]
fn test_get_parses_page() {
    let mut browser = Browser::new(site());
    let content = browser.get("http://site.test/").unwrap();
    assert!(content.starts_with("<title>Home"));
    assert_eq!(browser.title(), Some("Home"));
    assert_eq!(browser.response_code(), Some(200));
    assert_eq!(browser.mime_type(), Some("text/html"));
    assert_eq!(browser.page().unwrap().links().len(), 2);
    assert_eq!(
        urls(&browser.absolute_link_urls()),
        vec!["http://site.test/about.html", "http://site.test/docs/"]
    );
}

#[test]
fn test_relative_get_uses_current_url() {
    let mut browser = Browser::new(site());
    let _ = browser.get("http://site.test/").unwrap();
    let _ = browser.get("about.html").unwrap();
    assert_eq!(browser.url().map(Url::as_str), Some("http://site.test/about.html"));
    assert_eq!(browser.title(), Some("About"));
}

#[test]
fn test_base_href_wins_for_links() {
    let mut browser = Browser::new(site());
    let _ = browser.get("http://site.test/docs/").unwrap();
    assert_eq!(browser.base_url().map(|u| u.to_string()).as_deref(), Some("http://cdn.test/v1/"));
    assert_eq!(urls(&browser.absolute_link_urls()), vec!["http://cdn.test/v1/guide.html"]);
}

#[test]
fn test_relative_url_without_page_fails() {
    let mut browser = Browser::new(site());
    let err = browser.get("about.html").unwrap_err();
    assert!(matches!(err, BrowserError::Url { .. }), "{err:?}");
    assert!(browser.page().is_none());
}

#[test]
fn test_back_and_forward() {
    let mut browser = Browser::new(site());
    let _ = browser.get("http://site.test/").unwrap();
    let _ = browser.get("http://site.test/about.html").unwrap();

    assert!(browser.back().unwrap());
    assert_eq!(browser.title(), Some("Home"));
    assert!(!browser.back().unwrap());

    assert!(browser.forward().unwrap());
    assert_eq!(browser.title(), Some("About"));
    assert!(!browser.forward().unwrap());
    assert_eq!(browser.history().len(), 2);
}

#[test]
fn test_failed_back_restores_position() {
    let mut browser = Browser::new(site());
    let _ = browser.get("http://site.test/").unwrap();
    let _ = browser.get("http://site.test/about.html").unwrap();
    browser.fetcher().remove("http://site.test/");

    assert!(matches!(browser.back(), Err(BrowserError::Fetch(_))));
    assert_eq!(
        browser.history().url().map(Url::as_str),
        Some("http://site.test/about.html")
    );
    // The page shown is still the last one that loaded.
    assert_eq!(browser.title(), Some("About"));
}

#[test]
fn test_retry_refetches_without_recording() {
    let mut browser = Browser::new(site());
    assert!(matches!(browser.retry(), Err(BrowserError::NoHistory)));
    let _ = browser.get("http://site.test/").unwrap();
    let _ = browser.retry().unwrap();
    assert_eq!(browser.history().len(), 1);
    assert_eq!(browser.fetcher().requests.borrow().len(), 2);
}

#[test]
fn test_post_encodes_fields() {
    let fetcher = site().serve("http://site.test/login", "<title>Welcome</title>");
    let mut browser = Browser::new(fetcher);
    let _ = browser
        .post("http://site.test/login", &[("user", "a b"), ("pass", "x&y")])
        .unwrap();
    let request = browser.fetcher().last_request();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.body.as_deref(), Some("user=a+b&pass=x%26y"));
    assert_eq!(browser.title(), Some("Welcome"));

    // Retrying a post sends the body again.
    let _ = browser.retry().unwrap();
    assert_eq!(browser.fetcher().last_request(), request);
}

#[test]
fn test_head_is_not_recorded() {
    let mut browser = Browser::new(site().serve_status("http://site.test/gone", 404, ""));
    let _ = browser.get("http://site.test/").unwrap();
    assert!(!browser.head("gone").unwrap());
    assert_eq!(browser.response_code(), Some(404));
    assert_eq!(browser.history().len(), 1);
    assert_eq!(browser.fetcher().last_request().method, Method::Head);
}

#[test]
fn test_error_status_is_still_a_page() {
    let fetcher =
        FakeFetcher::default().serve_status("http://site.test/", 500, "<title>Oops</title>");
    let mut browser = Browser::new(fetcher);
    let _ = browser.get("http://site.test/").unwrap();
    assert_eq!(browser.response_code(), Some(500));
    assert_eq!(browser.title(), Some("Oops"));
}

#[test]
fn test_frame_urls() {
    let fetcher = FakeFetcher::default().serve(
        "http://site.test/frames/index.html",
        r#"<frameset><frame src="top.html"><frame src="/nav.html"></frameset>"#,
    );
    let mut browser = Browser::new(fetcher);
    let _ = browser.get("http://site.test/frames/index.html").unwrap();
    assert_eq!(
        urls(&browser.frame_urls()),
        vec!["http://site.test/frames/top.html", "http://site.test/nav.html"]
    );
}

#[test]
fn test_parser_config_is_used() {
    let config = BrowserConfig::default().with_parser(ParserConfig::default().with_tags(["img"]));
    let mut browser = Browser::with_config(site(), config);
    let _ = browser.get("http://site.test/").unwrap();
    assert!(browser.page().unwrap().links().is_empty());
    assert_eq!(browser.title(), None);
}
