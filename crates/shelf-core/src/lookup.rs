//! OpenLibrary metadata lookup
//!
//! Fetches title, author and year for an isbn from the OpenLibrary search
//! API so a book can be added without typing its details.
//!
//! Lookups are best-effort: every failure (network, HTTP status, bad JSON)
//! is logged and reported as `Lookup::NotFound`. Nothing here ever returns
//! an error to the caller of [`LookupClient::lookup`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::NewBook;

/// OpenLibrary search endpoint
pub const DEFAULT_LOOKUP_URL: &str = "https://openlibrary.org/search.json";

/// Fetch timeout in seconds. Hitting it counts as a transport failure and is
/// never retried.
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Author used when a result lists none
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Title used when a result has none
pub const UNKNOWN_TITLE: &str = "N/A";

/// Book details found for an isbn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookCandidate {
    pub title: String,
    pub author: String,
    pub year: i64,
    pub isbn: String,
}

impl From<BookCandidate> for NewBook {
    fn from(candidate: BookCandidate) -> Self {
        NewBook::new(
            candidate.title,
            candidate.author,
            candidate.isbn,
            candidate.year,
        )
    }
}

/// Result of a lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(BookCandidate),
    NotFound,
}

/// Why a lookup produced nothing
#[derive(Error, Debug)]
pub enum LookupError {
    /// Connection, TLS, timeout or body read failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),

    /// Body was not the expected JSON
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Search response envelope
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "numFound", default)]
    num_found: u64,
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

/// One search hit
#[derive(Debug, Deserialize)]
struct SearchDoc {
    title: Option<String>,
    author_name: Option<Vec<String>>,
    first_publish_year: Option<i64>,
}

/// OpenLibrary search client
#[derive(Debug, Clone)]
pub struct LookupClient {
    http: reqwest::Client,
    base_url: String,
}

impl LookupClient {
    /// Create a client for the given search endpoint
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("shelf/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Look up an isbn
    ///
    /// Returns `Lookup::NotFound` on zero results and on any failure.
    pub async fn lookup(&self, isbn: &str) -> Lookup {
        match self.fetch(isbn).await {
            Ok(Some(candidate)) => {
                debug!(isbn = %isbn, title = %candidate.title, "Found book on OpenLibrary");
                Lookup::Found(candidate)
            }
            Ok(None) => {
                info!(isbn = %isbn, "No book found on OpenLibrary");
                Lookup::NotFound
            }
            Err(e) => {
                warn!(isbn = %isbn, error = %e, "Failed to fetch or parse data from OpenLibrary");
                Lookup::NotFound
            }
        }
    }

    /// Inner fetch that can fail
    async fn fetch(&self, isbn: &str) -> Result<Option<BookCandidate>, LookupError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("isbn", isbn)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let body = response.bytes().await?;
        let search: SearchResponse = serde_json::from_slice(&body)?;
        Ok(first_candidate(search, isbn))
    }
}

/// Turn a search response into a candidate, using only the first hit
fn first_candidate(search: SearchResponse, isbn: &str) -> Option<BookCandidate> {
    if search.num_found == 0 {
        return None;
    }
    let doc = search.docs.into_iter().next()?;

    let author = match doc.author_name {
        Some(names) if !names.is_empty() => names.join(", "),
        _ => UNKNOWN_AUTHOR.to_string(),
    };

    Some(BookCandidate {
        title: doc.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        author,
        year: doc.first_publish_year.unwrap_or(0),
        isbn: isbn.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::SocketAddr;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    fn parse(body: serde_json::Value) -> SearchResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_zero_results() {
        let search = parse(json!({"numFound": 0, "docs": []}));
        assert!(first_candidate(search, "0000000000").is_none());
    }

    #[test]
    fn test_count_without_docs() {
        let search = parse(json!({"numFound": 3}));
        assert!(first_candidate(search, "1").is_none());
    }

    #[test]
    fn test_first_doc_used() {
        let search = parse(json!({
            "numFound": 2,
            "docs": [
                {"title": "Test Book", "author_name": ["Test Author"], "first_publish_year": 2023},
                {"title": "Other Book", "author_name": ["Someone"], "first_publish_year": 1900}
            ]
        }));

        let candidate = first_candidate(search, "1234567890").unwrap();
        assert_eq!(
            candidate,
            BookCandidate {
                title: "Test Book".to_string(),
                author: "Test Author".to_string(),
                year: 2023,
                isbn: "1234567890".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_author_and_year() {
        let search = parse(json!({"numFound": 1, "docs": [{"title": "Anonymous"}]}));

        let candidate = first_candidate(search, "1").unwrap();
        assert_eq!(candidate.author, UNKNOWN_AUTHOR);
        assert_eq!(candidate.year, 0);
    }

    #[test]
    fn test_empty_author_list() {
        let search = parse(json!({"numFound": 1, "docs": [{"title": "X", "author_name": []}]}));
        assert_eq!(first_candidate(search, "1").unwrap().author, "unknown");
    }

    #[test]
    fn test_multiple_authors_joined() {
        let search = parse(json!({
            "numFound": 1,
            "docs": [{"title": "Good Omens", "author_name": ["Terry Pratchett", "Neil Gaiman"]}]
        }));
        assert_eq!(
            first_candidate(search, "1").unwrap().author,
            "Terry Pratchett, Neil Gaiman"
        );
    }

    #[test]
    fn test_missing_title() {
        let search = parse(json!({"numFound": 1, "docs": [{"author_name": ["A"]}]}));
        assert_eq!(first_candidate(search, "1").unwrap().title, UNKNOWN_TITLE);
    }

    #[test]
    fn test_candidate_into_new_book() {
        let new: NewBook = BookCandidate {
            title: "T".to_string(),
            author: "A".to_string(),
            year: 1999,
            isbn: "9".to_string(),
        }
        .into();
        assert_eq!(new, NewBook::new("T", "A", "9", 1999));
        assert!(new.available);
    }

    async fn fake_search(Query(params): Query<HashMap<String, String>>) -> Response {
        match params.get("isbn").map(String::as_str) {
            Some("9780441013593") => Json(json!({
                "numFound": 1,
                "docs": [{"title": "Dune", "author_name": ["Frank Herbert"], "first_publish_year": 1965}]
            }))
            .into_response(),
            Some("0000000000") => Json(json!({"numFound": 0, "docs": []})).into_response(),
            Some("500") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            Some("garbage") => "<html>definitely not json</html>".into_response(),
            Some("slow") => {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({"numFound": 0, "docs": []})).into_response()
            }
            _ => StatusCode::BAD_REQUEST.into_response(),
        }
    }

    async fn spawn_fake_openlibrary() -> SocketAddr {
        let app = Router::new().route("/search.json", get(fake_search));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client_for(addr: SocketAddr) -> LookupClient {
        LookupClient::new(
            format!("http://{}/search.json", addr),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_lookup_found() {
        let client = client_for(spawn_fake_openlibrary().await);

        let Lookup::Found(candidate) = client.lookup("9780441013593").await else {
            panic!("expected a result for a known isbn");
        };
        assert_eq!(candidate.title, "Dune");
        assert_eq!(candidate.author, "Frank Herbert");
        assert_eq!(candidate.year, 1965);
        assert_eq!(candidate.isbn, "9780441013593");
    }

    #[tokio::test]
    async fn test_lookup_not_found() {
        let client = client_for(spawn_fake_openlibrary().await);
        assert_eq!(client.lookup("0000000000").await, Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_server_error_is_not_found() {
        let client = client_for(spawn_fake_openlibrary().await);
        assert_eq!(client.lookup("500").await, Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_malformed_body_is_not_found() {
        let client = client_for(spawn_fake_openlibrary().await);
        assert_eq!(client.lookup("garbage").await, Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_connection_refused_is_not_found() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(addr);
        assert_eq!(client.lookup("9780441013593").await, Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_timeout_is_not_found_without_retry() {
        let addr = spawn_fake_openlibrary().await;
        let client = LookupClient::new(
            format!("http://{}/search.json", addr),
            Duration::from_millis(200),
        )
        .unwrap();

        let started = std::time::Instant::now();
        assert_eq!(client.lookup("slow").await, Lookup::NotFound);
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
