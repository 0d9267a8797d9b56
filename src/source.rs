//! Where documents come from.
//!
//! [`ContentSource`] is the single seam between pages and the content
//! store. Pages call the typed helpers [`fetch_many`] and [`fetch_one`];
//! implementations only deal in raw JSON.
//!
//! - [`HttpSource`](crate::client::HttpSource): the hosted query API
//! - [`LocalSource`]: an NDJSON dataset export evaluated in-process
//! - [`CachedSource`](crate::cache::CachedSource): revalidation cache over either
//! - [`SiteSource`]: whichever backend a command was started with

use crate::client::{ClientError, HttpSource};
use crate::config::ContentConfig;
use crate::query::Query;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default time a fetched result may be reused.
pub const DEFAULT_REVALIDATE: Duration = Duration::from_secs(30);

/// Per-fetch hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// How long the result may be served from cache. `None` bypasses it.
    pub revalidate: Option<Duration>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            revalidate: Some(DEFAULT_REVALIDATE),
        }
    }
}

impl FetchOptions {
    pub fn revalidate(after: Duration) -> Self {
        Self {
            revalidate: Some(after),
        }
    }

    /// Always go to the store.
    pub fn fresh() -> Self {
        Self { revalidate: None }
    }
}

/// Runs queries against a content store.
pub trait ContentSource: Send + Sync + 'static {
    /// Execute `query` and return the raw result: an array, a single
    /// document, or `null`.
    fn fetch(
        &self,
        query: &Query,
        options: FetchOptions,
    ) -> impl Future<Output = Result<Value, ClientError>> + Send;
}

/// Fetch a list of documents.
///
/// `null` and `[]` both yield an empty list. Documents that do not
/// deserialize are skipped with a warning so one bad entry cannot take a
/// whole page down.
pub async fn fetch_many<T, S>(
    source: &S,
    query: &Query,
    options: FetchOptions,
) -> Result<Vec<T>, ClientError>
where
    T: DeserializeOwned,
    S: ContentSource + ?Sized,
{
    let items = match source.fetch(query, options).await? {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        single => vec![single],
    };
    let total = items.len();
    let docs: Vec<T> = items
        .into_iter()
        .filter_map(|item| {
            serde_json::from_value(item)
                .inspect_err(|e| warn!(query = query.name(), error = %e, "Skipping document"))
                .ok()
        })
        .collect();
    debug!(query = query.name(), total, kept = docs.len(), "Fetched documents");
    Ok(docs)
}

/// Fetch at most one document. Absent → `None`.
pub async fn fetch_one<T, S>(
    source: &S,
    query: &Query,
    options: FetchOptions,
) -> Result<Option<T>, ClientError>
where
    T: DeserializeOwned,
    S: ContentSource + ?Sized,
{
    match source.fetch(query, options).await? {
        Value::Null => Ok(None),
        Value::Array(items) => match items.into_iter().next() {
            Some(first) => Ok(Some(serde_json::from_value(first)?)),
            None => Ok(None),
        },
        doc => Ok(Some(serde_json::from_value(doc)?)),
    }
}

// =============================================================================
// Dataset export
// =============================================================================

const DRAFT_PREFIX: &str = "drafts.";

/// Documents loaded from a dataset export, queried in memory.
///
/// Draft documents are dropped on load, matching what the public API
/// returns to unauthenticated readers.
#[derive(Debug, Clone, Default)]
pub struct LocalSource {
    documents: Vec<Value>,
}

impl LocalSource {
    pub fn from_documents(documents: Vec<Value>) -> Self {
        let documents = documents.into_iter().filter(|d| !is_draft(d)).collect();
        Self { documents }
    }

    /// Parse NDJSON: one document per line, blank lines ignored.
    pub fn from_ndjson(text: &str) -> Result<Self, ClientError> {
        let mut documents = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let doc = serde_json::from_str(line).map_err(|source| ClientError::Dataset {
                line: idx + 1,
                source,
            })?;
            documents.push(doc);
        }
        Ok(Self::from_documents(documents))
    }

    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let text = std::fs::read_to_string(path)?;
        let source = Self::from_ndjson(&text)?;
        debug!(path = %path.display(), documents = source.len(), "Loaded dataset export");
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The published documents, in export order.
    pub fn documents(&self) -> &[Value] {
        &self.documents
    }
}

fn is_draft(document: &Value) -> bool {
    document
        .get("_id")
        .and_then(Value::as_str)
        .is_some_and(|id| id.starts_with(DRAFT_PREFIX))
}

impl ContentSource for LocalSource {
    async fn fetch(&self, query: &Query, _options: FetchOptions) -> Result<Value, ClientError> {
        Ok(query.evaluate(&self.documents))
    }
}

// =============================================================================
// Source selection
// =============================================================================

/// The source a command runs against, chosen at startup.
#[derive(Debug, Clone)]
pub enum SiteSource {
    Local(LocalSource),
    Http(HttpSource),
}

impl SiteSource {
    /// A dataset export wins when given. Otherwise the hosted API is used if
    /// a project is configured, and an empty store if not.
    pub fn open(config: &ContentConfig, export: Option<&Path>) -> Result<Self, ClientError> {
        if let Some(path) = export {
            return Ok(SiteSource::Local(LocalSource::load(path)?));
        }
        match HttpSource::new(config) {
            Ok(http) => {
                info!(endpoint = %http.endpoint(), "Using hosted content store");
                Ok(SiteSource::Http(http))
            }
            Err(ClientError::NotConfigured(key)) => {
                warn!(missing = key, "No content store configured, CMS-backed pages will be empty");
                Ok(SiteSource::Local(LocalSource::default()))
            }
            Err(e) => Err(e),
        }
    }
}

impl ContentSource for SiteSource {
    async fn fetch(&self, query: &Query, options: FetchOptions) -> Result<Value, ClientError> {
        match self {
            SiteSource::Local(local) => local.fetch(query, options).await,
            SiteSource::Http(http) => http.fetch(query, options).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query;
    use crate::types::{EventDoc, PostDoc};
    use serde_json::json;

    const EXPORT: &str = r#"
{"_type": "post", "_id": "p1", "title": "Club AGM", "slug": {"current": "club-agm"}, "publishedAt": "2025-02-01T09:00:00Z"}
{"_type": "post", "_id": "drafts.p1", "title": "Club AGM (draft)", "slug": {"current": "club-agm"}}

{"_type": "event", "_id": "e1", "title": "Parkrun", "slug": {"current": "parkrun"}, "isAtFinnValley": true}
"#;

    #[tokio::test]
    async fn ndjson_export_skips_drafts_and_blank_lines() {
        let source = LocalSource::from_ndjson(EXPORT).unwrap();
        assert_eq!(source.len(), 2);

        let post: Option<PostDoc> =
            fetch_one(&source, &query::post_by_slug("club-agm"), FetchOptions::default())
                .await
                .unwrap();
        assert_eq!(post.unwrap().title, "Club AGM");
    }

    #[test]
    fn ndjson_reports_bad_line() {
        let err = LocalSource::from_ndjson("{\"_id\": \"a\"}\n{oops\n").unwrap_err();
        assert!(matches!(err, ClientError::Dataset { line: 2, .. }));
    }

    #[tokio::test]
    async fn fetch_many_tolerates_empty_results() {
        let empty = LocalSource::default();
        let events: Vec<EventDoc> =
            fetch_many(&empty, &query::events_list(), FetchOptions::default())
                .await
                .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn fetch_one_absent_is_none() {
        let source = LocalSource::from_ndjson(EXPORT).unwrap();
        let event: Option<EventDoc> =
            fetch_one(&source, &query::event_by_slug("missing"), FetchOptions::fresh())
                .await
                .unwrap();
        assert!(event.is_none());
    }

    #[tokio::test]
    async fn fetch_many_skips_undecodable_documents() {
        let source = LocalSource::from_documents(vec![
            json!({"_type": "post", "_id": "ok", "title": "Fine", "slug": {"current": "fine"}}),
            json!({"_type": "post", "_id": "bad", "title": 42, "slug": {"current": "bad"}}),
        ]);
        #[derive(serde::Deserialize)]
        struct Titled {
            #[serde(rename = "_id")]
            id: String,
            #[allow(dead_code)]
            title: String,
        }
        let posts: Vec<Titled> =
            fetch_many(&source, &query::posts_list(), FetchOptions::default())
                .await
                .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "ok");
    }

    #[test]
    fn open_prefers_dataset_export() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("export.ndjson");
        std::fs::write(&path, EXPORT).unwrap();
        let mut config = ContentConfig::default();
        config.project_id = Some("t79osmcf".into());
        let source = SiteSource::open(&config, Some(&path)).unwrap();
        assert!(matches!(source, SiteSource::Local(local) if local.len() == 2));
    }

    #[test]
    fn open_without_project_is_empty_store() {
        let source = SiteSource::open(&ContentConfig::default(), None).unwrap();
        assert!(matches!(source, SiteSource::Local(local) if local.is_empty()));
    }

    #[test]
    fn open_with_project_uses_http() {
        let mut config = ContentConfig::default();
        config.project_id = Some("t79osmcf".into());
        let source = SiteSource::open(&config, None).unwrap();
        assert!(matches!(source, SiteSource::Http(_)));
    }

    #[test]
    fn open_missing_export_is_io_error() {
        let err = SiteSource::open(&ContentConfig::default(), Some(Path::new("/nonexistent/x.ndjson")))
            .unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[test]
    fn fetch_options_defaults_to_thirty_seconds() {
        assert_eq!(FetchOptions::default().revalidate, Some(Duration::from_secs(30)));
        assert_eq!(FetchOptions::fresh().revalidate, None);
    }
}
