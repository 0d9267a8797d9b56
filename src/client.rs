//! HTTP client for the hosted content query API.
//!
//! Queries are sent as `GET` requests:
//!
//! ```text
//! https://{projectId}.{api|apicdn}.sanity.io/v{apiVersion}/data/query/{dataset}?query=…&$slug="…"
//! ```
//!
//! Each bound parameter travels as its own `$name` query pair with a
//! JSON-encoded value. The response wraps the result in an envelope,
//! `{"result": …, "ms": …}`; only `result` is handed back.

use crate::config::ContentConfig;
use crate::query::Query;
use crate::source::{ContentSource, FetchOptions};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ERROR_BODY: usize = 300;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("content store not configured: {0} is missing")]
    NotConfigured(&'static str),
    #[error("invalid content API URL: {0}")]
    Url(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("content store returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("dataset export line {line}: {source}")]
    Dataset {
        line: usize,
        source: serde_json::Error,
    },
    /// A fetch failure handed out by the revalidation cache, which shares it
    /// between every caller waiting on the same query.
    #[error(transparent)]
    Cached(Arc<ClientError>),
}

impl ClientError {
    /// The underlying failure, looking through [`ClientError::Cached`].
    pub fn cause(&self) -> &ClientError {
        match self {
            ClientError::Cached(inner) => inner.cause(),
            other => other,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    ms: Option<u64>,
}

/// Talks to the hosted query API of one project and dataset.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: Url,
}

impl HttpSource {
    /// Build a client for the configured project and dataset.
    pub fn new(config: &ContentConfig) -> Result<Self, ClientError> {
        let project_id = config
            .project_id
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(ClientError::NotConfigured("content.project_id"))?;
        let dataset = config
            .dataset
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or(ClientError::NotConfigured("content.dataset"))?;

        let host = if config.use_cdn { "apicdn" } else { "api" };
        let version = config.api_version.trim_start_matches('v');
        let endpoint = format!(
            "https://{project_id}.{host}.sanity.io/v{version}/data/query/{dataset}"
        );
        let endpoint = Url::parse(&endpoint).map_err(|e| ClientError::Url(e.to_string()))?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// Point the client at a different query endpoint, keeping everything else.
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The full request URL for `query`.
    pub fn query_url(&self, query: &Query) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &query.to_groq());
            for (name, value) in query.params() {
                pairs.append_pair(&format!("${name}"), &value.to_string());
            }
        }
        url
    }
}

impl ContentSource for HttpSource {
    #[tracing::instrument(skip_all, fields(query = query.name()))]
    async fn fetch(&self, query: &Query, _options: FetchOptions) -> Result<Value, ClientError> {
        let url = self.query_url(query);
        debug!(%url, "Querying content store");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let envelope: QueryResponse = response.json().await?;
        info!(ms = envelope.ms, "Fetched from content store");
        Ok(envelope.result)
    }
}
