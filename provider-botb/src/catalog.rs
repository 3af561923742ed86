//! Catalog API client
//!
//! Thin wrapper over the Battle of the Bits JSON API. One GET per call, no
//! retries: a 404 is a [`CatalogOutcome::NotFound`], anything else that breaks
//! the response contract is an error.

use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use crate::error::{BotbError, Result};
use crate::types::{CatalogOutcome, CatalogRecord};

/// Battle of the Bits catalog client
pub struct CatalogClient {
    http_client: Arc<dyn HttpClient>,
    api_base: String,
    timeout: Duration,
}

impl CatalogClient {
    /// Create a client for `api_base` (no trailing slash).
    pub fn new(http_client: Arc<dyn HttpClient>, api_base: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client,
            api_base: api_base.into(),
            timeout,
        }
    }

    pub fn entry_url(&self, id: &str) -> String {
        format!("{}/entry/load/{}", self.api_base, id)
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/entry/search/{}.json",
            self.api_base,
            urlencoding::encode(query)
        )
    }

    /// Load a single entry by id.
    #[instrument(skip(self))]
    pub async fn fetch_entry(&self, id: &str) -> Result<CatalogOutcome<CatalogRecord>> {
        let url = self.entry_url(id);
        let Some((status, body)) = self.load_json(&url).await? else {
            return Ok(CatalogOutcome::NotFound);
        };

        if !body.is_object() {
            return Err(malformed(&url, status, "entry body is not a JSON object"));
        }

        let record = parse_record(&url, status, body)?;
        Ok(CatalogOutcome::Found(record))
    }

    /// Run a search and return its records, in service order.
    ///
    /// Only the first result must be a valid entry; later ones that fail to
    /// parse are skipped. An empty result list is [`CatalogOutcome::NotFound`].
    #[instrument(skip(self))]
    pub async fn search_entries(&self, query: &str) -> Result<CatalogOutcome<Vec<CatalogRecord>>> {
        let url = self.search_url(query);
        let Some((status, body)) = self.load_json(&url).await? else {
            return Ok(CatalogOutcome::NotFound);
        };

        let Value::Array(items) = body else {
            return Err(malformed(&url, status, "search body is not a JSON array"));
        };

        if items.is_empty() {
            debug!("Search returned no entries");
            return Ok(CatalogOutcome::NotFound);
        }

        let mut items = items.into_iter();
        let first = match items.next() {
            Some(item) if item.is_object() => parse_record(&url, status, item)?,
            _ => return Err(malformed(&url, status, "first search result is not a JSON object")),
        };

        let mut records = vec![first];
        for (index, item) in items.enumerate() {
            match serde_json::from_value::<CatalogRecord>(item) {
                Ok(record) => records.push(record),
                Err(e) => warn!(index = index + 1, error = %e, "Skipping unparseable search result"),
            }
        }

        debug!("Search returned {} entries", records.len());
        Ok(CatalogOutcome::Found(records))
    }

    /// GET `url` and parse the body. `Ok(None)` on 404.
    async fn load_json(&self, url: &str) -> Result<Option<(u16, Value)>> {
        let request = HttpRequest::get(url)
            .header("Accept", "application/json")
            .timeout(self.timeout);

        let response = self.http_client.execute(request).await.map_err(|e| {
            if e.is_network() {
                BotbError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            } else {
                BotbError::Bridge(e)
            }
        })?;

        debug!(status = response.status, "Catalog responded");

        if response.status == 404 {
            return Ok(None);
        }

        let body = check_body(url, &response)?;
        debug!(body = %body, "Catalog JSON");
        Ok(Some((response.status, body)))
    }
}

fn check_body(url: &str, response: &HttpResponse) -> Result<Value> {
    if !response.is_success() {
        return Err(malformed(url, response.status, "unexpected status"));
    }

    if response.body.is_empty() {
        return Err(malformed(url, response.status, "empty body"));
    }

    response
        .json::<Value>()
        .map_err(|e| malformed(url, response.status, &e.to_string()))
}

fn parse_record(url: &str, status: u16, value: Value) -> Result<CatalogRecord> {
    serde_json::from_value(value).map_err(|e| malformed(url, status, &format!("bad entry: {}", e)))
}

fn malformed(url: &str, status: u16, reason: &str) -> BotbError {
    error!(url, status, reason, "Catalog contract violation");
    BotbError::MalformedResponse {
        url: url.to_string(),
        status,
        reason: reason.to_string(),
    }
}
