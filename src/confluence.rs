//! Blocking REST client for a Confluence-style wiki.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use tracing::debug;

use crate::{
    config::StoreConfig,
    error::{Error, Result},
    space::{Space, SpaceDirectory},
    store::{Document, DocumentStoreClient, Page, PageStore},
};

/// Longest error body kept in [`Error::Api`].
const MAX_ERROR_BODY: usize = 300;

const PAGE_EXPAND: &str = "body.storage,version";

#[derive(Debug, Deserialize)]
struct Listing<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    content: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct Content {
    id: String,
    #[serde(default)]
    title: String,
    body: Option<ContentBody>,
    version: Option<ContentVersion>,
}

#[derive(Debug, Deserialize)]
struct ContentBody {
    storage: Option<StorageValue>,
}

#[derive(Debug, Deserialize)]
struct StorageValue {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct ContentVersion {
    number: u64,
}

impl From<Content> for Page {
    fn from(content: Content) -> Self {
        Page {
            id: content.id,
            title: content.title,
            body_html: content
                .body
                .and_then(|b| b.storage)
                .map(|s| s.value)
                .unwrap_or_default(),
            version: content.version.map(|v| v.number).unwrap_or(1),
        }
    }
}

pub struct ConfluenceClient {
    config: StoreConfig,
    http: Client,
}

impl std::fmt::Debug for ConfluenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfluenceClient")
            .field("base_url", &self.config.base_url)
            .field("username", &self.config.username)
            .finish_non_exhaustive()
    }
}

impl ConfluenceClient {
    pub fn new(config: StoreConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/{path}", self.config.base_url)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let resp = request
            .basic_auth(&self.config.username, Some(self.config.api_key()))
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        Ok(resp.json::<T>()?)
    }
}

/// CQL for a full-text search restricted to pages of one space.
pub fn text_search_cql(space_key: &str, query: &str) -> String {
    format!(
        "type=page AND space=\"{}\" AND text~\"{}\"",
        escape_cql(space_key),
        escape_cql(query)
    )
}

fn escape_cql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl DocumentStoreClient for ConfluenceClient {
    fn list_page(
        &self,
        space_key: &str,
        start: usize,
        limit: usize,
    ) -> Result<Vec<Document>> {
        debug!(space = space_key, start, limit, "fetching page batch");
        let (start, limit) = (start.to_string(), limit.to_string());
        let listing: Listing<Document> = self.send(
            self.http.get(self.api_url("content")).query(&[
                ("spaceKey", space_key),
                ("type", "page"),
                ("start", start.as_str()),
                ("limit", limit.as_str()),
            ]),
        )?;
        Ok(listing.results)
    }

    fn search_text(
        &self,
        space_key: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Document>> {
        let cql = text_search_cql(space_key, query);
        debug!(%cql, "running full-text search");
        let limit = limit.to_string();
        let listing: Listing<SearchHit> = self.send(
            self.http.get(self.api_url("search")).query(&[
                ("cql", cql.as_str()),
                ("start", "0"),
                ("limit", limit.as_str()),
            ]),
        )?;
        Ok(listing
            .results
            .into_iter()
            .filter_map(|hit| hit.content)
            .collect())
    }
}

impl SpaceDirectory for ConfluenceClient {
    fn list_spaces(&self, start: usize, limit: usize) -> Result<Vec<Space>> {
        let listing: Listing<Space> = self.send(
            self.http.get(self.api_url("space")).query(&[
                ("start", start.to_string()),
                ("limit", limit.to_string()),
            ]),
        )?;
        Ok(listing.results)
    }
}

impl PageStore for ConfluenceClient {
    fn get_page(&self, page_id: &str) -> Result<Page> {
        let content: Content = self.send(
            self.http
                .get(self.api_url(&format!("content/{page_id}")))
                .query(&[("expand", PAGE_EXPAND)]),
        )?;
        Ok(content.into())
    }

    fn get_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>> {
        let listing: Listing<Content> = self.send(
            self.http.get(self.api_url("content")).query(&[
                ("spaceKey", space_key),
                ("title", title),
                ("type", "page"),
                ("expand", PAGE_EXPAND),
            ]),
        )?;
        Ok(listing.results.into_iter().next().map(Page::from))
    }

    fn create_page(
        &self,
        space_key: &str,
        title: &str,
        body_html: &str,
        parent_id: Option<&str>,
    ) -> Result<Page> {
        let mut payload = json!({
            "type": "page",
            "title": title,
            "space": { "key": space_key },
            "body": {
                "storage": { "value": body_html, "representation": "storage" }
            },
        });
        if let Some(parent) = parent_id {
            payload["ancestors"] = json!([{ "id": parent }]);
        }

        let content: Content =
            self.send(self.http.post(self.api_url("content")).json(&payload))?;
        Ok(content.into())
    }

    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body_html: &str,
    ) -> Result<Page> {
        let current = self.get_page(page_id)?;
        let payload = json!({
            "id": page_id,
            "type": "page",
            "title": title,
            "body": {
                "storage": { "value": body_html, "representation": "storage" }
            },
            "version": { "number": current.version + 1 },
        });

        let content: Content = self.send(
            self.http
                .put(self.api_url(&format!("content/{page_id}")))
                .json(&payload),
        )?;
        Ok(content.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cql_quotes_are_escaped() {
        assert_eq!(
            text_search_cql("ENG", r#"the "new" plan\draft"#),
            r#"type=page AND space="ENG" AND text~"the \"new\" plan\\draft""#
        );
    }

    #[test]
    fn api_urls_hang_off_the_base() {
        let client = ConfluenceClient::new(StoreConfig::new(
            "https://wiki.example.com/",
            "bot",
            "key",
        ))
        .unwrap();
        assert_eq!(
            client.api_url("content"),
            "https://wiki.example.com/rest/api/content"
        );
    }

    #[test]
    fn content_listing_parses() {
        let raw = r#"{
            "results": [
                {"id": "101", "type": "page", "title": "Q3 Planning"},
                {"id": "102", "type": "page"}
            ],
            "start": 0, "limit": 200, "size": 2
        }"#;
        let listing: Listing<Document> = serde_json::from_str(raw).unwrap();
        assert_eq!(
            listing.results,
            vec![Document::new("101", "Q3 Planning"), Document::new("102", "")]
        );
    }

    #[test]
    fn search_hits_without_content_are_skipped() {
        let raw = r#"{
            "results": [
                {"content": {"id": "7", "title": "OKRs"}, "title": "OKRs"},
                {"title": "a space result"}
            ]
        }"#;
        let listing: Listing<SearchHit> = serde_json::from_str(raw).unwrap();
        let docs: Vec<Document> =
            listing.results.into_iter().filter_map(|h| h.content).collect();
        assert_eq!(docs, vec![Document::new("7", "OKRs")]);
    }

    #[test]
    fn missing_results_is_empty() {
        let listing: Listing<Space> = serde_json::from_str("{}").unwrap();
        assert!(listing.results.is_empty());
    }

    #[test]
    fn content_with_body_and_version() {
        let raw = r#"{
            "id": "55",
            "title": "Runbook",
            "body": {
                "storage": {
                    "value": "<p>Restart it</p>",
                    "representation": "storage"
                }
            },
            "version": {"number": 4}
        }"#;
        let content: Content = serde_json::from_str(raw).unwrap();
        let page = Page::from(content);
        assert_eq!(page.id, "55");
        assert_eq!(page.body_html, "<p>Restart it</p>");
        assert_eq!(page.version, 4);
    }

    #[test]
    fn content_without_expansions() {
        let content: Content =
            serde_json::from_str(r#"{"id": "9", "title": "Bare"}"#).unwrap();
        let page = Page::from(content);
        assert!(page.body_html.is_empty());
        assert_eq!(page.version, 1);
    }
}
