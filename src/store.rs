//! The remote page store as seen by the resolver and the tool layer.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A page as returned by listings and searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A fully fetched page, including its storage-format body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub body_html: String,
    pub version: u64,
}

/// Listing and search within a single space.
///
/// `list_page` must return pages in a stable server-defined order; an empty
/// or short batch means there is nothing after it.
pub trait DocumentStoreClient {
    fn list_page(
        &self,
        space_key: &str,
        start: usize,
        limit: usize,
    ) -> Result<Vec<Document>>;

    /// Store-side full-text search scoped to a space, best match first.
    fn search_text(
        &self,
        space_key: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Document>>;
}

/// Fetching and writing whole pages.
pub trait PageStore {
    fn get_page(&self, page_id: &str) -> Result<Page>;

    fn get_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>>;

    fn create_page(
        &self,
        space_key: &str,
        title: &str,
        body_html: &str,
        parent_id: Option<&str>,
    ) -> Result<Page>;

    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body_html: &str,
    ) -> Result<Page>;
}
