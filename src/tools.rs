//! Page operations addressed by space name and loose title, as offered to
//! the command line and to MCP clients.

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    paginate::{DEFAULT_PAGE_SIZE, DocumentPaginator},
    rank::{ScoredCandidate, TopKRanker},
    resolve::{FuzzyResolver, Resolution},
    space::{self, Space, SpaceDirectory},
    store::{Document, DocumentStoreClient, Page, PageStore},
    summary::{self, DEFAULT_SUMMARY_CHARS},
};

/// Everything the tool layer needs from the wiki.
pub trait WikiStore:
    DocumentStoreClient + SpaceDirectory + PageStore + Send + Sync
{
}

impl<T> WikiStore for T where
    T: DocumentStoreClient + SpaceDirectory + PageStore + Send + Sync
{
}

/// A fetched page reduced to what a reader needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub id: String,
    pub title: String,
    pub url: String,
    pub summary: String,
}

/// A page that was just written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub id: String,
    pub title: String,
    pub url: String,
}

pub struct PageTools {
    client: Box<dyn WikiStore>,
    base_url: String,
    page_size: usize,
    summary_chars: usize,
}

impl PageTools {
    pub fn new(client: Box<dyn WikiStore>, base_url: &str) -> Self {
        Self {
            client,
            base_url: crate::config::normalize_base_url(base_url),
            page_size: DEFAULT_PAGE_SIZE,
            summary_chars: DEFAULT_SUMMARY_CHARS,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn page_url(&self, page_id: &str) -> String {
        format!("{}/pages/viewpage.action?pageId={page_id}", self.base_url)
    }

    pub fn space_key(&self, space_name: &str) -> Result<String> {
        space::resolve_space_key(self.client.as_ref(), space_name)?.ok_or_else(
            || Error::NotFound {
                kind: "space",
                name: space_name.to_string(),
            },
        )
    }

    pub fn spaces(&self) -> Result<Vec<Space>> {
        space::list_all_spaces(self.client.as_ref())
    }

    pub fn pages(&self, space_name: &str) -> Result<Vec<Document>> {
        let key = self.space_key(space_name)?;
        DocumentPaginator::new(self.client.as_ref())
            .with_page_size(self.page_size)
            .list_all(&key)
    }

    pub fn resolve(
        &self,
        space_name: &str,
        title: &str,
    ) -> Result<(String, Resolution)> {
        let key = self.space_key(space_name)?;
        let resolution = FuzzyResolver::new(self.client.as_ref())
            .with_page_size(self.page_size)
            .resolve(&key, title)?;
        Ok((key, resolution))
    }

    /// Read a page by a loosely typed title.
    ///
    /// A resolved page is fetched by id, falling back to a lookup by its
    /// exact title if that fails; an unresolved title is tried verbatim.
    pub fn page_content(
        &self,
        space_name: &str,
        title: &str,
    ) -> Result<PageView> {
        let (key, resolution) = self.resolve(space_name, title)?;

        let page = match resolution {
            Resolution::Resolved(hit) => {
                match self.client.get_page(&hit.document.id) {
                    Ok(page) => Some(page),
                    Err(e) => {
                        warn!(
                            id = %hit.document.id,
                            "fetch by id failed, trying exact title: {e}"
                        );
                        self.client
                            .get_page_by_title(&key, &hit.document.title)?
                    }
                }
            }
            Resolution::NotFound => self.client.get_page_by_title(&key, title)?,
        };

        let page = page.ok_or_else(|| Error::NotFound {
            kind: "page",
            name: format!("{title} (space {space_name})"),
        })?;
        info!(title = %page.title, space = space_name, "retrieved page");
        Ok(self.view(page))
    }

    /// Read a page by slug or loose title. Unlike
    /// [`page_content`](Self::page_content) there is no verbatim-title
    /// retry, and a failed fetch is reported as is.
    pub fn page_by_slug(
        &self,
        space_name: &str,
        slug: &str,
    ) -> Result<PageView> {
        let (_, resolution) = self.resolve(space_name, slug)?;
        let document =
            resolution.into_document().ok_or_else(|| Error::NotFound {
                kind: "page",
                name: format!("{slug} (space {space_name})"),
            })?;
        let page = self.client.get_page(&document.id)?;
        Ok(self.view(page))
    }

    pub fn find_pages(
        &self,
        space_name: &str,
        partial_title: &str,
        limit: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        let key = self.space_key(space_name)?;
        TopKRanker::new(self.client.as_ref())
            .with_page_size(self.page_size)
            .rank(&key, partial_title, limit)
    }

    pub fn create_page(
        &self,
        space_name: &str,
        title: &str,
        body_html: &str,
        parent_id: Option<&str>,
    ) -> Result<PageLink> {
        let key = self.space_key(space_name)?;
        let page = self.client.create_page(&key, title, body_html, parent_id)?;
        info!(id = %page.id, title, "page created");
        Ok(self.link(page))
    }

    pub fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body_html: &str,
    ) -> Result<PageLink> {
        let page = self.client.update_page(page_id, title, body_html)?;
        info!(id = %page.id, title, version = page.version, "page updated");
        Ok(self.link(page))
    }

    fn view(&self, page: Page) -> PageView {
        PageView {
            url: self.page_url(&page.id),
            summary: summary::summarize_html(
                &page.body_html,
                self.summary_chars,
            ),
            id: page.id,
            title: page.title,
        }
    }

    fn link(&self, page: Page) -> PageLink {
        PageLink {
            url: self.page_url(&page.id),
            id: page.id,
            title: page.title,
        }
    }
}

pub fn format_page(view: &PageView) -> String {
    let summary = if view.summary.is_empty() {
        "Content preview not available."
    } else {
        &view.summary
    };
    format!(
        "Found page: {}\nURL: {}\n\nContent preview:\n{summary}",
        view.title, view.url
    )
}

/// Numbered titles without URLs, so the list reads well aloud.
pub fn format_matches(matches: &[ScoredCandidate], query: &str) -> String {
    if matches.is_empty() {
        return format!("No pages found matching '{query}'.");
    }
    let mut lines = vec![format!(
        "Found {} page(s) matching '{query}':",
        matches.len()
    )];
    for (i, m) in matches.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, m.document.title));
    }
    lines.join("\n")
}

pub fn format_pages(pages: &[Document], space_name: &str) -> String {
    if pages.is_empty() {
        return format!("No pages found in space '{space_name}'.");
    }
    let mut lines = vec![format!("Pages in space '{space_name}':")];
    for (i, page) in pages.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, page.title));
    }
    lines.join("\n")
}

pub fn format_spaces(spaces: &[Space]) -> String {
    if spaces.is_empty() {
        return "No spaces found.".to_string();
    }
    spaces
        .iter()
        .map(|s| format!("{}\t{}", s.key, s.name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_link(link: &PageLink, action: &str) -> String {
    format!(
        "Page {action} successfully!\nTitle: {}\nURL: {}",
        link.title, link.url
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::StubStore;

    fn stub() -> StubStore {
        let mut store = StubStore::with_titles(&[
            "Q3 Planning",
            "Q3 Planning Notes",
            "Quarterly Review",
        ]);
        store.spaces = vec![Space::new("ENG", "Engineering")];
        store.bodies = vec![(
            "3".to_string(),
            "<h1>Review</h1><p>Revenue up.</p>".to_string(),
        )];
        store
    }

    fn tools(store: StubStore) -> PageTools {
        PageTools::new(Box::new(store), "https://wiki.example.com/")
    }

    #[test]
    fn page_content_resolves_and_summarizes() {
        let view = tools(stub())
            .page_content("engineering", "quaterly review")
            .unwrap();
        assert_eq!(view.id, "3");
        assert_eq!(view.title, "Quarterly Review");
        assert_eq!(
            view.url,
            "https://wiki.example.com/pages/viewpage.action?pageId=3"
        );
        assert_eq!(view.summary, "Review Revenue up.");
    }

    #[test]
    fn page_content_falls_back_to_exact_title_when_fetch_fails() {
        let mut store = stub();
        store.fail_get_page = true;
        let view = tools(store).page_content("ENG", "q3 planning").unwrap();
        assert_eq!(view.title, "Q3 Planning");
    }

    #[test]
    fn unknown_space_is_not_found() {
        let err = tools(stub()).page_content("Sales", "anything").unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "space", .. }));
    }

    #[test]
    fn unresolved_title_is_not_found() {
        let err = tools(stub())
            .page_content("ENG", "xyz-nonexistent-doc")
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "page", .. }));
    }

    #[test]
    fn page_by_slug_uses_the_resolver() {
        let view = tools(stub())
            .page_by_slug("ENG", "q3+planning+notes")
            .unwrap();
        assert_eq!(view.title, "Q3 Planning Notes");
    }

    #[test]
    fn page_by_slug_propagates_fetch_errors() {
        let mut store = stub();
        store.fail_get_page = true;
        let err = tools(store).page_by_slug("ENG", "q3+planning").unwrap_err();
        assert!(matches!(err, Error::Api { status: 500, .. }));
    }

    #[test]
    fn find_pages_ranks_within_the_space() {
        let matches =
            tools(stub()).find_pages("ENG", "q3 planning", 5).unwrap();
        let titles: Vec<_> =
            matches.iter().map(|m| m.document.title.as_str()).collect();
        assert_eq!(titles, vec!["Q3 Planning", "Q3 Planning Notes"]);
        assert_eq!(
            format_matches(&matches, "q3 planning"),
            "Found 2 page(s) matching 'q3 planning':\n1. Q3 Planning\n2. Q3 Planning Notes"
        );
    }

    #[test]
    fn create_and_update_return_links() {
        let tools = tools(stub());
        let created = tools
            .create_page("Engineering", "Postmortem", "<p>x</p>", None)
            .unwrap();
        assert_eq!(created.id, "new-1");
        assert!(created.url.ends_with("pageId=new-1"));

        let updated =
            tools.update_page("1", "Q3 Planning v2", "<p>y</p>").unwrap();
        assert_eq!(updated.title, "Q3 Planning v2");
        assert_eq!(
            format_link(&updated, "updated"),
            "Page updated successfully!\nTitle: Q3 Planning v2\nURL: https://wiki.example.com/pages/viewpage.action?pageId=1"
        );
    }

    #[test]
    fn pages_lists_everything() {
        let tools = tools(stub()).with_page_size(2);
        let pages = tools.pages("ENG").unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(
            format_pages(&pages, "ENG"),
            "Pages in space 'ENG':\n1. Q3 Planning\n2. Q3 Planning Notes\n3. Quarterly Review"
        );
    }

    #[test]
    fn format_page_without_body() {
        let view = PageView {
            id: "1".to_string(),
            title: "Empty".to_string(),
            url: "u".to_string(),
            summary: String::new(),
        };
        assert!(format_page(&view).ends_with("Content preview not available."));
    }
}
