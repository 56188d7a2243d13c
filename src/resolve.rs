//! Title resolution within one space.
//!
//! Resolution is a confidence cascade, tried in strict order:
//!
//! 1. list every page in the space (an empty space is a miss)
//! 2. exact slug match, first in listing order
//! 3. exact normalized-key match, first in listing order
//! 4. best positive [`MatchScorer`] score, earliest page on ties
//! 5. the store's own full-text search, first hit
//!
//! Steps 2-4 share a single pass over the listing. Nothing is cached
//! between calls: every resolution re-lists the space, so results are
//! always as fresh as the store.

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    error::Result,
    normalize::NormalizedTitle,
    paginate::{DEFAULT_PAGE_SIZE, DocumentPaginator},
    scoring::{MatchScorer, MatchWeights},
    store::{Document, DocumentStoreClient},
};

/// Result cap for the full-text fallback search.
pub const FALLBACK_SEARCH_LIMIT: usize = 5;

/// Which step of the cascade produced the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    ExactSlug,
    ExactNormalized,
    Scored,
    FallbackSearch,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ExactSlug => "exact slug",
            Self::ExactNormalized => "exact normalized",
            Self::Scored => "scored",
            Self::FallbackSearch => "fallback search",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDocument {
    pub document: Document,
    pub kind: MatchKind,
    /// Only set for [`MatchKind::Scored`].
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedDocument),
    NotFound,
}

impl Resolution {
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::Resolved(hit) => Some(&hit.document),
            Self::NotFound => None,
        }
    }

    pub fn into_document(self) -> Option<Document> {
        match self {
            Self::Resolved(hit) => Some(hit.document),
            Self::NotFound => None,
        }
    }
}

/// Resolves a loosely typed title to a single page of a space.
pub struct FuzzyResolver<'a, C: ?Sized> {
    client: &'a C,
    page_size: usize,
    scorer: MatchScorer,
}

impl<'a, C: DocumentStoreClient + ?Sized> FuzzyResolver<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            page_size: DEFAULT_PAGE_SIZE,
            scorer: MatchScorer::default(),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_weights(mut self, weights: MatchWeights) -> Self {
        self.scorer = MatchScorer::new(weights);
        self
    }

    /// Resolve `query_title` to a page of `space_key`.
    ///
    /// Fails only when the listing fails. A failing fallback search is
    /// logged and reported as [`Resolution::NotFound`].
    pub fn resolve(
        &self,
        space_key: &str,
        query_title: &str,
    ) -> Result<Resolution> {
        let mut documents = DocumentPaginator::new(self.client)
            .with_page_size(self.page_size)
            .list_all(space_key)?;

        if documents.is_empty() {
            debug!(space = space_key, "space has no pages");
            return Ok(Resolution::NotFound);
        }

        let query = NormalizedTitle::new(query_title);
        let local = self.match_locally(&query, &documents);

        if let Some((idx, kind, score)) = local {
            let document = documents.swap_remove(idx);
            debug!(
                space = space_key,
                query = query_title,
                title = %document.title,
                %kind,
                "resolved title"
            );
            return Ok(Resolution::Resolved(ResolvedDocument {
                document,
                kind,
                score,
            }));
        }

        Ok(self.fallback_search(space_key, query_title))
    }

    /// Steps 2-4 in one pass. Returns the index of the winning page.
    fn match_locally(
        &self,
        query: &NormalizedTitle,
        documents: &[Document],
    ) -> Option<(usize, MatchKind, Option<f64>)> {
        let mut exact_norm: Option<usize> = None;
        let mut best: Option<(usize, f64)> = None;

        for (idx, document) in documents.iter().enumerate() {
            let candidate = NormalizedTitle::new(&document.title);

            if !query.slug.is_empty() && candidate.slug == query.slug {
                return Some((idx, MatchKind::ExactSlug, None));
            }

            if exact_norm.is_none()
                && !query.norm_key.is_empty()
                && candidate.norm_key == query.norm_key
            {
                exact_norm = Some(idx);
            }

            // Once an exact key match exists, only an exact slug can beat it.
            if exact_norm.is_some() {
                continue;
            }

            let score = self.scorer.score(query, &candidate);
            if score > 0.0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((idx, score));
            }
        }

        if let Some(idx) = exact_norm {
            return Some((idx, MatchKind::ExactNormalized, None));
        }
        best.map(|(idx, score)| (idx, MatchKind::Scored, Some(score)))
    }

    fn fallback_search(
        &self,
        space_key: &str,
        query_title: &str,
    ) -> Resolution {
        if query_title.trim().is_empty() {
            return Resolution::NotFound;
        }

        match self.client.search_text(
            space_key,
            query_title,
            FALLBACK_SEARCH_LIMIT,
        ) {
            Ok(results) => match results.into_iter().next() {
                Some(document) => {
                    debug!(
                        space = space_key,
                        query = query_title,
                        title = %document.title,
                        "resolved title through full-text search"
                    );
                    Resolution::Resolved(ResolvedDocument {
                        document,
                        kind: MatchKind::FallbackSearch,
                        score: None,
                    })
                }
                None => Resolution::NotFound,
            },
            Err(e) => {
                warn!(
                    space = space_key,
                    query = query_title,
                    "full-text search failed: {e}"
                );
                Resolution::NotFound
            }
        }
    }
}
