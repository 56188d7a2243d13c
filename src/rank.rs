use serde::Serialize;
use tracing::debug;

use crate::{
    error::Result,
    normalize::NormalizedTitle,
    paginate::{DEFAULT_PAGE_SIZE, DocumentPaginator},
    scoring::{MatchScorer, MatchWeights},
    store::{Document, DocumentStoreClient},
};

/// Default shortlist length for disambiguation listings.
pub const DEFAULT_RANK_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub document: Document,
    pub score: f64,
}

/// Ranks every page of a space against a partial title and keeps the best
/// `k`. Exact matches get a bonus instead of short-circuiting, so they
/// lead the list.
pub struct TopKRanker<'a, C: ?Sized> {
    client: &'a C,
    page_size: usize,
    scorer: MatchScorer,
}

impl<'a, C: DocumentStoreClient + ?Sized> TopKRanker<'a, C> {
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

    pub fn rank(
        &self,
        space_key: &str,
        query_title: &str,
        k: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let documents = DocumentPaginator::new(self.client)
            .with_page_size(self.page_size)
            .list_all(space_key)?;

        let query = NormalizedTitle::new(query_title);
        let mut ranked: Vec<ScoredCandidate> = documents
            .into_iter()
            .filter_map(|document| {
                let candidate = NormalizedTitle::new(&document.title);
                let score = self.scorer.score_ranked(&query, &candidate);
                (score > 0.0).then_some(ScoredCandidate { document, score })
            })
            .collect();

        // Stable sort: equal scores keep listing order.
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(k);

        debug!(
            space = space_key,
            query = query_title,
            count = ranked.len(),
            "ranked pages"
        );
        Ok(ranked)
    }
}
