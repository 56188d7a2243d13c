use crate::{normalize::NormalizedTitle, overlap, similarity};

/// Weights of the individual match signals.
///
/// These are hand-tuned; changing any of them silently changes which page
/// a title resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchWeights {
    /// Query slug is a substring of the candidate slug.
    pub slug_substring: f64,
    /// Query key is a substring of the candidate key.
    pub key_substring: f64,
    /// Enough significant query tokens appear in the candidate.
    pub token_overlap: f64,
    /// Similarity ratios at or below this contribute nothing.
    pub similarity_floor: f64,
    /// Multiplier applied to a similarity ratio above the floor.
    pub similarity_scale: f64,
    /// Bonus for an exact slug or key match in ranked listings.
    pub exact_bonus: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            slug_substring: 0.8,
            key_substring: 0.7,
            token_overlap: 0.6,
            similarity_floor: 0.5,
            similarity_scale: 0.5,
            exact_bonus: 2.0,
        }
    }
}

/// Scores how well a candidate title matches a query title.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchScorer {
    weights: MatchWeights,
}

impl MatchScorer {
    pub fn new(weights: MatchWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &MatchWeights {
        &self.weights
    }

    /// Sum of every signal that applies. Zero means "not a candidate".
    pub fn score(
        &self,
        query: &NormalizedTitle,
        candidate: &NormalizedTitle,
    ) -> f64 {
        let w = &self.weights;
        let mut score = 0.0;

        if !query.slug.is_empty() && candidate.slug.contains(&query.slug) {
            score += w.slug_substring;
        }

        if !query.norm_key.is_empty() {
            if candidate.norm_key.contains(&query.norm_key) {
                score += w.key_substring;
            }
            if overlap::token_overlap(&query.norm_key, &candidate.norm_key) {
                score += w.token_overlap;
            }
            if !candidate.norm_key.is_empty() {
                let ratio =
                    similarity::ratio(&query.norm_key, &candidate.norm_key);
                if ratio > w.similarity_floor {
                    score += ratio * w.similarity_scale;
                }
            }
        }

        score
    }

    /// [`score`](Self::score) plus the exact-match bonus, so exact hits
    /// lead a ranked listing.
    pub fn score_ranked(
        &self,
        query: &NormalizedTitle,
        candidate: &NormalizedTitle,
    ) -> f64 {
        let mut score = self.score(query, candidate);
        if is_exact(query, candidate) {
            score += self.weights.exact_bonus;
        }
        score
    }
}

/// Equal slugs or equal keys. Empty query forms never match.
pub fn is_exact(query: &NormalizedTitle, candidate: &NormalizedTitle) -> bool {
    (!query.slug.is_empty() && query.slug == candidate.slug)
        || (!query.norm_key.is_empty() && query.norm_key == candidate.norm_key)
}
