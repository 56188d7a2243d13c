use crate::similarity;

/// Function words ignored when picking significant query tokens.
/// Titles are mostly Portuguese or English, so both are covered.
pub const STOP_WORDS: &[&str] = &[
    "de", "da", "do", "das", "dos", "em", "e", "a", "o", "para", "the", "and",
    "or", "of",
];

/// Tokens this short or shorter are never significant.
const MIN_SIGNIFICANT_LEN: usize = 2;

/// Similarity at which two tokens count as the same word misspelled.
pub const TOKEN_SIMILARITY_CUTOFF: f64 = 0.85;

/// Share of significant query tokens that must be found in the candidate.
pub const OVERLAP_THRESHOLD: f64 = 0.7;

/// Query tokens that carry meaning: longer than two characters and not a
/// stop word.
pub fn significant_tokens(norm_key: &str) -> Vec<&str> {
    norm_key
        .split_whitespace()
        .filter(|t| t.len() > MIN_SIGNIFICANT_LEN && !STOP_WORDS.contains(t))
        .collect()
}

fn tokens_match(query_token: &str, candidate_token: &str) -> bool {
    query_token == candidate_token
        || candidate_token.starts_with(query_token)
        || query_token.starts_with(candidate_token)
        || similarity::ratio(query_token, candidate_token)
            >= TOKEN_SIMILARITY_CUTOFF
}

/// Whether enough of the query's significant tokens appear in the
/// candidate, by equality, prefix in either direction, or near-miss
/// spelling.
///
/// Both arguments are normalized keys. A query without significant tokens
/// never overlaps.
pub fn token_overlap(query_norm: &str, candidate_norm: &str) -> bool {
    let significant = significant_tokens(query_norm);
    if significant.is_empty() {
        return false;
    }
    let candidate: Vec<&str> = candidate_norm.split_whitespace().collect();

    let found = significant
        .iter()
        .filter(|qt| candidate.iter().any(|ct| tokens_match(qt, ct)))
        .count();

    found as f64 >= significant.len() as f64 * OVERLAP_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn significant_tokens_drop_short_and_stop_words() {
        assert_eq!(
            significant_tokens("plano de acao para the q3 team"),
            vec!["plano", "acao", "team"]
        );
    }

    #[test]
    fn stop_words_longer_than_two_are_filtered() {
        assert!(significant_tokens("das dos the and para").is_empty());
    }

    #[test]
    fn no_significant_tokens_never_overlaps() {
        assert!(!token_overlap("q3 of", "q3 of"));
        assert!(!token_overlap("", "anything"));
    }

    #[test]
    fn exact_tokens_overlap() {
        assert!(token_overlap("planning notes", "q3 planning notes"));
    }

    #[test]
    fn prefix_in_either_direction() {
        assert!(token_overlap("plan", "planning review"));
        assert!(token_overlap("planning", "plan review"));
    }

    #[test]
    fn near_miss_spelling() {
        assert!(token_overlap("quaterly review", "quarterly review"));
    }

    #[test]
    fn seventy_percent_threshold_is_inclusive() {
        // 7 of 10 tokens found: exactly at the threshold.
        let query =
            "alpha bravo charlie delta echo foxtrot golf hotel india juliet";
        let candidate = "alpha bravo charlie delta echo foxtrot golf";
        assert!(token_overlap(query, candidate));

        // 2 of 3 falls short of 2.1.
        assert!(!token_overlap("alpha bravo zulu", "alpha bravo"));
    }

    #[test]
    fn unrelated_tokens_do_not_overlap() {
        assert!(!token_overlap("budget forecast", "team offsite agenda"));
    }
}
