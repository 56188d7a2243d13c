//! Title canonicalization.
//!
//! Two renderings are derived from any title: the URL slug the wiki uses
//! for routing, and a space-delimited key used for token matching. Both
//! fold accents by NFKD decomposition followed by dropping every non-ASCII
//! code point, so "Réunion Équipe" and "Reunion Equipe" compare equal.

use unicode_normalization::UnicodeNormalization;

/// Both canonical forms of a title, computed once per title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTitle {
    pub slug: String,
    pub norm_key: String,
}

impl NormalizedTitle {
    pub fn new(title: &str) -> Self {
        Self {
            slug: slugify(title),
            norm_key: normalize_key(title),
        }
    }
}

fn ascii_fold(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfkd().filter(char::is_ascii)
}

/// Convert a title into the slug used in page URLs.
///
/// `[A-Za-z0-9-]` is kept (lower-cased); every other character becomes
/// `+`, runs of `+` collapse to one, and leading/trailing `+` are trimmed.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in ascii_fold(title) {
        if ch.is_ascii_alphanumeric() || ch == '-' {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('+') {
            slug.push('+');
        }
    }
    if slug.ends_with('+') {
        slug.pop();
    }
    slug
}

/// Fold a title into lowercase alphanumeric tokens separated by single
/// spaces.
pub fn normalize_key(title: &str) -> String {
    let mut key = String::with_capacity(title.len());
    for ch in ascii_fold(title) {
        if ch.is_ascii_alphanumeric() {
            key.push(ch.to_ascii_lowercase());
        } else if !key.is_empty() && !key.ends_with(' ') {
            key.push(' ');
        }
    }
    if key.ends_with(' ') {
        key.pop();
    }
    key
}
