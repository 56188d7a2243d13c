/// Default length of a page preview, in characters.
pub const DEFAULT_SUMMARY_CHARS: usize = 800;

const ELLIPSIS: &str = "...";

/// Crude plain-text preview of a storage-format body: tags become spaces,
/// whitespace collapses, and the result is cut to `max_chars` characters
/// (ellipsis included).
pub fn summarize_html(html: &str, max_chars: usize) -> String {
    let text = strip_tags(html)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if text.chars().count() <= max_chars {
        return text;
    }

    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str(ELLIPSIS);
    cut
}

/// Replace every `<...>` with a space. A `<` with no closing `>`, or an
/// empty `<>`, is kept as text.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('>') {
            Some(close) if close > 0 => {
                out.push(' ');
                rest = &after[close + 1..];
            }
            _ => {
                out.push('<');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
