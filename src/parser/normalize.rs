use std::sync::LazyLock;

use regex::Regex;

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static BR_SPACING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*<br>\s*").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static PLAIN_A_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<a>([^<]*)</a>").unwrap());
static PLAIN_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<span>([^<]*)</span>").unwrap());
static EMPTY_DD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<dd>\s*</dd>").unwrap());
// `</a>, <a`, `</a>/<a` and `</a>   <a` all become `</a> / <a`.
static LINK_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</a>(?:\s*[/,]\s*|\s{2,})<a").unwrap());
const LINK_SEPARATOR: &str = "</a> / <a";

pub const BREAK: &str = "<br>";

/// Collapse whitespace runs to one space, canonicalize line breaks to `<br>`,
/// glue breaks to their neighbours and trim. Idempotent.
pub fn normalize(fragment: &str) -> String {
    let breaks = BR_RE.replace_all(fragment, BREAK);
    let spaced = WS_RE.replace_all(&breaks, " ");
    let glued = BR_SPACING_RE.replace_all(&spaced, BREAK);
    glued.trim().to_string()
}

/// Remove every comment block, including commented-out markup.
pub fn strip_comments(html: &str) -> String {
    COMMENT_RE.replace_all(html, "").into_owned()
}

/// Flatten markup to text: breaks become spaces, other tags vanish.
pub fn plain_text(fragment: &str) -> String {
    let breaks = BR_RE.replace_all(fragment, " ");
    let stripped = TAG_RE.replace_all(&breaks, "");
    normalize(&stripped)
}

/// Unwrap `<a>`/`<span>` wrappers that carry no attributes. Wrappers with an
/// href or class are left verbatim. Returns the rewritten text and the number
/// of wrappers removed.
pub fn unwrap_plain_wrappers(fragment: &str) -> (String, usize) {
    let mut count = 0;
    let mut text = fragment.to_string();
    for re in [&*PLAIN_A_RE, &*PLAIN_SPAN_RE] {
        let hits = re.find_iter(&text).count();
        if hits > 0 {
            text = re.replace_all(&text, "$1").into_owned();
            count += hits;
        }
    }
    (text, count)
}

/// Drop `<dd></dd>` placeholders left inside free text.
pub fn drop_empty_entries(fragment: &str) -> (String, usize) {
    let hits = EMPTY_DD_RE.find_iter(fragment).count();
    if hits == 0 {
        return (fragment.to_string(), 0);
    }
    (EMPTY_DD_RE.replace_all(fragment, "").into_owned(), hits)
}

/// Strip trailing `<br>` runs from an already normalized fragment.
pub fn trim_trailing_breaks(normalized: &str) -> &str {
    let mut s = normalized;
    while let Some(rest) = s.strip_suffix(BREAK) {
        s = rest.trim_end();
    }
    s
}

/// Put a single ` / ` between adjacent anchors. Returns the rewritten text
/// and the number of separators that actually changed.
pub fn standardize_separators(fragment: &str) -> (String, usize) {
    let changed = LINK_SEPARATOR_RE
        .find_iter(fragment)
        .filter(|m| m.as_str() != LINK_SEPARATOR)
        .count();
    if changed == 0 {
        return (fragment.to_string(), 0);
    }
    (LINK_SEPARATOR_RE.replace_all(fragment, LINK_SEPARATOR).into_owned(), changed)
}

/// Full cleanup for a markup field value; empty results become `None`.
pub fn clean_markup(fragment: &str) -> (Option<String>, usize) {
    let (unwrapped, count) = unwrap_plain_wrappers(fragment);
    let normalized = normalize(&unwrapped);
    let trimmed = trim_trailing_breaks(&normalized);
    if trimmed.is_empty() {
        (None, count)
    } else {
        (Some(trimmed.to_string()), count)
    }
}
