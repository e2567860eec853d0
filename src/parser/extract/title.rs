use std::sync::LazyLock;

use regex::Regex;

use crate::parser::normalize::plain_text;

static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<h1[^>]*>(.*?)</h1>").unwrap());

/// First `<h1>` flattened to text. `body` must already be comment-free.
pub fn extract(body: &str) -> Option<String> {
    H1_RE
        .captures(body)
        .map(|caps| plain_text(&caps[1]))
        .filter(|t| !t.is_empty())
}
