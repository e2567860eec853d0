use std::sync::LazyLock;

use regex::Regex;

use crate::parser::normalize::{drop_empty_entries, normalize, trim_trailing_breaks, unwrap_plain_wrappers};

static CONTENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<div id="content_in"[^>]*>(.*?)</div>"#).unwrap());
static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p(?:\s[^>]*)?>(.*?)</p>").unwrap());
// A 19xx/20xx token not glued to other digits ("2024年" counts, "12024" does not).
static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])((?:19|20)[0-9]{2})(?:[^0-9]|$)").unwrap());

/// First paragraph of the content container, cleaned. Returns the number of
/// rewrites (unwrapped wrappers plus dropped empty entries) alongside.
pub fn extract(body: &str) -> (Option<String>, usize) {
    let Some(paragraph) = CONTENT_RE
        .captures(body)
        .and_then(|content| PARAGRAPH_RE.captures(content.get(1)?.as_str()))
        .map(|p| p[1].to_string())
    else {
        return (None, 0);
    };

    let (unwrapped, wrappers) = unwrap_plain_wrappers(&paragraph);
    let (cleaned, empties) = drop_empty_entries(&unwrapped);
    let normalized = normalize(&cleaned);
    let text = trim_trailing_breaks(&normalized);
    let description = (!text.is_empty()).then(|| text.to_string());
    (description, wrappers + empties)
}

pub fn year(description: Option<&str>) -> Option<String> {
    YEAR_RE
        .captures(description?)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_paragraph_only() {
        let body = "<div id=\"content_in\">\n<p>\n  First  line<br>\n second\n</p><p>other</p></div>";
        assert_eq!(extract(body).0.as_deref(), Some("First line<br>second"));
    }

    #[test]
    fn wrappers_and_empty_entries_removed() {
        let body = "<div id=\"content_in\" class=\"c\"><p><a>plain</a> and <a href=\"https://x.example\">kept</a><dd></dd><br></p></div>";
        let (desc, rewrites) = extract(body);
        assert_eq!(
            desc.as_deref(),
            Some("plain and <a href=\"https://x.example\">kept</a>")
        );
        assert_eq!(rewrites, 2);
    }

    #[test]
    fn no_container_or_paragraph() {
        assert_eq!(extract("<p>outside</p>").0, None);
        assert_eq!(extract("<div id=\"content_in\"><dl></dl></div>").0, None);
    }

    #[test]
    fn plausible_years() {
        assert_eq!(year(Some("Exhibited in 2019 and 2021")).as_deref(), Some("2019"));
        assert_eq!(year(Some("2020年に制作")).as_deref(), Some("2020"));
        assert_eq!(year(Some("id 120245 only")), None);
        assert_eq!(year(Some("no year")), None);
        assert_eq!(year(None), None);
    }
}
