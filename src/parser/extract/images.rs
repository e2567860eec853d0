use std::sync::LazyLock;

use regex::Regex;

static CAROUSEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<div\b[^>]*\bclass="[^"]*\bswiper-container\b[^"]*"[^>]*>"#).unwrap()
});
static DIV_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<(/?)div\b[^>]*>").unwrap());
// Leading whitespace keeps `data-src` out.
static IMG_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img\s(?:[^>]*?\s)?src="([^"]+)""#).unwrap());

/// Carousel images in document order; never empty.
pub fn extract(body: &str, id: &str) -> Vec<String> {
    let carousel: Vec<String> = carousel_region(body)
        .map(|region| {
            IMG_SRC_RE
                .captures_iter(region)
                .map(|c| c[1].to_string())
                .collect()
        })
        .unwrap_or_default();
    if !carousel.is_empty() {
        return carousel;
    }

    let first = IMG_SRC_RE
        .captures(body)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| fallback_thumbnail(id));
    vec![first]
}

/// Inside of the carousel container, up to its own closing `</div>`. An
/// unclosed container runs to the end of the body.
fn carousel_region(body: &str) -> Option<&str> {
    let start = CAROUSEL_RE.find(body)?.end();
    let mut depth = 1usize;
    for tag in DIV_TAG_RE.captures_iter(&body[start..]) {
        if tag[1].is_empty() {
            depth += 1;
            continue;
        }
        depth -= 1;
        if depth == 0 {
            let end = start + tag.get(0)?.start();
            return Some(&body[start..end]);
        }
    }
    Some(&body[start..])
}

pub fn fallback_thumbnail(id: &str) -> String {
    format!("../image/{}/thumb.jpg", id)
}
