//! Source-side facts for verification. Nothing here calls into `parser`;
//! markup is walked tag by tag.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1\b[^>]*>(.*?)</h1\s*>").unwrap());
static SECTION_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<dt\b[^>]*>(?P<dt>.*?)</dt>|<dd\b[^>]*>(?P<dd>.*?)</dd>").unwrap()
});

const BR: &str = "<br>";

#[derive(Debug, Clone, Default)]
pub struct SourceFacts {
    pub title: Option<String>,
    pub images: Vec<String>,
    pub description: Option<String>,
    /// label → cleaned value blocks, first-appearance order.
    pub sections: Vec<(String, Vec<String>)>,
}

pub fn derive(html: &str, id: &str) -> SourceFacts {
    let html = without_comments(html);
    SourceFacts {
        title: heading(&html),
        images: images(&html, id),
        description: description(&html),
        sections: sections(&html),
    }
}

pub fn without_comments(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find("<!--") {
        let Some(len) = rest[start + 4..].find("-->") else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &rest[start + 4 + len + 3..];
    }
    out.push_str(rest);
    out
}

fn heading(html: &str) -> Option<String> {
    let inner = HEADING_RE.captures(html)?.get(1)?.as_str();
    let text = flatten(inner);
    (!text.is_empty()).then_some(text)
}

/// Carousel `<img>` sources: everything inside the `swiper-wrapper` div,
/// found by tracking div depth.
fn images(html: &str, id: &str) -> Vec<String> {
    let mut found = Vec::new();
    if let Some(at) = html.find("class=\"swiper-wrapper\"") {
        if let Some(open_end) = html[at..].find('>') {
            let mut depth = 1usize;
            for tag in tags(&html[at + open_end + 1..]) {
                match tag_name(tag).as_str() {
                    "div" if tag.starts_with('/') => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    "div" => depth += 1,
                    "img" => found.extend(src_attr(tag)),
                    _ => {}
                }
            }
        }
    }
    if found.is_empty() {
        let first = tags(html)
            .filter(|t| tag_name(t) == "img")
            .find_map(src_attr)
            .unwrap_or_else(|| format!("../image/{}/thumb.jpg", id));
        found.push(first);
    }
    found
}

fn description(html: &str) -> Option<String> {
    let at = html.find("id=\"content_in\"")?;
    let start = at + html[at..].find('>')? + 1;
    let region = &html[start..];
    let region = &region[..region.find("</div>").unwrap_or(region.len())];

    let mut search = 0;
    let inner = loop {
        let p = search + region[search..].find("<p")?;
        let next = region[p + 2..].chars().next()?;
        if next == '>' || next.is_whitespace() {
            let body_start = p + region[p..].find('>')? + 1;
            let body_end = body_start + region[body_start..].find("</p>")?;
            break &region[body_start..body_end];
        }
        search = p + 2;
    };

    let cleaned = remove_empty_dd(&unwrap_bare(inner));
    finish(&canonical(&cleaned))
}

fn sections(html: &str) -> Vec<(String, Vec<String>)> {
    let mut out: Vec<(String, Vec<String>)> = Vec::new();
    let mut current: Option<String> = None;
    for caps in SECTION_TOKEN_RE.captures_iter(html) {
        if let Some(dt) = caps.name("dt") {
            let label = flatten(dt.as_str()).trim_end_matches(':').trim_end().to_string();
            current = (!label.is_empty()).then_some(label);
            continue;
        }
        let (Some(label), Some(dd)) = (current.as_ref(), caps.name("dd")) else {
            continue;
        };
        let Some(value) = finish(&canonical(&unwrap_bare(dd.as_str()))) else {
            continue;
        };
        match out.iter_mut().find(|(l, _)| l == label) {
            Some((_, values)) => values.push(value),
            None => out.push((label.clone(), vec![value])),
        }
    }
    out
}

/// Iterate the inner text of every `<...>` tag.
fn tags(html: &str) -> impl Iterator<Item = &str> {
    html.split('<')
        .skip(1)
        .filter_map(|chunk| chunk.find('>').map(|end| &chunk[..end]))
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn src_attr(tag: &str) -> Option<String> {
    let mut from = 0;
    while let Some(i) = tag[from..].find("src=\"") {
        let at = from + i;
        if tag[..at].ends_with(char::is_whitespace) {
            let value_start = at + 5;
            let len = tag[value_start..].find('"')?;
            return (len > 0).then(|| tag[value_start..value_start + len].to_string());
        }
        from = at + 5;
    }
    None
}

fn is_break(tag: &str) -> bool {
    tag.trim().trim_end_matches('/').trim().eq_ignore_ascii_case("br")
}

/// Rebuild `fragment`, letting `f` replace individual tags.
fn rewrite_tags(fragment: &str, f: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut rest = fragment;
    while let Some(open) = rest.find('<') {
        let Some(len) = rest[open..].find('>') else {
            break;
        };
        out.push_str(&rest[..open]);
        let tag = &rest[open + 1..open + len];
        match f(tag) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(&rest[open..open + len + 1]),
        }
        rest = &rest[open + len + 1..];
    }
    out.push_str(rest);
    out
}

/// Plain text: breaks read as spaces, every other tag disappears.
pub fn flatten(fragment: &str) -> String {
    let text = rewrite_tags(fragment, |tag| {
        Some(if is_break(tag) { " ".into() } else { String::new() })
    });
    text.split_whitespace().join(" ")
}

/// Whitespace collapsed, breaks spelled `<br>` and glued to their neighbours.
pub fn canonical(fragment: &str) -> String {
    let text = rewrite_tags(fragment, |tag| is_break(tag).then(|| BR.to_string()));
    text.split_whitespace()
        .join(" ")
        .replace(" <br>", BR)
        .replace("<br> ", BR)
}

/// Adjacent anchors separated by `/`, `,` or a run of spaces are rejoined
/// with ` / `.
pub fn anchor_separators(fragment: &str) -> String {
    const CLOSE: &str = "</a>";
    let mut out = String::with_capacity(fragment.len());
    let mut rest = fragment;
    while let Some(at) = rest.find(CLOSE) {
        let after = &rest[at + CLOSE.len()..];
        out.push_str(&rest[..at + CLOSE.len()]);
        rest = after;

        let lead = after.len() - after.trim_start().len();
        let mut gap = lead;
        let marked = after[gap..].starts_with(|c: char| c == '/' || c == ',');
        if marked {
            gap += 1;
            gap += after[gap..].len() - after[gap..].trim_start().len();
        }
        let spaced = after[..lead].chars().count() >= 2;
        if after[gap..].starts_with("<a") && (marked || spaced) {
            out.push_str(" / ");
            rest = &after[gap..];
        }
    }
    out.push_str(rest);
    out
}

/// Drop trailing breaks; empty becomes `None`.
fn finish(canonical: &str) -> Option<String> {
    let mut s = canonical;
    while let Some(rest) = s.strip_suffix(BR) {
        s = rest.trim_end();
    }
    (!s.is_empty()).then(|| s.to_string())
}

/// `<a>text</a>` and `<span>text</span>` without attributes become `text`.
fn unwrap_bare(fragment: &str) -> String {
    let mut text = fragment.to_string();
    for name in ["a", "span"] {
        let open = format!("<{}>", name);
        let close = format!("</{}>", name);
        let mut out = String::with_capacity(text.len());
        let mut rest = text.as_str();
        while let Some(start) = rest.find(&open) {
            let inner = start + open.len();
            match rest[inner..].find('<').map(|i| inner + i) {
                Some(end) if rest[end..].starts_with(&close) => {
                    out.push_str(&rest[..start]);
                    out.push_str(&rest[inner..end]);
                    rest = &rest[end + close.len()..];
                }
                _ => {
                    out.push_str(&rest[..inner]);
                    rest = &rest[inner..];
                }
            }
        }
        out.push_str(rest);
        text = out;
    }
    text
}

fn remove_empty_dd(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut rest = fragment;
    while let Some(start) = rest.find("<dd>") {
        let after = &rest[start + 4..];
        let gap = after.len() - after.trim_start().len();
        out.push_str(&rest[..start]);
        if after[gap..].starts_with("</dd>") {
            rest = &after[gap + 5..];
        } else {
            out.push_str("<dd>");
            rest = after;
        }
    }
    out.push_str(rest);
    out
}
