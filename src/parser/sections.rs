use std::sync::LazyLock;

use regex::Regex;

use super::normalize::{clean_markup, plain_text, strip_comments, BREAK};

static DT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<dt[^>]*>(.*?)</dt>").unwrap());
static DD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<dd[^>]*>(.*?)</dd>").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSection {
    pub label: String,
    /// Normalized value blocks joined with `<br>`, in document order.
    pub value: String,
}

/// Label → merged value, in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct LabelSections {
    pub entries: Vec<LabelSection>,
    /// Decorative wrappers removed while cleaning values.
    pub unwrapped: usize,
}

impl LabelSections {
    fn push(&mut self, label: String, value: String) {
        match self.entries.iter_mut().find(|e| e.label == label) {
            Some(existing) => {
                existing.value.push_str(BREAK);
                existing.value.push_str(&value);
            }
            None => self.entries.push(LabelSection { label, value }),
        }
    }
}

/// Find every `<dt>` label and the `<dd>` blocks that follow it up to the
/// next label. Comments are removed first.
pub fn scan_sections(body: &str) -> LabelSections {
    let body = strip_comments(body);
    let labels: Vec<_> = DT_RE.captures_iter(&body).collect();
    let mut sections = LabelSections::default();

    for (i, caps) in labels.iter().enumerate() {
        let label = clean_label(&caps[1]);
        if label.is_empty() {
            continue;
        }
        let start = caps.get(0).map_or(0, |m| m.end());
        let end = labels
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(body.len(), |m| m.start());

        let mut values = Vec::new();
        for dd in DD_RE.captures_iter(&body[start..end]) {
            let (value, unwrapped) = clean_markup(&dd[1]);
            sections.unwrapped += unwrapped;
            values.extend(value);
        }
        if values.is_empty() {
            continue;
        }
        sections.push(label, values.join(BREAK));
    }

    sections
}

/// `Tool</a>` and `Credit:` both read as their bare label.
pub fn clean_label(raw: &str) -> String {
    plain_text(raw).trim_end_matches(':').trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    impl LabelSections {
        fn get(&self, label: &str) -> Option<&str> {
            self.entries
                .iter()
                .find(|e| e.label == label)
                .map(|e| e.value.as_str())
        }
    }

    #[test]
    fn single_label() {
        let s = scan_sections("<dl><dt>Credit</dt>\n<dd>\n  Alice  Smith\n</dd></dl>");
        assert_eq!(s.get("Credit"), Some("Alice Smith"));
    }

    #[test]
    fn multiple_values_merge_in_order() {
        let html = "<dt>Link</dt><dd>X</dd>\n<br>\n<dd>Y</dd><dt>Credit</dt><dd>Z</dd>";
        let s = scan_sections(html);
        assert_eq!(s.get("Link"), Some("X<br>Y"));
        assert_eq!(s.get("Credit"), Some("Z"));
    }

    #[test]
    fn repeated_label_blocks_merge() {
        let html = "<dt>Link</dt><dd>X</dd><dt>Award</dt><dd>A</dd><dt>Link</dt><dd>Y</dd>";
        let s = scan_sections(html);
        assert_eq!(s.get("Link"), Some("X<br>Y"));
        let labels: Vec<_> = s.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Link", "Award"]);
    }

    #[test]
    fn commented_sections_ignored() {
        let html = "<!-- <dt>Award</dt><dd>stale</dd> --><dt>Link</dt><dd><!-- old -->new</dd>";
        let s = scan_sections(html);
        assert!(s.get("Award").is_none());
        assert_eq!(s.get("Link"), Some("new"));
    }

    #[test]
    fn label_without_values_omitted() {
        let s = scan_sections("<dt>Paper</dt><dt>Link</dt><dd>  </dd><dd>x</dd>");
        assert!(s.get("Paper").is_none());
        assert_eq!(s.get("Link"), Some("x"));
    }

    #[test]
    fn wrappers_and_trailing_breaks() {
        let html = "<dt>Credit</dt><dd><a>Alice</a><br><a href=\"https://b.example\" class=\"list\">Bob</a><br>\n</dd>";
        let s = scan_sections(html);
        assert_eq!(
            s.get("Credit"),
            Some("Alice<br><a href=\"https://b.example\" class=\"list\">Bob</a>")
        );
        assert_eq!(s.unwrapped, 1);
    }

    #[test]
    fn malformed_labels() {
        let s = scan_sections("<dt>Tool</a></dt><dd>Max</dd><dt>Grants:</dt><dd>JSPS</dd>");
        assert_eq!(s.get("Tool"), Some("Max"));
        assert_eq!(s.get("Grants"), Some("JSPS"));
    }

    #[test]
    fn unknown_labels_kept_literally() {
        let s = scan_sections("<dt>Venue</dt><dd>Hall A</dd>");
        assert_eq!(s.get("Venue"), Some("Hall A"));
    }

    #[test]
    fn values_before_first_label_ignored() {
        let s = scan_sections("<p>intro<dd>stray</dd></p><dt>Link</dt><dd>x</dd>");
        assert_eq!(s.entries.len(), 1);
        assert_eq!(s.get("Link"), Some("x"));
    }
}
