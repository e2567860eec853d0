/// How a section value is rendered into its record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Markup kept (attributed anchors, `<br>` separators).
    Markup,
    /// All tags flattened to text.
    Text,
}

#[derive(Debug, Clone, Copy)]
pub struct LabelSpec {
    pub label: &'static str,
    pub key: &'static str,
    pub kind: ValueKind,
}

const fn markup(label: &'static str, key: &'static str) -> LabelSpec {
    LabelSpec { label, key, kind: ValueKind::Markup }
}

/// Document label → record key. Adding a label is a one-line change here.
pub const LABELS: &[LabelSpec] = &[
    markup("Credit", "credit"),
    LabelSpec { label: "Tool", key: "tools", kind: ValueKind::Text },
    LabelSpec { label: "Tools", key: "tools", kind: ValueKind::Text },
    markup("Link", "link"),
    markup("Exhibition", "exhibition"),
    markup("Award", "award"),
    markup("Paper", "paper"),
    markup("Grants", "grants"),
    markup("Co-create with", "collaborators"),
    markup("Performers", "performers"),
    markup("Download", "download"),
    markup("Citation", "citation"),
    markup("Related", "related"),
];

pub fn lookup(label: &str) -> Option<&'static LabelSpec> {
    LABELS.iter().find(|spec| spec.label == label)
}

/// Record keys filled from label sections, in schema order, without duplicates.
pub fn section_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = Vec::new();
    for spec in LABELS {
        if !keys.contains(&spec.key) {
            keys.push(spec.key);
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels() {
        assert_eq!(lookup("Co-create with").map(|s| s.key), Some("collaborators"));
        assert_eq!(lookup("Tool").map(|s| s.kind), Some(ValueKind::Text));
        assert!(lookup("Venue").is_none());
        assert!(lookup("link").is_none());
    }

    #[test]
    fn keys_are_unique_and_ordered() {
        let keys = section_keys();
        assert_eq!(keys.first(), Some(&"credit"));
        assert_eq!(keys.iter().filter(|k| **k == "tools").count(), 1);
        assert_eq!(keys.len(), 12);
    }
}
