use std::fmt;
use std::path::PathBuf;

/// One field-level mismatch between a stored record and its source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    MissingRecord(PathBuf),
    UnreadableRecord(String),
    NoMapping,
    MissingSource(PathBuf),
    UnreadableSource { path: PathBuf, reason: String },
    Title { record: String, source: String },
    ImagesMissing(Vec<String>),
    ImagesExtra(Vec<String>),
    ImagesOrder,
    Description { record: Option<String>, source: Option<String> },
    Field { key: &'static str, record: Option<String>, source: Option<String> },
    LinkNull { labels: Vec<String> },
    /// Plain-string link while the source has several link-group sections.
    LinkShape { labels: Vec<String> },
    LinkWithoutSource,
    LinkMismatch { label: String, record: String, source: String },
    LinkKeyMissing { label: String, source: String },
    LinkKeyExtra { label: String },
    LinkKeyMismatch { label: String, record: String, source: String },
}

/// Report buckets, in print order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Title,
    Images,
    DescriptionMarkup,
    CreditMarkup,
    ToolsNull,
    Field,
    LinkNull,
    LinkShape,
    LinkContent,
    Inputs,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Title => "title mismatch",
            Category::Images => "images mismatch",
            Category::DescriptionMarkup => "description markup",
            Category::CreditMarkup => "credit markup",
            Category::ToolsNull => "tools null but source has tools",
            Category::Field => "other field mismatch",
            Category::LinkNull => "link null but source has sections",
            Category::LinkShape => "link is string, should be mapping",
            Category::LinkContent => "link mapping keys/content",
            Category::Inputs => "missing inputs",
        }
    }
}

impl Discrepancy {
    pub fn category(&self) -> Category {
        match self {
            Discrepancy::MissingRecord(_)
            | Discrepancy::UnreadableRecord(_)
            | Discrepancy::NoMapping
            | Discrepancy::MissingSource(_)
            | Discrepancy::UnreadableSource { .. } => Category::Inputs,
            Discrepancy::Title { .. } => Category::Title,
            Discrepancy::ImagesMissing(_) | Discrepancy::ImagesExtra(_) | Discrepancy::ImagesOrder => {
                Category::Images
            }
            Discrepancy::Description { .. } => Category::DescriptionMarkup,
            Discrepancy::Field { key: "credit", .. } => Category::CreditMarkup,
            Discrepancy::Field { key: "tools", record: None, source: Some(_) } => Category::ToolsNull,
            Discrepancy::Field { .. } => Category::Field,
            Discrepancy::LinkNull { .. } => Category::LinkNull,
            Discrepancy::LinkShape { .. } => Category::LinkShape,
            Discrepancy::LinkWithoutSource
            | Discrepancy::LinkMismatch { .. }
            | Discrepancy::LinkKeyMissing { .. }
            | Discrepancy::LinkKeyExtra { .. }
            | Discrepancy::LinkKeyMismatch { .. } => Category::LinkContent,
        }
    }
}

fn quoted(value: &Option<String>) -> String {
    match value {
        Some(v) => format!("'{}'", v),
        None => "null".to_string(),
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::MissingRecord(path) => write!(f, "record file not found: {}", path.display()),
            Discrepancy::UnreadableRecord(reason) => write!(f, "record file unreadable: {}", reason),
            Discrepancy::NoMapping => write!(f, "no source document mapping for this id"),
            Discrepancy::MissingSource(path) => write!(f, "source document not found: {}", path.display()),
            Discrepancy::UnreadableSource { path, reason } => {
                write!(f, "source document unreadable: {}: {}", path.display(), reason)
            }
            Discrepancy::Title { record, source } => {
                write!(f, "title: record='{}' vs source='{}'", record, source)
            }
            Discrepancy::ImagesMissing(images) => {
                write!(f, "images: missing in record: {:?}", images)
            }
            Discrepancy::ImagesExtra(images) => write!(f, "images: extra in record: {:?}", images),
            Discrepancy::ImagesOrder => write!(f, "images: order mismatch"),
            Discrepancy::Description { record, source } => write!(
                f,
                "description: record={} vs source={}",
                quoted(record),
                quoted(source)
            ),
            Discrepancy::Field { key, record: None, source: Some(source) } => {
                write!(f, "{}: record is null but source has '{}'", key, source)
            }
            Discrepancy::Field { key, record: Some(record), source: None } => {
                write!(f, "{}: record has '{}' but source has no such section", key, record)
            }
            Discrepancy::Field { key, record, source } => {
                write!(f, "{}: record={} vs source={}", key, quoted(record), quoted(source))
            }
            Discrepancy::LinkNull { labels } => {
                write!(f, "link: record is null but source has sections: {:?}", labels)
            }
            Discrepancy::LinkShape { labels } => {
                write!(f, "link: record is string but source has multiple sections: {:?}", labels)
            }
            Discrepancy::LinkWithoutSource => {
                write!(f, "link: record has data but source has no link sections")
            }
            Discrepancy::LinkMismatch { label, record, source } => write!(
                f,
                "link: record is string, source section '{}' differs: record='{}' vs source='{}'",
                label, record, source
            ),
            Discrepancy::LinkKeyMissing { label, source } => {
                write!(f, "link.{}: in source but not in record (value: '{}')", label, source)
            }
            Discrepancy::LinkKeyExtra { label } => {
                write!(f, "link.{}: in record but not in source", label)
            }
            Discrepancy::LinkKeyMismatch { label, record, source } => write!(
                f,
                "link.{}: record='{}' vs source='{}'",
                label, record, source
            ),
        }
    }
}
