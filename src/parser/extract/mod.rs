pub mod description;
pub mod images;
pub mod title;

use super::labels::{self, ValueKind};
use super::normalize::{plain_text, standardize_separators, BREAK};
use super::sections::LabelSections;
use crate::store::WorkRecord;

pub struct ExtractedWork {
    pub record: WorkRecord,
    /// Labels found in the document with no record key.
    pub dropped_labels: Vec<String>,
    /// Markup rewrites applied while cleaning (wrappers, empty entries,
    /// link separators).
    pub rewrites: usize,
}

pub fn extract_all(
    id: &str,
    category: &str,
    default_year: &str,
    body: &str,
    sections: &LabelSections,
) -> ExtractedWork {
    let mut record = WorkRecord::new(id);
    record.category = category.to_string();
    record.title = title::extract(body).unwrap_or_else(|| id.to_string());
    record.images = images::extract(body, id);
    record.thumbnail = record.images[0].clone();

    let (description, desc_rewrites) = description::extract(body);
    record.year = description::year(description.as_deref()).unwrap_or_else(|| default_year.to_string());
    record.description = description;

    let (dropped_labels, separators) = fill_sections(&mut record, sections);

    ExtractedWork {
        record,
        dropped_labels,
        rewrites: desc_rewrites + sections.unwrapped + separators,
    }
}

/// Map label sections onto record keys through the label table; returns the
/// labels that have no key and the number of link separators rewritten.
fn fill_sections(record: &mut WorkRecord, sections: &LabelSections) -> (Vec<String>, usize) {
    let mut dropped = Vec::new();
    let mut separators = 0;
    for entry in &sections.entries {
        let Some(spec) = labels::lookup(&entry.label) else {
            dropped.push(entry.label.clone());
            continue;
        };
        let (value, separator) = match spec.kind {
            ValueKind::Markup if spec.key == "link" => {
                let (value, n) = standardize_separators(&entry.value);
                separators += n;
                (value, BREAK)
            }
            ValueKind::Markup => (entry.value.clone(), BREAK),
            ValueKind::Text => (plain_text(&entry.value), " "),
        };
        if value.is_empty() {
            continue;
        }
        let Some(slot) = record.section_mut(spec.key) else {
            continue;
        };
        let merged = match slot.take() {
            Some(mut existing) => {
                existing.push_str(separator);
                existing.push_str(&value);
                existing
            }
            None => value,
        };
        *slot = Some(merged);
    }
    (dropped, separators)
}

// ── Tests ──
