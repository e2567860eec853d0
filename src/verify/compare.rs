use serde_json::Value;

use super::derive::{anchor_separators, canonical, flatten, SourceFacts};
use super::discrepancy::Discrepancy;
use crate::parser::labels::{self, ValueKind};

/// Keys compared on their own; everything else may fall into the link group.
const DEDICATED: [&str; 3] = ["credit", "tools", "link"];

pub fn compare(id: &str, record: &Value, facts: &SourceFacts) -> Vec<Discrepancy> {
    let mut found = Vec::new();

    let title = facts.title.clone().unwrap_or_else(|| id.to_string());
    let stored_title = record.get("title").and_then(Value::as_str).unwrap_or_default();
    if stored_title != title {
        found.push(Discrepancy::Title {
            record: stored_title.to_string(),
            source: title,
        });
    }

    let images: Vec<String> = record
        .get("images")
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default();
    found.extend(compare_images(&images, &facts.images));

    let description = text(record.get("description"));
    if description != facts.description {
        found.push(Discrepancy::Description {
            record: description,
            source: facts.description.clone(),
        });
    }

    for key in labels::section_keys() {
        if key == "link" {
            continue;
        }
        let present = record.get(key).is_some();
        if !present && !DEDICATED.contains(&key) {
            continue;
        }
        let stored = text(record.get(key));
        let expected = expected_for(key, facts);
        if stored != expected {
            found.push(Discrepancy::Field { key, record: stored, source: expected });
        }
    }

    found.extend(compare_link(record, facts));
    found
}

/// Missing and extra are set differences; order only counts once the sets agree.
pub fn compare_images(stored: &[String], source: &[String]) -> Vec<Discrepancy> {
    if stored == source {
        return Vec::new();
    }
    let missing: Vec<String> = source.iter().filter(|i| !stored.contains(i)).cloned().collect();
    let extra: Vec<String> = stored.iter().filter(|i| !source.contains(i)).cloned().collect();
    let mut found = Vec::new();
    if missing.is_empty() && extra.is_empty() {
        found.push(Discrepancy::ImagesOrder);
    }
    if !missing.is_empty() {
        found.push(Discrepancy::ImagesMissing(missing));
    }
    if !extra.is_empty() {
        found.push(Discrepancy::ImagesExtra(extra));
    }
    found
}

/// Source sections that belong under `link` for this record.
pub fn link_group(record: &Value, facts: &SourceFacts) -> Vec<(String, String)> {
    facts
        .sections
        .iter()
        .filter(|(label, _)| match labels::lookup(label) {
            None => true,
            Some(spec) if spec.key == "link" => true,
            Some(spec) if DEDICATED.contains(&spec.key) => false,
            Some(spec) => record.get(spec.key).is_none(),
        })
        .map(|(label, values)| (label.clone(), anchor_separators(&values.join("<br>"))))
        .collect()
}

pub fn compare_link(record: &Value, facts: &SourceFacts) -> Vec<Discrepancy> {
    let group = link_group(record, facts);
    let labels = || group.iter().map(|(l, _)| l.clone()).collect::<Vec<_>>();

    match record.get("link").unwrap_or(&Value::Null) {
        Value::Null if group.is_empty() => Vec::new(),
        Value::Null => vec![Discrepancy::LinkNull { labels: labels() }],
        Value::String(_) | Value::Object(_) if group.is_empty() => vec![Discrepancy::LinkWithoutSource],
        Value::String(stored) => match group.as_slice() {
            [(label, source)] if canonical(stored) != canonical(source) => vec![Discrepancy::LinkMismatch {
                label: label.clone(),
                record: stored.clone(),
                source: source.clone(),
            }],
            [_] => Vec::new(),
            _ => vec![Discrepancy::LinkShape { labels: labels() }],
        },
        Value::Object(map) => {
            let mut found = Vec::new();
            for (label, value) in map {
                let stored = value.as_str().map(String::from).unwrap_or_else(|| value.to_string());
                match group.iter().find(|(l, _)| l == label) {
                    None => found.push(Discrepancy::LinkKeyExtra { label: label.clone() }),
                    Some((_, source)) if canonical(&stored) != canonical(source) => {
                        found.push(Discrepancy::LinkKeyMismatch {
                            label: label.clone(),
                            record: stored,
                            source: source.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
            for (label, source) in &group {
                if !map.contains_key(label) {
                    found.push(Discrepancy::LinkKeyMissing {
                        label: label.clone(),
                        source: source.clone(),
                    });
                }
            }
            found
        }
        _ => vec![Discrepancy::LinkShape { labels: labels() }],
    }
}

/// What the record should hold under `key`, rebuilt from every label that maps to it.
fn expected_for(key: &str, facts: &SourceFacts) -> Option<String> {
    let mut kind = ValueKind::Markup;
    let mut blocks: Vec<String> = Vec::new();
    for (label, values) in &facts.sections {
        let Some(spec) = labels::lookup(label).filter(|s| s.key == key) else {
            continue;
        };
        kind = spec.kind;
        blocks.extend(values.iter().cloned());
    }
    let joined = match kind {
        ValueKind::Markup => blocks.join("<br>"),
        ValueKind::Text => blocks
            .iter()
            .map(|b| flatten(b))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
    };
    (!joined.is_empty()).then_some(joined)
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
