//! Read-only check of the record store against the source corpus.
//!
//! Fields are re-derived from each document by `derive`, which is written
//! independently of `parser`, then diffed against the stored JSON.

pub mod compare;
pub mod derive;
pub mod discrepancy;
pub mod report;

use std::collections::HashMap;
use std::fs;
use std::io;

use rayon::prelude::*;
use serde_json::Value;
use tracing::info;

use crate::config::Settings;
use crate::corpus::Manifest;
use crate::error::WorksError;
use crate::store::Index;
use discrepancy::Discrepancy;
use report::{Report, WorkReport};

/// Verify every work listed in the stored index. Only a missing index or
/// manifest is an error; everything else lands in the report.
pub fn verify_all(settings: &Settings) -> Result<Report, WorksError> {
    let index = Index::read(&settings.index_path())?;
    let files = Manifest::load(&settings.manifest)?.files_by_id();
    let ids = index.ids();
    info!(works = ids.len(), "Verifying record store");

    let works = ids
        .par_iter()
        .map(|id| WorkReport {
            id: id.to_string(),
            discrepancies: verify_work(settings, &files, id),
        })
        .collect();
    Ok(Report { works })
}

fn verify_work(settings: &Settings, files: &HashMap<String, String>, id: &str) -> Vec<Discrepancy> {
    let record_path = settings.record_path(id);
    let raw = match fs::read_to_string(&record_path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return vec![Discrepancy::MissingRecord(record_path)]
        }
        Err(e) => return vec![Discrepancy::UnreadableRecord(e.to_string())],
    };
    let record: Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => return vec![Discrepancy::UnreadableRecord(e.to_string())],
    };

    let Some(file) = files.get(id) else {
        return vec![Discrepancy::NoMapping];
    };
    let source_path = settings.corpus_dir.join(file);
    let html = match fs::read_to_string(&source_path) {
        Ok(html) => html,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return vec![Discrepancy::MissingSource(source_path)]
        }
        Err(e) => {
            return vec![Discrepancy::UnreadableSource {
                path: source_path,
                reason: e.to_string(),
            }]
        }
    };

    let facts = derive::derive(&html, id);
    compare::compare(id, &record, &facts)
}
