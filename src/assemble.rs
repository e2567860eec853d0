use std::collections::HashSet;
use std::fs;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::Settings;
use crate::corpus::Corpus;
use crate::error::WorksError;
use crate::parser::{self, extract::ExtractedWork};
use crate::store::{self, Index, WorkRecord, WriteStatus};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssembleCounts {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub errors: usize,
    /// Decorative wrappers removed across all works.
    pub rewrites: usize,
    /// Unknown labels dropped across all works.
    pub dropped: usize,
}

impl AssembleCounts {
    pub fn written(&self) -> usize {
        self.created + self.updated + self.unchanged
    }

    pub fn print(&self) {
        println!(
            "Wrote {} records ({} created, {} updated, {} unchanged), {} errors. {} wrappers unwrapped, {} unknown labels dropped.",
            self.written(),
            self.created,
            self.updated,
            self.unchanged,
            self.errors,
            self.rewrites,
            self.dropped,
        );
    }
}

struct Written {
    record: WorkRecord,
    status: WriteStatus,
    rewrites: usize,
    dropped: usize,
}

/// Read and extract one work without touching the record store.
pub fn extract_one(corpus: &Corpus, default_year: &str, id: &str) -> Result<ExtractedWork, WorksError> {
    let (file, html) = corpus.read_document(id)?;
    let category = corpus.category_for(&file);
    Ok(parser::process_document(&html, id, category, default_year))
}

fn assemble_one(corpus: &Corpus, settings: &Settings, id: &str) -> Result<Written, WorksError> {
    let work = extract_one(corpus, &settings.default_year, id)?;
    for label in &work.dropped_labels {
        warn!(id, label = %label, "Dropped section with unknown label");
    }
    let path = settings.record_path(id);
    let status = store::write_json(&path, &work.record).map_err(|e| match e {
        WorksError::Io(source) => WorksError::Record { path, source },
        other => other,
    })?;
    Ok(Written {
        record: work.record,
        status,
        rewrites: work.rewrites,
        dropped: work.dropped_labels.len(),
    })
}

/// Regenerate every record in display order, then the index. Per-work
/// failures are logged and counted; only fatal errors abort.
pub fn assemble_all(corpus: &Corpus, settings: &Settings) -> Result<AssembleCounts, WorksError> {
    fs::create_dir_all(&settings.output_dir)?;

    let pb = ProgressBar::new(corpus.order.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let outcomes: Vec<Result<Written, WorksError>> = corpus
        .order
        .par_iter()
        .map(|id| {
            let outcome = assemble_one(corpus, settings, id);
            if let Err(e) = &outcome {
                pb.suspend(|| warn!(id = %id, error = %e, "Skipped work"));
            }
            pb.inc(1);
            outcome
        })
        .collect();
    pb.finish_and_clear();

    let mut counts = AssembleCounts::default();
    let mut records = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(w) => {
                match w.status {
                    WriteStatus::Created => counts.created += 1,
                    WriteStatus::Updated => counts.updated += 1,
                    WriteStatus::Unchanged => counts.unchanged += 1,
                }
                counts.rewrites += w.rewrites;
                counts.dropped += w.dropped;
                records.push(w.record);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(_) => counts.errors += 1,
        }
    }

    let index = Index::build(settings.index_mode, &records);
    store::write_json(&settings.index_path(), &index)?;
    info!(records = records.len(), mode = ?settings.index_mode, "Wrote index");

    warn_stale(settings, &records)?;
    Ok(counts)
}

/// Record files left over from earlier runs are reported, never deleted.
fn warn_stale(settings: &Settings, records: &[WorkRecord]) -> Result<(), WorksError> {
    let current: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
    for entry in fs::read_dir(&settings.output_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem != "index" && !current.contains(stem) {
            warn!(file = %path.display(), "Stale record not in index");
        }
    }
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::IndexMode;
    use crate::verify;

    const MANIFEST: &str = r#"order = ["toki-shirube", "t-s-a", "sparse"]

[[documents]]
file = "toki.html"
id = "toki-shirube"

[[documents]]
file = "tSA.html"
id = "t-s-a"

[[documents]]
file = "sparse.html"
id = "sparse"
"#;

    /// Throwaway corpus built from the fixtures under `root`.
    fn corpus_in(root: &Path, manifest: &str) -> Settings {
        let works = root.join("works");
        fs::create_dir_all(&works).unwrap();
        for (fixture, name) in [
            ("toki.html", "toki.html"),
            ("tsa.html", "tSA.html"),
            ("sparse.html", "sparse.html"),
            ("my_work.html", "my_work.html"),
            ("works.html", "works.html"),
        ] {
            fs::copy(Path::new("tests/fixtures").join(fixture), works.join(name)).unwrap();
        }
        fs::write(root.join("works-manifest.toml"), manifest).unwrap();
        Settings {
            corpus_dir: works,
            manifest: root.join("works-manifest.toml"),
            output_dir: root.join("works-data"),
            ..Settings::default()
        }
    }

    fn run(settings: &Settings) -> AssembleCounts {
        let corpus = Corpus::load(settings).unwrap();
        assemble_all(&corpus, settings).unwrap()
    }

    #[test]
    fn rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let settings = corpus_in(dir.path(), MANIFEST);

        let first = run(&settings);
        assert_eq!(first.created, 3);
        let before = fs::read(settings.record_path("toki-shirube")).unwrap();
        let index_before = fs::read(settings.index_path()).unwrap();

        let second = run(&settings);
        assert_eq!(second.unchanged, 3);
        assert_eq!(second.created + second.updated, 0);
        assert_eq!(fs::read(settings.record_path("toki-shirube")).unwrap(), before);
        assert_eq!(fs::read(settings.index_path()).unwrap(), index_before);
    }

    #[test]
    fn index_ids_unique_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let settings = corpus_in(dir.path(), MANIFEST);
        run(&settings);

        let index = Index::read(&settings.index_path()).unwrap();
        let ids = index.ids();
        assert_eq!(ids, vec!["toki-shirube", "t-s-a", "sparse"]);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn every_record_has_images() {
        let dir = tempfile::tempdir().unwrap();
        let settings = corpus_in(dir.path(), MANIFEST);
        run(&settings);

        for id in ["toki-shirube", "t-s-a", "sparse"] {
            let raw = fs::read_to_string(settings.record_path(id)).unwrap();
            let record: WorkRecord = serde_json::from_str(&raw).unwrap();
            assert!(!record.images.is_empty(), "{} has no images", id);
            assert_eq!(record.thumbnail, record.images[0]);
        }
    }

    #[test]
    fn categories_resolved_from_listing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = corpus_in(dir.path(), MANIFEST);
        run(&settings);

        let read = |id: &str| -> WorkRecord {
            serde_json::from_str(&fs::read_to_string(settings.record_path(id)).unwrap()).unwrap()
        };
        assert_eq!(read("toki-shirube").category, "installation");
        assert_eq!(read("t-s-a").category, "design");
        assert_eq!(read("sparse").category, "code");
        assert_eq!(read("toki-shirube").year, "2023");
    }

    #[test]
    fn missing_work_skipped_batch_continues() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = MANIFEST
            .replace(r#"order = ["toki-shirube", "t-s-a", "sparse"]"#, r#"order = ["ghost", "toki-shirube", "unmapped"]"#)
            .replace("sparse.html", "ghost.html")
            .replace("id = \"sparse\"", "id = \"ghost\"");
        let settings = corpus_in(dir.path(), &manifest);

        let counts = run(&settings);
        assert_eq!(counts.errors, 2);
        assert_eq!(counts.written(), 1);
        let index = Index::read(&settings.index_path()).unwrap();
        assert_eq!(index.ids(), vec!["toki-shirube"]);
    }

    #[test]
    fn malformed_document_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = "order = [\"bad\", \"toki-shirube\"]\n\n[[documents]]\nfile = \"bad.html\"\nid = \"bad\"\n\n[[documents]]\nfile = \"toki.html\"\nid = \"toki-shirube\"\n";
        let settings = corpus_in(dir.path(), manifest);
        fs::write(settings.corpus_dir.join("bad.html"), [b'<', b'h', b'1', b'>', 0xff, 0xfe]).unwrap();

        let counts = run(&settings);
        assert_eq!(counts.errors, 1);
        assert_eq!(counts.written(), 1);
        assert!(settings.record_path("toki-shirube").exists());
        assert!(!settings.record_path("bad").exists());
        let index = Index::read(&settings.index_path()).unwrap();
        assert_eq!(index.ids(), vec!["toki-shirube"]);
    }

    #[test]
    fn failed_record_write_skips_only_that_work() {
        let dir = tempfile::tempdir().unwrap();
        let settings = corpus_in(dir.path(), MANIFEST);
        fs::create_dir_all(settings.record_path("t-s-a")).unwrap();

        let counts = run(&settings);
        assert_eq!(counts.errors, 1);
        assert_eq!(counts.written(), 2);
        let index = Index::read(&settings.index_path()).unwrap();
        assert_eq!(index.ids(), vec!["toki-shirube", "sparse"]);
    }

    #[test]
    fn metadata_index_mode() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            index_mode: IndexMode::Metadata,
            ..corpus_in(dir.path(), MANIFEST)
        };
        run(&settings);

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(settings.index_path()).unwrap()).unwrap();
        assert_eq!(raw["works"][0]["id"], "toki-shirube");
        assert_eq!(raw["works"][0]["title"], "Toki Shirube");
        assert_eq!(raw["works"][1]["category"], "design");
        assert!(raw.get("order").is_none());
    }

    #[test]
    fn round_trip_has_no_discrepancies() {
        let dir = tempfile::tempdir().unwrap();
        let settings = corpus_in(dir.path(), MANIFEST);
        run(&settings);

        let report = verify::verify_all(&settings).unwrap();
        assert_eq!(report.works.len(), 3);
        for work in &report.works {
            assert!(work.discrepancies.is_empty(), "{}: {:?}", work.id, work.discrepancies);
        }
    }

    #[test]
    fn dropped_label_surfaces_in_verification() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = "order = [\"my-work\"]\n\n[[documents]]\nfile = \"my_work.html\"\nid = \"my-work\"\n";
        let settings = corpus_in(dir.path(), manifest);

        let counts = run(&settings);
        assert_eq!(counts.dropped, 1);

        let report = verify::verify_all(&settings).unwrap();
        let found = &report.works[0].discrepancies;
        assert_eq!(found.len(), 1, "{:?}", found);
        assert!(matches!(
            &found[0],
            verify::discrepancy::Discrepancy::LinkShape { labels } if labels == &["Venue", "Link"]
        ));
    }

    #[test]
    fn tampered_record_is_caught() {
        let dir = tempfile::tempdir().unwrap();
        let settings = corpus_in(dir.path(), MANIFEST);
        run(&settings);

        let path = settings.record_path("t-s-a");
        let mut record: WorkRecord = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        record.title = "tSA".into();
        record.images.push("../image/tsa/old.png".into());
        store::write_json(&path, &record).unwrap();
        fs::remove_file(settings.record_path("sparse")).unwrap();

        let report = verify::verify_all(&settings).unwrap();
        assert_eq!(report.perfect(), 1);
        assert_eq!(report.with_errors(), 2);
        let kinds: Vec<_> = report.works[1].discrepancies.iter().map(|d| d.category()).collect();
        assert_eq!(
            kinds,
            vec![verify::discrepancy::Category::Title, verify::discrepancy::Category::Images]
        );
        assert!(matches!(
            report.works[2].discrepancies[..],
            [verify::discrepancy::Discrepancy::MissingRecord(_)]
        ));
    }

    #[test]
    fn unreadable_source_reported_apart_from_missing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = corpus_in(dir.path(), MANIFEST);
        run(&settings);
        fs::write(settings.corpus_dir.join("tSA.html"), [b'<', b'p', b'>', 0xff, 0xfe]).unwrap();
        fs::remove_file(settings.corpus_dir.join("sparse.html")).unwrap();

        let report = verify::verify_all(&settings).unwrap();
        assert!(report.works[0].discrepancies.is_empty());
        assert!(matches!(
            &report.works[1].discrepancies[..],
            [verify::discrepancy::Discrepancy::UnreadableSource { path, .. }] if path.ends_with("tSA.html")
        ));
        assert!(matches!(
            report.works[2].discrepancies[..],
            [verify::discrepancy::Discrepancy::MissingSource(_)]
        ));
    }

    #[test]
    fn missing_index_is_fatal_for_verify() {
        let dir = tempfile::tempdir().unwrap();
        let settings = corpus_in(dir.path(), MANIFEST);
        let err = verify::verify_all(&settings).unwrap_err();
        assert!(matches!(err, WorksError::Index { .. }));
    }
}
