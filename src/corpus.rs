use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use config::{Config, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use tracing::info;

use crate::config::Settings;
use crate::error::WorksError;

// Listing tiles: <div class="img_wrap" data-category="sound"> <a href="./tSA.html">
static TILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<div class="img_wrap" data-category="(\w+)">\s*<a href="(?:\./)?([^"]+)">"#).unwrap()
});

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentEntry {
    pub file: String,
    pub id: String,
}

/// Hand-curated corpus artifact: display order plus the filename → id table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default)]
    pub documents: Vec<DocumentEntry>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, WorksError> {
        let manifest: Manifest = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|source| WorksError::Manifest {
                path: path.to_path_buf(),
                source,
            })?;
        manifest.check_unique()?;
        Ok(manifest)
    }

    fn check_unique(&self) -> Result<(), WorksError> {
        let mut seen = HashSet::new();
        for id in &self.order {
            if !seen.insert(id.as_str()) {
                return Err(WorksError::DuplicateId(id.clone()));
            }
        }
        Ok(())
    }

    /// id → source filename.
    pub fn files_by_id(&self) -> HashMap<String, String> {
        self.documents
            .iter()
            .map(|d| (d.id.clone(), d.file.clone()))
            .collect()
    }
}

/// Static lookup tables for one run, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub dir: PathBuf,
    pub order: Vec<String>,
    files: HashMap<String, String>,
    categories: HashMap<String, String>,
    default_category: String,
}

impl Corpus {
    pub fn load(settings: &Settings) -> Result<Self, WorksError> {
        let manifest = Manifest::load(&settings.manifest)?;
        let listing_path = settings.listing_path();
        let listing = fs::read_to_string(&listing_path).map_err(|source| WorksError::Listing {
            path: listing_path.clone(),
            source,
        })?;
        let categories = category_table(&listing);
        info!(
            works = manifest.order.len(),
            documents = manifest.documents.len(),
            categorized = categories.len(),
            "Loaded corpus tables"
        );
        Ok(Corpus {
            dir: settings.corpus_dir.clone(),
            files: manifest.files_by_id(),
            order: manifest.order,
            categories,
            default_category: settings.default_category.clone(),
        })
    }

    pub fn file_for(&self, id: &str) -> Option<&str> {
        self.files.get(id).map(String::as_str)
    }

    /// Category from the listing page, or the configured fallback.
    pub fn category_for(&self, file: &str) -> &str {
        self.categories
            .get(file)
            .map(String::as_str)
            .unwrap_or(&self.default_category)
    }

    /// Resolve and read the source document for `id`.
    pub fn read_document(&self, id: &str) -> Result<(String, String), WorksError> {
        let file = self
            .file_for(id)
            .ok_or_else(|| WorksError::NoMapping(id.to_string()))?;
        let path = self.dir.join(file);
        let html = fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => WorksError::MissingDocument(path.clone()),
            _ => WorksError::Document { path: path.clone(), source },
        })?;
        Ok((file.to_string(), html))
    }
}

/// Scan the listing page for `data-category` markers: filename → category.
pub fn category_table(listing: &str) -> HashMap<String, String> {
    TILE_RE
        .captures_iter(listing)
        .map(|caps| (caps[2].to_string(), caps[1].to_string()))
        .collect()
}
