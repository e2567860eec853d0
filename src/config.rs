use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::WorksError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    /// `{ "order": [id, ...] }`
    Order,
    /// `{ "works": [{ id, title, year, category }, ...] }`
    Metadata,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub corpus_dir: PathBuf,
    pub listing_page: String,
    pub manifest: PathBuf,
    pub output_dir: PathBuf,
    pub index_mode: IndexMode,
    pub default_category: String,
    pub default_year: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            corpus_dir: PathBuf::from("works"),
            listing_page: "works.html".into(),
            manifest: PathBuf::from("works-manifest.toml"),
            output_dir: PathBuf::from("works-data"),
            index_mode: IndexMode::Order,
            default_category: "code".into(),
            default_year: "2024".into(),
        }
    }
}

impl Settings {
    /// `works.toml` (or `explicit`), then `WORKS_*` environment variables.
    pub fn load(explicit: Option<&Path>) -> Result<Self, WorksError> {
        let file = match explicit {
            Some(path) => File::from(path).required(true),
            None => File::with_name("works").required(false),
        };
        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("WORKS"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn listing_path(&self) -> PathBuf {
        self.corpus_dir.join(&self.listing_page)
    }

    pub fn index_path(&self) -> PathBuf {
        self.output_dir.join("index.json")
    }

    pub fn record_path(&self, id: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", id))
    }
}
