use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::IndexMode;
use crate::error::WorksError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkRecord {
    pub id: String,
    pub title: String,
    pub category: String,
    pub year: String,
    pub thumbnail: String,
    pub images: Vec<String>,
    pub description: Option<String>,
    pub credit: Option<String>,
    pub tools: Option<String>,
    pub link: Option<String>,
    pub exhibition: Option<String>,
    pub award: Option<String>,
    pub paper: Option<String>,
    pub grants: Option<String>,
    pub collaborators: Option<String>,
    pub performers: Option<String>,
    pub download: Option<String>,
    pub citation: Option<String>,
    pub related: Option<String>,
}

impl WorkRecord {
    pub fn new(id: &str) -> Self {
        WorkRecord {
            id: id.to_string(),
            title: String::new(),
            category: String::new(),
            year: String::new(),
            thumbnail: String::new(),
            images: Vec::new(),
            description: None,
            credit: None,
            tools: None,
            link: None,
            exhibition: None,
            award: None,
            paper: None,
            grants: None,
            collaborators: None,
            performers: None,
            download: None,
            citation: None,
            related: None,
        }
    }

    /// Slot for a label-section key from the label table.
    pub fn section_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        let slot = match key {
            "credit" => &mut self.credit,
            "tools" => &mut self.tools,
            "link" => &mut self.link,
            "exhibition" => &mut self.exhibition,
            "award" => &mut self.award,
            "paper" => &mut self.paper,
            "grants" => &mut self.grants,
            "collaborators" => &mut self.collaborators,
            "performers" => &mut self.performers,
            "download" => &mut self.download,
            "citation" => &mut self.citation,
            "related" => &mut self.related,
            _ => return None,
        };
        Some(slot)
    }

    pub fn summary(&self) -> IndexEntry {
        IndexEntry {
            id: self.id.clone(),
            title: self.title.clone(),
            year: self.year.clone(),
            category: self.category.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub category: String,
}

/// Both index shapes; readers must accept either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Index {
    Order { order: Vec<String> },
    Works { works: Vec<IndexEntry> },
}

impl Index {
    pub fn build(mode: IndexMode, records: &[WorkRecord]) -> Self {
        match mode {
            IndexMode::Order => Index::Order {
                order: records.iter().map(|r| r.id.clone()).collect(),
            },
            IndexMode::Metadata => Index::Works {
                works: records.iter().map(WorkRecord::summary).collect(),
            },
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        match self {
            Index::Order { order } => order.iter().map(String::as_str).collect(),
            Index::Works { works } => works.iter().map(|w| w.id.as_str()).collect(),
        }
    }

    pub fn read(path: &Path) -> Result<Self, WorksError> {
        let raw = fs::read_to_string(path).map_err(|e| WorksError::Index {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| WorksError::Index {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Pretty JSON with a trailing newline; byte-stable for equal input.
pub fn to_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, WorksError> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Created,
    Updated,
    Unchanged,
}

/// Always overwrite; report how the new bytes relate to the previous file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<WriteStatus, WorksError> {
    let bytes = to_json_bytes(value)?;
    let status = match fs::read(path) {
        Ok(previous) if previous == bytes => WriteStatus::Unchanged,
        Ok(_) => WriteStatus::Updated,
        Err(_) => WriteStatus::Created,
    };
    fs::write(path, bytes)?;
    Ok(status)
}
