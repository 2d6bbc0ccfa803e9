//! Loads a catalog file into an [`InMemoryCatalog`].

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::catalog::BoxRecord;
use super::catalog::FolderRecord;
use super::catalog::InMemoryCatalog;

#[derive(Debug, Error)]
pub enum CatalogSourceError {
    #[error("failed to read catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid TOML catalog: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unsupported catalog format `{0}` (use .json, .yaml, .yml or .toml)")]
    UnsupportedFormat(String),
    #[error("inconsistent catalog: {0}")]
    Inconsistent(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Yaml,
    Toml,
}

impl CatalogFormat {
    pub fn from_path(path: &Path) -> Result<Self, CatalogSourceError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(CatalogSourceError::UnsupportedFormat(extension)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub boxes: Vec<BoxRecord>,
    #[serde(default)]
    pub folders: Vec<FolderRecord>,
}

impl CatalogDocument {
    /// Box and folder ids must be unique and every folder's parent must exist.
    pub fn validate(&self) -> Result<(), CatalogSourceError> {
        let mut box_ids = HashSet::new();
        for record in &self.boxes {
            if !box_ids.insert(record.box_id) {
                return Err(CatalogSourceError::Inconsistent(format!(
                    "box {} appears more than once",
                    record.box_id
                )));
            }
        }
        let mut folder_ids = HashSet::new();
        for record in &self.folders {
            if !folder_ids.insert(record.folder_id) {
                return Err(CatalogSourceError::Inconsistent(format!(
                    "folder {} appears more than once",
                    record.folder_id
                )));
            }
            if !box_ids.contains(&record.parent_box_id) {
                return Err(CatalogSourceError::Inconsistent(format!(
                    "folder {} references missing box {}",
                    record.folder_id, record.parent_box_id
                )));
            }
        }
        Ok(())
    }

    pub fn into_catalog(self) -> Result<InMemoryCatalog, CatalogSourceError> {
        self.validate()?;
        Ok(InMemoryCatalog::new(self.boxes, self.folders))
    }
}

pub fn parse_catalog(
    raw: &str,
    format: CatalogFormat,
) -> Result<CatalogDocument, CatalogSourceError> {
    let document: CatalogDocument = match format {
        CatalogFormat::Json => serde_json::from_str(raw)?,
        CatalogFormat::Yaml => serde_yaml::from_str(raw)?,
        CatalogFormat::Toml => toml::from_str(raw)?,
    };
    Ok(document)
}

pub fn load_catalog(path: impl AsRef<Path>) -> Result<InMemoryCatalog, CatalogSourceError> {
    let path = path.as_ref();
    let format = CatalogFormat::from_path(path)?;
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parse_catalog(&raw, format)?;
    tracing::info!(
        path = %path.display(),
        boxes = document.boxes.len(),
        folders = document.folders.len(),
        "catalog loaded"
    );
    document.into_catalog().inspect_err(|err| {
        tracing::warn!(path = %path.display(), error = %err, "catalog rejected");
    })
}
