//! Request documents on disk, YAML or JSON by file extension.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::request::Request;

pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Document encoding, chosen from the extension; anything but `.json` is YAML.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

pub fn parse<T: DeserializeOwned>(content: &str, format: Format) -> DocumentResult<T> {
    Ok(match format {
        Format::Yaml => serde_yaml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    })
}

fn load<T: DeserializeOwned>(path: &Path) -> DocumentResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content, Format::from_path(path))
}

pub fn load_request(path: &Path) -> DocumentResult<Request> {
    load(path)
}

/// A batch document is a sequence of requests.
pub fn load_batch(path: &Path) -> DocumentResult<Vec<Request>> {
    load(path)
}
