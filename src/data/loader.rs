//! Shared document loading for knowledge-base files: JSON or YAML by extension,
//! with an embedded default when no override is present on disk.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{DeckError, Result};

/// Normalize a card name for lookup: alphanumeric lowercase only,
/// so "P.E.K.K.A", "pekka" and "Pekka" resolve to the same card.
pub fn normalize_lookup(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Parse `raw` as YAML when `path` has a yaml extension, JSON otherwise.
pub fn parse_document<T: DeserializeOwned>(raw: &str, path: &Path) -> Result<T> {
    let parsed = if is_yaml(path) {
        serde_yaml::from_str(raw).map_err(|err| err.to_string())
    } else {
        serde_json::from_str(raw).map_err(|err| err.to_string())
    };
    parsed.map_err(|message| DeckError::KnowledgeBase {
        path: path.display().to_string(),
        message,
    })
}

/// Load a document from `path` if given and present; otherwise parse `embedded`.
/// A missing override falls back with a warning. A malformed override is an error.
pub fn load_with_fallback<T: DeserializeOwned>(
    path: Option<&Path>,
    embedded: &str,
    embedded_name: &str,
) -> Result<T> {
    if let Some(path) = path {
        match fs::read_to_string(path) {
            Ok(raw) => return parse_document(&raw, path),
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "knowledge override unavailable, using embedded default"
                );
            }
        }
    }
    parse_document(embedded, Path::new(embedded_name))
}
