use std::path::Path;
use thiserror::Error;

/// File-system and parse failures of the offline audit. Loss of source
/// paths is never an error; it is reported through the verdict.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to read file: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json at {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write report: {path}: {source}")]
    WriteReport {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
