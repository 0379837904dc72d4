//! `coalesce.toml` configuration.
//!
//! ```toml
//! [build]
//! known_sections = ["product_info", "scores", "swot"]
//!
//! [audit]
//! schema_max_depth = 5
//! verify_max_depth = 10
//! containment = "structural"
//! sample_limit = 25
//! reports_dir = "reports"
//! ```
//!
//! Every field is optional; unknown keys are rejected.

use crate::completeness::ContainmentPolicy;
use crate::error::{AuditError, display_path};
use coalesce_kernel::{BuildOptions, SCHEMA_MAX_DEPTH, VERIFY_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SAMPLE_LIMIT: usize = 25;
pub const DEFAULT_REPORTS_DIR: &str = "reports";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditOptions {
    pub schema_max_depth: usize,
    pub verify_max_depth: usize,
    pub containment: ContainmentPolicy,
    /// Cap on merges/conflicts listed in the completeness report.
    pub sample_limit: usize,
    pub reports_dir: PathBuf,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            schema_max_depth: SCHEMA_MAX_DEPTH,
            verify_max_depth: VERIFY_MAX_DEPTH,
            containment: ContainmentPolicy::default(),
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoalesceConfig {
    pub build: BuildOptions,
    pub audit: AuditOptions,
}

impl CoalesceConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| AuditError::ReadFile {
            path: display_path(path),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| AuditError::ParseToml {
            path: display_path(path),
            source,
        })
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, AuditError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = CoalesceConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, CoalesceConfig::default());
        assert_eq!(config.audit.verify_max_depth, 10);
        assert_eq!(config.audit.schema_max_depth, 5);
        assert!(config.build.is_known("swot"));
    }

    #[test]
    fn partial_config_overrides_selected_fields() {
        let config = CoalesceConfig::from_toml_str(
            r#"
            [build]
            known_sections = ["scores"]

            [audit]
            containment = "structural"
            sample_limit = 3
            "#,
        )
        .expect("config parses");
        assert_eq!(config.build.known_sections, vec!["scores".to_string()]);
        assert_eq!(config.audit.containment, ContainmentPolicy::Structural);
        assert_eq!(config.audit.sample_limit, 3);
        assert_eq!(config.audit.verify_max_depth, 10);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CoalesceConfig::from_toml_str("[audit]\nmax_depth = 3\n").is_err());
        assert!(CoalesceConfig::from_toml_str("[audit]\ncontainment = \"fuzzy\"\n").is_err());
    }
}
