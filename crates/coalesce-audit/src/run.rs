//! Offline audit over files: load the three trees, verify, and write the
//! four Markdown reports.

use crate::completeness::{CompletenessReport, CompletenessVerifier};
use crate::config::CoalesceConfig;
use crate::error::{AuditError, display_path};
use crate::report::{render_completeness, render_schema};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const SCHEMA_A_FILE: &str = "schema_source_a.md";
pub const SCHEMA_B_FILE: &str = "schema_source_b.md";
pub const SCHEMA_UNIFIED_FILE: &str = "schema_unified.md";
pub const COMPLETENESS_FILE: &str = "completeness_report.md";

#[derive(Debug, Clone, Default)]
pub struct AuditInputs {
    pub source_a: Option<PathBuf>,
    pub source_b: Option<PathBuf>,
    pub unified: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AuditRun {
    pub report: CompletenessReport,
    pub written: Vec<PathBuf>,
}

pub fn read_json(path: &Path) -> Result<Value, AuditError> {
    let text = fs::read_to_string(path).map_err(|source| AuditError::ReadFile {
        path: display_path(path),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| AuditError::ParseJson {
        path: display_path(path),
        source,
    })
}

/// A missing path or a file holding JSON `null` is an absent source.
pub fn load_tree(path: Option<&Path>) -> Result<Option<Value>, AuditError> {
    let Some(path) = path else {
        return Ok(None);
    };
    let tree = read_json(path)?;
    Ok((!tree.is_null()).then_some(tree))
}

pub fn write_report(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf, AuditError> {
    fs::create_dir_all(dir).map_err(|source| AuditError::WriteReport {
        path: display_path(dir),
        source,
    })?;
    let path = dir.join(file_name);
    fs::write(&path, contents).map_err(|source| AuditError::WriteReport {
        path: display_path(&path),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote report");
    Ok(path)
}

pub fn run_audit(
    inputs: &AuditInputs,
    config: &CoalesceConfig,
    reports_dir: &Path,
) -> Result<AuditRun, AuditError> {
    let source_a = load_tree(inputs.source_a.as_deref())?;
    let source_b = load_tree(inputs.source_b.as_deref())?;
    let unified = read_json(&inputs.unified)?;

    let verifier = CompletenessVerifier::from_config(config);
    let report = verifier.verify(source_a.as_ref(), source_b.as_ref(), &unified);

    let depth = config.audit.schema_max_depth;
    let absent = Value::Null;
    let renders = [
        (
            SCHEMA_A_FILE,
            render_schema(source_a.as_ref().unwrap_or(&absent), "Source A", depth),
        ),
        (
            SCHEMA_B_FILE,
            render_schema(source_b.as_ref().unwrap_or(&absent), "Source B", depth),
        ),
        (
            SCHEMA_UNIFIED_FILE,
            render_schema(&unified, "Unified Output", depth),
        ),
        (
            COMPLETENESS_FILE,
            render_completeness(&report, config.audit.sample_limit),
        ),
    ];

    let mut written = Vec::with_capacity(renders.len());
    for (file_name, contents) in &renders {
        written.push(write_report(reports_dir, file_name, contents)?);
    }

    tracing::info!(
        verdict = %report.verdict,
        missing = report.missing_count(),
        reports = written.len(),
        "audit complete"
    );
    Ok(AuditRun { report, written })
}
