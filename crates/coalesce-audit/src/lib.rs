//! # Coalesce Audit
//!
//! Offline verification that a unified document lost nothing from its two
//! sources, plus the Markdown schema and completeness reports.
//!
//! ## Architecture
//!
//! ```text
//! config        ← coalesce.toml: build sections, depths, containment policy
//!     │
//! completeness  ← CompletenessVerifier: missing paths, merges, conflicts
//!     │
//! report        ← SchemaReporter: schema tables and the pass/fail report
//!     │
//! run           ← file loading and report writing for the CLI
//! ```
//!
//! Verification reads; it never mutates the trees it is given.

pub mod completeness;
pub mod config;
pub mod error;
pub mod report;
pub mod run;

pub use completeness::{
    CompletenessReport, CompletenessVerifier, ContainmentPolicy, PathCounts, Verdict, verify,
};
pub use config::{AuditOptions, CoalesceConfig, DEFAULT_REPORTS_DIR, DEFAULT_SAMPLE_LIMIT};
pub use error::AuditError;
pub use report::{render_completeness, render_schema, sample_with_truncation, verdict_line};
pub use run::{
    AuditInputs, AuditRun, COMPLETENESS_FILE, SCHEMA_A_FILE, SCHEMA_B_FILE, SCHEMA_UNIFIED_FILE,
    load_tree, read_json, run_audit, write_report,
};
