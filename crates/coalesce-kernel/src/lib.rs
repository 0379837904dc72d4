//! # Coalesce Kernel
//!
//! Zero-loss aggregation of two independently produced analysis trees: every
//! path present in either source must stay reachable in the unified document.
//!
//! This crate is **schema-agnostic**: it does not prescribe what the analysis
//! sections mean. It only prescribes how two trees combine and how their
//! provenance is recorded.
//!
//! ## Architecture
//!
//! ```text
//! paths          ← TreeWalker: path extraction, resolution, type tags
//!     │
//! merge          ← DeepMerger: origin tags, recursive records, concat, conflicts
//!     │
//! visuals        ← VisualArtifactDetector: chart specs, data URIs, base64 blobs
//!     │
//! unified        ← UnifiedOutputBuilder: raw_sources + merged + visuals + status
//! ```
//!
//! `extract` sits beside the pipeline: it pulls a JSON document out of a
//! free-text model reply before that reply becomes a source tree.

pub mod error;
pub mod extract;
pub mod merge;
pub mod paths;
pub mod unified;
pub mod visuals;

pub use error::CoalesceError;
pub use extract::{Extraction, extract_json, extract_json_or_err};
pub use merge::{Origin, as_tagged, as_two_sided, merge, project_entry, project_origin};
pub use paths::{
    PathSegment, SCHEMA_MAX_DEPTH, TypeTag, VERIFY_MAX_DEPTH, extract_path_values, extract_paths,
    join_key, parse_path, resolve_path, type_at_path,
};
pub use unified::{
    BuildOptions, BuildRequest, DEFAULT_KNOWN_SECTIONS, ErrorRecord, RawSources, Status,
    UnifiedDocument, UnifiedOutputBuilder, VISUALS_KEY,
};
pub use visuals::{VisualKind, VisualRef, find_visuals};

/// A JSON-like record: the `Object` variant of [`serde_json::Value`].
pub type Record = serde_json::Map<String, serde_json::Value>;
