use crate::support::{emit_or_exit, exit_with, load_config_or_exit};
use coalesce_audit::{read_json, render_schema};
use std::path::Path;

pub fn run(
    file: String,
    name: Option<String>,
    max_depth: Option<usize>,
    out: Option<String>,
    config: Option<String>,
) {
    let config = load_config_or_exit(config.as_deref());
    let path = Path::new(&file);
    let tree = read_json(path).unwrap_or_else(|err| exit_with(err));

    let name = name.unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| file.clone())
    });
    let depth = max_depth.unwrap_or(config.audit.schema_max_depth);

    emit_or_exit(&render_schema(&tree, &name, depth), out.as_deref());
}
