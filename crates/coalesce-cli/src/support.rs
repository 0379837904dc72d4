use coalesce_audit::{AuditError, CoalesceConfig, load_tree};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "COALESCE_LOG";

/// Install the stderr subscriber. `--verbose` wins over `COALESCE_LOG`.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn exit_with(err: impl std::fmt::Display) -> ! {
    eprintln!("error: {err}");
    std::process::exit(2);
}

pub fn load_config_or_exit(path: Option<&str>) -> CoalesceConfig {
    CoalesceConfig::load_or_default(path.map(Path::new)).unwrap_or_else(|err| exit_with(err))
}

/// Optional source tree; an omitted flag or a JSON `null` file is absent.
pub fn load_source_or_exit(path: Option<&str>) -> Option<Value> {
    load_tree(path.map(Path::new)).unwrap_or_else(|err| exit_with(err))
}

pub fn read_text_or_exit(path: &str, label: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("error: failed to read {label} at {path}: {err}");
        std::process::exit(2);
    })
}

pub fn render_json_or_exit<T: Serialize>(value: &T, label: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|err| {
        eprintln!("error: failed to render {label} JSON: {err}");
        std::process::exit(2);
    })
}

/// Write `contents` to `out` when given, print it otherwise.
pub fn emit_or_exit(contents: &str, out: Option<&str>) {
    match out {
        Some(path) => {
            fs::write(path, contents).unwrap_or_else(|err| {
                exit_with(AuditError::WriteReport {
                    path: path.to_string(),
                    source: err,
                })
            });
            tracing::debug!(path, bytes = contents.len(), "wrote output");
        }
        None => println!("{}", contents.trim_end()),
    }
}

pub fn print_sample_block(header: &str, items: &[String], limit: usize) {
    if items.is_empty() {
        return;
    }
    let shown = &items[..items.len().min(limit)];
    println!("  {header} (showing up to {}):", shown.len());
    for item in shown {
        println!("    - {item}");
    }
    if items.len() > shown.len() {
        println!("    - ... and {} more", items.len() - shown.len());
    }
}

pub fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}
