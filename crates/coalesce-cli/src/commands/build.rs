use crate::support::{
    emit_or_exit, exit_with, load_config_or_exit, load_source_or_exit, render_json_or_exit,
};
use coalesce_audit::read_json;
use coalesce_kernel::{BuildRequest, ErrorRecord, Record, Status, UnifiedOutputBuilder};
use serde_json::Value;
use std::path::Path;
use uuid::Uuid;

pub struct Args {
    pub source_a: Option<String>,
    pub source_b: Option<String>,
    pub id: Option<String>,
    pub input: Option<String>,
    pub status: String,
    pub errors: Vec<String>,
    pub out: Option<String>,
    pub config: Option<String>,
}

pub fn run(args: Args) {
    let config = load_config_or_exit(args.config.as_deref());
    let source_a = load_source_or_exit(args.source_a.as_deref());
    let source_b = load_source_or_exit(args.source_b.as_deref());

    let status: Status = args.status.parse().unwrap_or_else(|err| exit_with(err));
    let errors = args
        .errors
        .iter()
        .map(|raw| raw.parse::<ErrorRecord>())
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|err| exit_with(err));
    let input = args.input.as_deref().map(load_input_or_exit).unwrap_or_default();
    let id = args.id.unwrap_or_else(|| Uuid::new_v4().to_string());

    let builder = UnifiedOutputBuilder::new(config.build);
    let doc = builder.build(BuildRequest {
        id,
        input,
        source_a: source_a.as_ref(),
        source_b: source_b.as_ref(),
        status,
        errors,
    });

    emit_or_exit(
        &render_json_or_exit(&doc.to_value(), "unified document"),
        args.out.as_deref(),
    );
}

fn load_input_or_exit(path: &str) -> Record {
    match read_json(Path::new(path)).unwrap_or_else(|err| exit_with(err)) {
        Value::Object(record) => record,
        other => {
            eprintln!("error: input at {path} must be a JSON object, got {other}");
            std::process::exit(2);
        }
    }
}
