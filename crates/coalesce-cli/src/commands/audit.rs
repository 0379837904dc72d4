use crate::support::{
    exit_with, load_config_or_exit, print_sample_block, render_json_or_exit, yes_no,
};
use coalesce_audit::{AuditInputs, AuditRun, ContainmentPolicy, run_audit};
use std::path::PathBuf;

pub struct Args {
    pub source_a: Option<String>,
    pub source_b: Option<String>,
    pub unified: String,
    pub reports_dir: Option<String>,
    pub config: Option<String>,
    pub containment: Option<String>,
    pub json: bool,
}

pub fn run(args: Args) {
    let mut config = load_config_or_exit(args.config.as_deref());
    if let Some(raw) = args.containment.as_deref() {
        config.audit.containment = raw
            .parse::<ContainmentPolicy>()
            .unwrap_or_else(|err| exit_with(err));
    }
    let reports_dir = args
        .reports_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| config.audit.reports_dir.clone());

    let inputs = AuditInputs {
        source_a: args.source_a.map(PathBuf::from),
        source_b: args.source_b.map(PathBuf::from),
        unified: PathBuf::from(args.unified),
    };
    let run = run_audit(&inputs, &config, &reports_dir).unwrap_or_else(|err| exit_with(err));

    if args.json {
        println!("{}", render_json_or_exit(&run.report, "completeness report"));
    } else {
        print_human_summary(&run, config.audit.sample_limit);
    }

    if !run.report.is_zero_loss() {
        std::process::exit(1);
    }
}

fn print_human_summary(run: &AuditRun, sample_limit: usize) {
    let report = &run.report;
    println!("coalesce audit");
    println!("  Verdict: {}", report.verdict);
    println!("  Zero Loss: {}", yes_no(report.is_zero_loss()));
    println!("  Containment: {}", report.containment);
    println!(
        "  Paths: A={}, B={}, unified={}",
        report.path_counts.a, report.path_counts.b, report.path_counts.unified
    );
    println!("  Merges: {}", report.merges.len());
    println!("  Conflicts: {}", report.conflicts.len());
    println!("  Visuals: {}", report.visuals.len());
    print_sample_block("Missing From A", &report.missing_from_a, usize::MAX);
    print_sample_block("Missing From B", &report.missing_from_b, usize::MAX);
    print_sample_block("Conflicting Paths", &report.conflicts, sample_limit);
    println!("  Reports:");
    for path in &run.written {
        println!("    - {}", path.display());
    }
}
