//! Coalesce CLI: the `coalesce` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_tracing(cli.verbose);

    match cli.command {
        Commands::Audit {
            source_a,
            source_b,
            unified,
            reports_dir,
            config,
            containment,
            json,
        } => commands::audit::run(commands::audit::Args {
            source_a,
            source_b,
            unified,
            reports_dir,
            config,
            containment,
            json,
        }),

        Commands::Schema {
            file,
            name,
            max_depth,
            out,
            config,
        } => commands::schema::run(file, name, max_depth, out, config),

        Commands::Build {
            source_a,
            source_b,
            id,
            input,
            status,
            errors,
            out,
            config,
        } => commands::build::run(commands::build::Args {
            source_a,
            source_b,
            id,
            input,
            status,
            errors,
            out,
            config,
        }),

        Commands::Extract { file, json } => commands::extract::run(file, json),
    }
}
