use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "coalesce",
    about = "Coalesce: zero-loss merge of two analysis trees, with completeness audits",
    version
)]
pub struct Cli {
    /// Log debug events to stderr (overrides COALESCE_LOG)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify that a unified document keeps every path of both sources
    Audit {
        /// Source A JSON path (omit when the source is absent)
        #[arg(long)]
        source_a: Option<String>,

        /// Source B JSON path (omit when the source is absent)
        #[arg(long)]
        source_b: Option<String>,

        /// Unified document JSON path
        #[arg(long)]
        unified: String,

        /// Directory for the Markdown reports (defaults to the config value)
        #[arg(long)]
        reports_dir: Option<String>,

        /// coalesce.toml path
        #[arg(long)]
        config: Option<String>,

        /// Containment policy: legacy or structural
        #[arg(long)]
        containment: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the path schema of one JSON tree as Markdown
    Schema {
        /// JSON file to describe
        file: String,

        /// Display name used in the report heading
        #[arg(long)]
        name: Option<String>,

        /// Maximum path depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Write the report here instead of stdout
        #[arg(long)]
        out: Option<String>,

        /// coalesce.toml path
        #[arg(long)]
        config: Option<String>,
    },

    /// Build a unified document from two source trees
    Build {
        /// Source A JSON path
        #[arg(long)]
        source_a: Option<String>,

        /// Source B JSON path
        #[arg(long)]
        source_b: Option<String>,

        /// Analysis id (defaults to a fresh UUID)
        #[arg(long)]
        id: Option<String>,

        /// JSON record describing the analysis input
        #[arg(long)]
        input: Option<String>,

        /// Caller status: ok, partial, or error
        #[arg(long, default_value = "ok")]
        status: String,

        /// Pipeline failure as `source=message` (repeatable)
        #[arg(long = "error")]
        errors: Vec<String>,

        /// Write the document here instead of stdout
        #[arg(long)]
        out: Option<String>,

        /// coalesce.toml path
        #[arg(long)]
        config: Option<String>,
    },

    /// Pull the first JSON document out of a free-text reply
    Extract {
        /// Text file to scan
        file: String,

        /// Output as JSON with the matching strategy
        #[arg(long)]
        json: bool,
    },
}
