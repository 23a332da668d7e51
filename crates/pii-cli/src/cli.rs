use clap::{Parser, Subcommand, ValueEnum};
use pii_core::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pii-sanitizer")]
#[command(about = "Redact PII from application logs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true, env = "PII_SANITIZER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit diagnostics as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP sanitizer service
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        /// File sanitized lines are appended to
        #[arg(long)]
        output: Option<PathBuf>,

        /// Rule file (JSON or TOML)
        #[arg(long)]
        rules: Option<PathBuf>,

        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Redact and respond without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Redact lines from a file (or stdin) to stdout
    Redact {
        /// Input file; stdin when omitted
        file: Option<PathBuf>,

        #[arg(long)]
        rules: Option<PathBuf>,

        /// Print redaction counts to stderr when done
        #[arg(long)]
        stats: bool,
    },

    /// Scan a CSV of JSON records (columns: record_id, data_json)
    Scan {
        input: PathBuf,

        #[arg(long, short, default_value = "redacted_output.csv")]
        output: PathBuf,

        #[arg(long)]
        rules: Option<PathBuf>,
    },

    /// Write the default config and rule file
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Show the active rule set
    Rules {
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Print the rule set as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Plain,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Plain => OutputFormat::Plain,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}
