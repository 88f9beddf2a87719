use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tms_store::DEFAULT_LIST_LIMIT;

#[derive(Parser)]
#[command(name = "tms", version, about = "Translate, review and store translations by project")]
pub struct Cli {
    /// JSON config profile; environment variables override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the languages a provider accepts
    Languages {
        /// DeepL or "Google Translate"; defaults to the configured provider
        #[arg(long)]
        provider: Option<String>,
        /// Show target languages instead of source languages
        #[arg(long)]
        target: bool,
    },

    /// Translate text, optionally editing and saving the result
    Translate {
        #[arg(long)]
        project: String,
        #[arg(long)]
        provider: Option<String>,
        /// Target language code; defaults to simplified Chinese when offered
        #[arg(long)]
        to: Option<String>,
        /// Source language code or "auto"; defaults to English when offered
        #[arg(long)]
        from: Option<String>,
        /// Replace the provider's output with this reviewed text
        #[arg(long)]
        edit: Option<String>,
        /// Note to store; defaults to the alternative translations
        #[arg(long)]
        note: Option<String>,
        /// Persist the result
        #[arg(long)]
        save: bool,
        text: String,
    },

    /// Rewrite the translation and note of a saved record
    Update {
        id: i64,
        #[arg(long)]
        text: String,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        user: Option<String>,
    },

    /// Show saved translations, newest first
    List {
        #[arg(long)]
        project: Option<String>,
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },

    /// Show all project names
    Projects,

    /// Find saved translations containing a phrase
    Search {
        query: String,
        #[arg(long)]
        project: Option<String>,
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },

    /// Completed and pending counts for a project
    Stats {
        #[arg(long)]
        project: String,
        #[arg(long)]
        json: bool,
    },

    /// Write saved translations to a file (stdout when no file is given)
    Export {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}
