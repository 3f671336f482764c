//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "chargen",
    version,
    about = "Create narrative character profiles from a Google Docs template with Gemini"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a single character from flags
    Create(CreateArgs),
    /// Generate a character for every record in a JSON/JSONL/CSV file
    Batch(BatchArgs),
    /// Convert a character CSV to JSON/JSONL without generating anything
    Convert(ConvertArgs),
    /// Inspect the generation history archive
    History(HistoryArgs),
}

/// D&D overrides. Enhancement runs when species, class, and level are all
/// supplied; in batch mode the same values apply to every record.
#[derive(Debug, Clone, Args)]
pub struct DndArgs {
    /// D&D species (e.g. Human, Tiefling)
    #[arg(long)]
    pub species: Option<String>,

    /// D&D class (e.g. Fighter, Wizard)
    #[arg(long = "class")]
    pub class_name: Option<String>,

    /// D&D subclass belonging to the chosen class
    #[arg(long)]
    pub subclass: Option<String>,

    /// Character level (1-20; out-of-range values are warned and used as-is)
    #[arg(long)]
    pub level: Option<u32>,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Character name
    #[arg(long)]
    pub name: String,

    /// Character sex
    #[arg(long, value_parser = ["male", "female"])]
    pub sex: String,

    /// Gender identity
    #[arg(long, value_parser = ["he/him", "she/her", "they/them"])]
    pub gender: String,

    /// Age range
    #[arg(long, value_parser = ["child", "teen", "adult", "middle-age", "elderly"])]
    pub age_range: String,

    /// Character occupation
    #[arg(long)]
    pub occupation: String,

    /// Character ethnicity
    #[arg(long)]
    pub ethnicity: String,

    /// Google Docs template file ID
    #[arg(long)]
    pub template_doc_id: String,

    /// Title for the created document (default: "Character - <name> - <date>")
    #[arg(long)]
    pub new_doc_title: Option<String>,

    /// Ask the model for structured JSON output and keep a per-character
    /// JSON file
    #[arg(long)]
    pub json_output: bool,

    #[command(flatten)]
    pub dnd: DndArgs,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["json", "jsonl", "csv"])))]
pub struct BatchArgs {
    /// JSON file: one character object or an array of them
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// JSONL file: one character object per line
    #[arg(long)]
    pub jsonl: Option<PathBuf>,

    /// CSV file with a header of template field names
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Google Docs template file ID
    #[arg(long)]
    pub template_doc_id: String,

    #[command(flatten)]
    pub dnd: DndArgs,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("mode").required(true).args(["json", "jsonl", "validate", "preview"])))]
pub struct ConvertArgs {
    /// CSV file to convert
    pub csv_file: PathBuf,

    /// Write the converted characters to a JSON file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write the converted characters to a JSONL file
    #[arg(long)]
    pub jsonl: Option<PathBuf>,

    /// Report which columns match template fields, without converting
    #[arg(long)]
    pub validate: bool,

    /// Print the first converted characters without saving
    #[arg(long)]
    pub preview: bool,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommand,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List archived characters
    List {
        /// Show at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print one archived character record by name
    Show {
        #[arg(long)]
        name: String,
    },
    /// Export the JSONL archive as a pretty-printed JSON array
    Export {
        #[arg(long)]
        output: PathBuf,
    },
}
