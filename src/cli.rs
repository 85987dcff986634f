use crate::types::DEFAULT_MODEL;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ocr-extract", version, about = "Extract text from images with Mistral OCR")]
pub struct Cli {
    /// Directory holding the history database and an optional .env
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recognize text in an image and save the result to history
    Extract(ExtractArgs),
    /// Browse or edit past extractions
    #[command(subcommand)]
    History(HistoryCommand),
    /// Manage the saved API key
    #[command(subcommand)]
    Key(KeyCommand),
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Image file (JPG, PNG, GIF, WebP)
    pub image: PathBuf,

    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// API key for this run only (overrides MISTRAL_API_KEY and the saved key)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Label stored in history instead of the file name
    #[arg(long)]
    pub label: Option<String>,

    /// Also write the result to an HTML file
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Print markup instead of plain text
    #[arg(long)]
    pub raw: bool,

    /// HTML-escape alt text of embedded images
    #[arg(long)]
    pub escape_alt: bool,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List saved extractions, newest first
    List,
    /// Print a saved extraction
    Show {
        id: i64,
        #[arg(long)]
        raw: bool,
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Delete one saved extraction
    Delete { id: i64 },
    /// Delete all saved extractions
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum KeyCommand {
    /// Save an API key
    Set { key: String },
    /// Show whether a key is configured
    Status,
    /// Remove the saved key
    Clear,
}
