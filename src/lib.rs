pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod ocr;
pub mod services;
pub mod store;
pub mod types;

use crate::cache::HistoryCache;
use crate::cli::{Cli, Command, ExtractArgs, HistoryCommand, KeyCommand};
use crate::commands::ExtractRequest;
use crate::db::SqliteStore;
use crate::error::{OcrError, Result};
use crate::ocr::OcrClient;
use crate::services::image_input;
use crate::services::normalizer::NormalizeOptions;
use crate::services::plain_text;
use crate::types::{ExtractionOutcome, FAILED_RESULT, NO_TEXT_RESULT};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let data_dir = config::resolve_data_dir(cli.data_dir.as_deref());
    config::load_env(&data_dir);

    let result = SqliteStore::open(&config::db_path(&data_dir)).and_then(|store| dispatch(cli.command, &store));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

/// Bad input from the user exits with 2, everything else with 1.
fn exit_code(e: &OcrError) -> ExitCode {
    if e.is_input_error() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn dispatch(command: Command, store: &SqliteStore) -> Result<()> {
    match command {
        Command::Extract(args) => run_extract(args, store),
        Command::History(cmd) => run_history(cmd, store),
        Command::Key(cmd) => run_key(cmd, store),
    }
}

fn run_extract(args: ExtractArgs, store: &SqliteStore) -> Result<()> {
    let api_key = config::require_api_key(args.api_key.as_deref(), store)?;
    let mut image = image_input::load_image(&args.image)?;
    if let Some(label) = args.label.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        image.label = label.to_string();
    }

    let client = OcrClient::new(&config::endpoint(), &api_key)?;
    let mut history = HistoryCache::load(store);
    let request = ExtractRequest {
        image: &image,
        model: &args.model,
        options: NormalizeOptions {
            escape_alt: args.escape_alt,
        },
    };

    match commands::extract(&mut history, &client, &request) {
        Ok(ExtractionOutcome::Extracted { html, history_id }) => {
            print_result(&html, args.raw);
            if let Some(path) = args.html.as_deref() {
                commands::export_html(path, &image.label, &html)?;
            }
            eprintln!("Text extracted (saved to history as {}).", history_id);
            Ok(())
        }
        Ok(ExtractionOutcome::NoText) => {
            println!("{}", NO_TEXT_RESULT);
            Ok(())
        }
        Err(e) => {
            if e.is_transport_error() {
                println!("{}", FAILED_RESULT);
            }
            Err(e)
        }
    }
}

fn run_history(cmd: HistoryCommand, store: &SqliteStore) -> Result<()> {
    let mut history = HistoryCache::load(store);
    match cmd {
        HistoryCommand::List => {
            let entries = commands::get_history(&history);
            if entries.is_empty() {
                println!("No history yet.");
            }
            for entry in entries {
                println!(
                    "{}  {}  {}  {}  {}",
                    entry.id,
                    local_time(&entry.timestamp),
                    entry.model,
                    entry.image_label,
                    preview(&entry.normalized_result, 40)
                );
            }
        }
        HistoryCommand::Show { id, raw, html } => {
            let entry = commands::get_history_by_id(&history, id)?;
            print_result(&entry.normalized_result, raw);
            if let Some(path) = html.as_deref() {
                commands::export_html(path, &entry.image_label, &entry.normalized_result)?;
            }
        }
        HistoryCommand::Delete { id } => {
            if commands::delete_history_record(&mut history, id)? {
                eprintln!("Deleted history entry {}.", id);
            } else {
                eprintln!("No history entry {}.", id);
            }
        }
        HistoryCommand::Clear => {
            let count = commands::clear_history(&mut history)?;
            eprintln!("Cleared {} history entr(ies).", count);
        }
    }
    Ok(())
}

fn run_key(cmd: KeyCommand, store: &SqliteStore) -> Result<()> {
    match cmd {
        KeyCommand::Set { key } => {
            config::save_api_key(store, &key)?;
            eprintln!("API key saved.");
        }
        KeyCommand::Status => println!("{}", commands::get_api_key_status(None, store)?),
        KeyCommand::Clear => {
            config::clear_api_key(store)?;
            eprintln!("API key removed.");
        }
    }
    Ok(())
}

fn print_result(html: &str, raw: bool) {
    if raw {
        println!("{}", html);
        return;
    }
    match plain_text::copy_text(html) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", html),
    }
}

fn local_time(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

fn preview(html: &str, max_chars: usize) -> String {
    let text = plain_text::to_plain_text(html).split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= max_chars {
        return text;
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_flattens_and_truncates() {
        assert_eq!(preview("a<br>b", 10), "a b");
        assert_eq!(preview("abcdefghijkl", 5), "abcde...");
    }

    #[test]
    fn input_errors_exit_with_usage_code() {
        assert_eq!(exit_code(&OcrError::MissingApiKey), ExitCode::from(2));
        assert_eq!(exit_code(&OcrError::FileTooLarge { max_mb: 50 }), ExitCode::from(2));
        assert_eq!(exit_code(&OcrError::EntryNotFound(3)), ExitCode::FAILURE);
        assert_eq!(exit_code(&OcrError::HistoryIdExhausted), ExitCode::FAILURE);
    }

    #[test]
    fn local_time_keeps_unparsable_input() {
        assert_eq!(local_time("yesterday"), "yesterday");
        assert_eq!(local_time("2024-05-01T12:00:00.000Z").len(), 19);
    }
}
