use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{TermOrder, Threshold};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Find near-duplicate categorical values in CSV exports and canonicalize them",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List suggested corrections for each column
    Suggest(SuggestArgs),
    /// Generate a SQL script that rewrites similar values to their canonical form
    Script(ScriptArgs),
    /// Write a corrected copy of the CSV file
    Apply(ApplyArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file (use '-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// YAML file providing table, columns, threshold and order
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Table name used in generated statements (defaults to the input file stem)
    #[arg(short = 't', long = "table")]
    pub table: Option<String>,
    /// Columns to clean, comma-separated or repeated
    #[arg(short = 'C', long = "columns", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub columns: Vec<String>,
    /// Minimum similarity score (0-100) for two values to be grouped [default: 70]
    #[arg(long, value_parser = parse_threshold)]
    pub threshold: Option<Threshold>,
    /// Order in which values seed clusters [default: frequency]
    #[arg(long, value_enum)]
    pub order: Option<TermOrder>,
}

#[derive(Debug, Args)]
pub struct SuggestArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub target: TargetArgs,
    /// Print corrections as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ScriptArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub target: TargetArgs,
    /// Destination .sql file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub target: TargetArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter to use for output (defaults to input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

pub fn parse_threshold(value: &str) -> Result<Threshold, String> {
    let parsed = value
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("Threshold '{value}' is not an integer"))?;
    Threshold::new(parsed).map_err(|err| err.to_string())
}
