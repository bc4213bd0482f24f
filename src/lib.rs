pub mod apply;
pub mod canonical;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod frequency;
pub mod io_utils;
pub mod pipeline;
pub mod rewrite;
pub mod similarity;

use std::{
    env,
    io::{self, Write},
    sync::OnceLock,
};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, info};
use serde::Serialize;

use crate::{
    apply::ApplyTarget,
    canonical::Rename,
    cli::{Cli, Commands, InputArgs, TargetArgs},
    config::CleanConfig,
    pipeline::ColumnOutcome,
    similarity::TokenSetScorer,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_canon", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Suggest(args) => handle_suggest(&args),
        Commands::Script(args) => handle_script(&args),
        Commands::Apply(args) => handle_apply(&args),
    }
}

/// Reads the input once and runs every configured column through the core.
fn analyze(input: &InputArgs, target: &TargetArgs) -> Result<(CleanConfig, Vec<ColumnOutcome>)> {
    let config = CleanConfig::resolve(target, &input.input)?;
    let delimiter = io_utils::resolve_input_delimiter(&input.input, input.delimiter);
    let encoding = io_utils::resolve_encoding(input.input_encoding.as_deref())?;
    info!(
        "Scanning '{}' with delimiter '{}' for {} column(s) at threshold {}",
        input.input.display(),
        printable_delimiter(delimiter),
        config.columns.len(),
        config.threshold
    );
    let scan = frequency::scan_columns(&input.input, delimiter, encoding, &config.columns)
        .with_context(|| format!("Computing frequencies for {:?}", input.input))?;
    let outcomes = pipeline::clean_columns(&config, &scan, &TokenSetScorer);
    Ok((config, outcomes))
}

#[derive(Debug, Serialize)]
struct ColumnSuggestions<'a> {
    column: &'a str,
    corrections: Vec<&'a Rename>,
}

fn handle_suggest(args: &cli::SuggestArgs) -> Result<()> {
    let (_, outcomes) = analyze(&args.input, &args.target)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.json {
        let suggestions = outcomes
            .iter()
            .filter_map(|outcome| {
                outcome.renames().map(|renames| ColumnSuggestions {
                    column: outcome.column(),
                    corrections: renames.iter().collect(),
                })
            })
            .collect::<Vec<_>>();
        serde_json::to_writer_pretty(&mut out, &suggestions).context("Writing JSON suggestions")?;
        writeln!(out)?;
        return Ok(());
    }

    for outcome in &outcomes {
        match outcome {
            ColumnOutcome::Rewritten { column, renames, .. } => {
                writeln!(out, "{column}: {} correction(s)", renames.len())?;
                for rename in renames {
                    writeln!(out, "  '{}' -> '{}'", rename.from, rename.to)?;
                }
            }
            ColumnOutcome::Unchanged { column, .. } => {
                writeln!(out, "{column}: no similar values")?;
            }
            ColumnOutcome::Failed { column, error } => {
                writeln!(out, "{column}: skipped ({error:#})")?;
            }
        }
    }
    Ok(())
}

fn handle_script(args: &cli::ScriptArgs) -> Result<()> {
    let (config, outcomes) = analyze(&args.input, &args.target)?;
    let Some(script) = pipeline::script(&outcomes) else {
        info!(
            "No corrections needed in any column of '{}'; no script written",
            config.table
        );
        return Ok(());
    };
    let output = args.output.as_deref();
    let mut writer = io_utils::open_output(output)?;
    writer
        .write_all(script.as_bytes())
        .context("Writing update script")?;
    writer.flush().context("Flushing update script")?;
    let statements = outcomes.iter().filter(|o| o.statement().is_some()).count();
    info!(
        "Update script with {} statement(s) for table '{}' written to {}",
        statements,
        config.table,
        io_utils::describe_output(output)
    );
    Ok(())
}

fn handle_apply(args: &cli::ApplyArgs) -> Result<()> {
    if io_utils::is_dash(&args.input.input) {
        return Err(anyhow!(
            "apply reads the input twice and cannot take stdin; pass a file path"
        ));
    }
    if let Some(output) = args.output.as_deref()
        && io_utils::is_same_file(&args.input.input, output)
    {
        return Err(anyhow!(
            "apply cannot overwrite its input {:?} while reading it; pick another output path",
            args.input.input
        ));
    }
    let (_, outcomes) = analyze(&args.input, &args.target)?;
    let delimiter = io_utils::resolve_input_delimiter(&args.input.input, args.input.delimiter);
    let encoding = io_utils::resolve_encoding(args.input.input_encoding.as_deref())?;
    let target = ApplyTarget {
        output: args.output.as_deref(),
        delimiter: io_utils::resolve_output_delimiter(
            args.output.as_deref(),
            args.output_delimiter,
            delimiter,
        ),
    };
    apply::apply_corrections(&args.input.input, delimiter, encoding, &outcomes, target)
        .with_context(|| format!("Applying corrections to {:?}", args.input.input))?;
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
