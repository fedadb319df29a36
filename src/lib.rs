pub mod aggregate;
pub mod chart;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fields;
pub mod io_utils;
pub mod labels;
pub mod normalize;
pub mod render;
pub mod source;
pub mod table;

use std::{
    env,
    io::{self, Write},
    path::Path,
    sync::OnceLock,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    chart::ChartRequest,
    cli::{Cli, Commands},
    config::Config,
    dataset::Dataset,
    error::SurveyError,
    fields::{ALL_FIELDS, SURVEY_ITEMS},
    labels::LABEL_DICTIONARY_VERSION,
    normalize::Normalizer,
    source::{CsvFileSource, RawTable, TabularSource},
    table::print_rows,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("survey_insight", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Chart(args) => handle_chart(&args),
        Commands::Students(args) => handle_students(&args),
        Commands::Inspect(args) => handle_inspect(&args),
        Commands::Labels(args) => handle_labels(&args),
    }
}

/// Maps the header row and normalizes every data row of `raw`.
pub fn ingest(raw: &RawTable, config: &Config) -> Result<Dataset, SurveyError> {
    let mapping = config.label_dictionary().map(&raw.headers);
    Normalizer::new(config.range_policy).normalize(mapping, &raw.rows)
}

fn load_dataset(
    input: &Path,
    delimiter: Option<u8>,
    input_encoding: Option<&str>,
    config: &Config,
) -> Result<Dataset> {
    let encoding = io_utils::resolve_encoding(input_encoding)?;
    let raw = CsvFileSource::new(input, delimiter, encoding).fetch()?;
    let dataset = ingest(&raw, config)?;
    Ok(dataset)
}

fn handle_chart(args: &cli::ChartArgs) -> Result<()> {
    let config = Config::load_or_default(args.config.as_deref())?;
    let dataset = load_dataset(
        &args.input,
        args.delimiter,
        args.input_encoding.as_deref(),
        &config,
    )?;
    let request = ChartRequest {
        kind: args.kind,
        student: args.student.clone(),
    };
    let chart = chart::resolve(&dataset, &request)?;
    let artifact = args.format.sink().render(&chart, &config.render)?;
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(&artifact.bytes)
        .context("Writing chart output")?;
    stdout.flush().context("Flushing chart output")?;
    info!("Wrote {} {} byte(s)", artifact.bytes.len(), artifact.media_type);
    Ok(())
}

fn handle_students(args: &cli::StudentsArgs) -> Result<()> {
    let config = Config::load_or_default(args.config.as_deref())?;
    let dataset = load_dataset(
        &args.input,
        args.delimiter,
        args.input_encoding.as_deref(),
        &config,
    )?;
    let names = dataset.all_entity_names();
    for name in &names {
        println!("{name}");
    }
    info!("Listed {} student(s) from {:?}", names.len(), args.input);
    Ok(())
}

fn handle_inspect(args: &cli::InspectArgs) -> Result<()> {
    let config = Config::load_or_default(args.config.as_deref())?;
    let dataset = load_dataset(
        &args.input,
        args.delimiter,
        args.input_encoding.as_deref(),
        &config,
    )?;

    let mapping_rows = dataset
        .mapping()
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            vec![
                (idx + 1).to_string(),
                column.raw.clone(),
                column
                    .key
                    .field()
                    .map(|field| field.key().to_string())
                    .unwrap_or_else(|| "(text)".to_string()),
                format!("{:?}", column.key.kind()).to_lowercase(),
            ]
        })
        .collect::<Vec<_>>();
    print_rows(&["#", "header", "field", "kind"], &mapping_rows);
    println!();

    let availability_rows = dataset
        .availability(&SURVEY_ITEMS)
        .into_iter()
        .map(|entry| {
            vec![
                entry.field.label().to_string(),
                if entry.declared { "yes" } else { "no" }.to_string(),
                entry.available.to_string(),
                entry.missing.to_string(),
                entry.failures.to_string(),
                entry.out_of_range.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    print_rows(
        &["item", "declared", "available", "missing", "failures", "out_of_range"],
        &availability_rows,
    );

    let failure_rows = dataset
        .coercion_failures()
        .map(|(row, failure)| {
            vec![
                row.to_string(),
                failure.field.label().to_string(),
                failure.original.clone(),
                format!("{:?}", failure.reason),
            ]
        })
        .collect::<Vec<_>>();
    if !failure_rows.is_empty() {
        println!();
        print_rows(&["row", "item", "value", "reason"], &failure_rows);
    }

    let missing_text = ALL_FIELDS
        .iter()
        .filter(|field| !field.is_numeric() && !dataset.declares(**field))
        .map(|field| field.key())
        .collect::<Vec<_>>();
    info!(
        "Inspected {} record(s); {} coercion failure(s), {} out-of-range cell(s); text fields not present: {}",
        dataset.len(),
        failure_rows.len(),
        dataset.out_of_range().count(),
        if missing_text.is_empty() {
            "none".to_string()
        } else {
            missing_text.join(", ")
        }
    );
    Ok(())
}

fn handle_labels(args: &cli::LabelsArgs) -> Result<()> {
    let config = Config::load_or_default(args.config.as_deref())?;
    let dictionary = config.label_dictionary();
    print!("{}", dictionary.to_yaml_string()?);
    info!(
        "Label dictionary v{} with {} entr(ies)",
        LABEL_DICTIONARY_VERSION,
        dictionary.len()
    );
    Ok(())
}
