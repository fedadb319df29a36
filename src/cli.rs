use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{chart::ChartKind, render::OutputFormat};

#[derive(Debug, Parser)]
#[command(author, version, about = "Analyze classroom survey responses", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve the numbers behind a chart for the given responses
    Chart(ChartArgs),
    /// List the distinct student names found in the responses
    Students(StudentsArgs),
    /// Show how headers were mapped and which cells could not be used
    Inspect(InspectArgs),
    /// Print the effective header label dictionary as YAML
    Labels(LabelsArgs),
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    /// Exported responses (CSV/TSV, `-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Chart to resolve
    #[arg(short = 'k', long = "kind", value_enum)]
    pub kind: ChartKind,
    /// Student name for profile and delta charts
    #[arg(short = 's', long = "student")]
    pub student: Option<String>,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
    /// YAML configuration (label extensions, range policy, render settings)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct StudentsArgs {
    /// Exported responses (CSV/TSV, `-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// YAML configuration (label extensions, range policy, render settings)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Exported responses (CSV/TSV, `-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// YAML configuration (label extensions, range policy, render settings)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct LabelsArgs {
    /// YAML configuration whose labels extend the defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,
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
