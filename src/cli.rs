use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Reshape CSV files with declarative column rules", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply a rule file to a CSV file and write the reshaped rows
    Transform(TransformArgs),
    /// Validate a rule file and list the output columns it defines
    Rules(RulesArgs),
}

#[derive(Debug, Args)]
pub struct TransformArgs {
    /// Input CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input", default_value = "-")]
    pub input: PathBuf,
    /// Rule definition file (.json, .yml or .yaml)
    #[arg(short = 'r', long = "rules")]
    pub rules: PathBuf,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// CSV delimiter character for reading input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter to use for output (defaults to input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Quoting applied to output fields
    #[arg(long = "quote", default_value = "necessary")]
    pub quote: QuoteMode,
    /// Limit number of rows emitted
    #[arg(long)]
    pub limit: Option<usize>,
    /// Render output as an aligned table to stdout
    #[arg(long = "table")]
    pub table: bool,
}

#[derive(Debug, Args)]
pub struct RulesArgs {
    /// Rule definition file (.json, .yml or .yaml)
    #[arg(short = 'r', long = "rules")]
    pub rules: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum QuoteMode {
    #[default]
    Necessary,
    Always,
    NonNumeric,
}

impl From<QuoteMode> for csv::QuoteStyle {
    fn from(mode: QuoteMode) -> Self {
        match mode {
            QuoteMode::Necessary => csv::QuoteStyle::Necessary,
            QuoteMode::Always => csv::QuoteStyle::Always,
            QuoteMode::NonNumeric => csv::QuoteStyle::NonNumeric,
        }
    }
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
