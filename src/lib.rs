//! Rule-driven reshaping of CSV records.
//!
//! A rule file maps every output column to a [`rule::Strategy`] over one or
//! more input columns. The [`transformer::Transformer`] applies the whole
//! [`rules::RuleSet`] to each input row in turn and emits exactly one output
//! row per input row.

pub mod cli;
pub mod error;
pub mod io_utils;
pub mod record;
pub mod rule;
pub mod rules;
pub mod rules_cmd;
pub mod table;
pub mod transform_cmd;
pub mod transformer;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use crate::{
    error::{RuleError, RuleResult},
    record::Record,
    rule::{Rule, Strategy},
    rules::{RuleBook, RuleDefinition, RuleSet},
    transformer::{Outcome, RecordSink, Transformer, VecSink},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_rulemap", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Transform(args) => transform_cmd::execute(&args),
        Commands::Rules(args) => rules_cmd::execute(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
