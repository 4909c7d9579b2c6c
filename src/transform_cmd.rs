//! The `transform` command: CSV in, rule set applied, CSV (or a table) out.

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    cli::TransformArgs,
    io_utils,
    rules::{RuleBook, RuleSet},
    table,
    transformer::{Outcome, Transformer, VecSink},
};

pub fn execute(args: &TransformArgs) -> Result<()> {
    let book = RuleBook::load(&args.rules)?;
    let rule_set = RuleSet::build(&book)
        .with_context(|| format!("Building rules from {:?}", args.rules))?;
    let mut transformer = Transformer::new(rule_set).with_limit(args.limit);

    if transformer.rules().is_empty() {
        info!("Rule file {:?} defines no rules; nothing to do", args.rules);
        return Ok(());
    }

    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let input_encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let output_path = args.output.as_deref();
    let writing_to_stdout = output_path.is_none_or(io_utils::is_dash);
    let output_delimiter =
        io_utils::resolve_output_delimiter(output_path, args.output_delimiter, delimiter);
    info!(
        "Transforming '{}' -> {} with {} rule(s) from {:?} (delimiter '{}', output '{}')",
        args.input.display(),
        output_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".into()),
        transformer.rules().len(),
        args.rules,
        crate::printable_delimiter(delimiter),
        crate::printable_delimiter(output_delimiter)
    );

    let mut reader = io_utils::open_csv_reader_from_path(&args.input, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, input_encoding)
        .with_context(|| format!("Reading headers from {:?}", args.input))?;
    debug!("Input columns: {:?}", headers);
    let records = io_utils::records(reader, headers, input_encoding);

    if args.table && !writing_to_stdout {
        debug!("--table requested but output will remain CSV because a file path was provided");
    }

    let outcome = if args.table && writing_to_stdout {
        let mut sink = VecSink::default();
        let outcome = transformer.run(records, &mut sink)?;
        let headers = sink.headers.unwrap_or_default();
        table::print_table(&headers, &sink.rows);
        outcome
    } else {
        let mut writer =
            io_utils::open_csv_writer(output_path, output_delimiter, args.quote.into())?;
        transformer
            .run(records, &mut writer)
            .with_context(|| format!("Transforming {:?}", args.input))?
    };

    if let Outcome::Completed { rows } = outcome {
        info!("Wrote {rows} row(s) across {} column(s)", transformer.headers().len());
    }
    Ok(())
}
