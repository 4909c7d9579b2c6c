//! Drives a record stream through a [`RuleSet`].
//!
//! Rows are handled one at a time: every rule is evaluated against the row in
//! declaration order and the resulting output row is handed to the sink before
//! the next input row is pulled. The first failure, from the input stream or
//! from a rule, ends the run.

use std::io::Write;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{record::Record, rules::RuleSet};

/// Consumer of the output stream: one header followed by rows of the same
/// width.
pub trait RecordSink {
    fn write_header(&mut self, headers: &[String]) -> Result<()>;
    fn write_record(&mut self, values: &[String]) -> Result<()>;
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<W: Write> RecordSink for csv::Writer<W> {
    fn write_header(&mut self, headers: &[String]) -> Result<()> {
        csv::Writer::write_record(self, headers).context("Writing output headers")
    }

    fn write_record(&mut self, values: &[String]) -> Result<()> {
        csv::Writer::write_record(self, values).context("Writing output row")
    }

    fn finish(&mut self) -> Result<()> {
        self.flush().context("Flushing output")
    }
}

/// Collects the output in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VecSink {
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl RecordSink for VecSink {
    fn write_header(&mut self, headers: &[String]) -> Result<()> {
        self.headers = Some(headers.to_vec());
        Ok(())
    }

    fn write_record(&mut self, values: &[String]) -> Result<()> {
        self.rows.push(values.to_vec());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The rule set was empty; nothing was read or written.
    NoRules,
    Completed { rows: usize },
}

#[derive(Debug)]
pub struct Transformer {
    rules: RuleSet,
    limit: Option<usize>,
}

impl Transformer {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules, limit: None }
    }

    /// Stops after `limit` output rows.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn headers(&self) -> Vec<String> {
        self.rules.headers()
    }

    /// Transforms `records` into `sink`.
    ///
    /// Rule state is cleared first, so each call behaves like a run with
    /// freshly built rules. Stateful strategies expect rows of one group to be
    /// contiguous in `records`.
    pub fn run<I, S>(&mut self, records: I, sink: &mut S) -> Result<Outcome>
    where
        I: IntoIterator<Item = Result<Record>>,
        S: RecordSink + ?Sized,
    {
        if self.rules.is_empty() {
            info!("No rules found; nothing to transform");
            return Ok(Outcome::NoRules);
        }
        self.rules.reset();

        let headers = self.rules.headers();
        debug!("Output columns: {:?}", headers);
        sink.write_header(&headers)?;

        let mut rows = 0usize;
        let mut output = Vec::with_capacity(headers.len());
        for (idx, record) in records.into_iter().enumerate() {
            if self.limit.is_some_and(|limit| rows >= limit) {
                break;
            }
            let row_number = idx + 1;
            let record = record.with_context(|| format!("Reading data row {row_number}"))?;
            output.clear();
            for rule in self.rules.iter_mut() {
                let value = rule
                    .evaluate(&record, row_number)
                    .with_context(|| format!("Applying rules to data row {row_number}"))?;
                output.push(value);
            }
            sink.write_record(&output)?;
            rows += 1;
        }
        sink.finish()?;
        debug!("Transformed {rows} row(s)");
        Ok(Outcome::Completed { rows })
    }
}
