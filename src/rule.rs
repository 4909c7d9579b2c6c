//! Per-column combination rules.
//!
//! A [`Rule`] derives one output column from an ordered list of input columns.
//! The two summary strategies keep a running chain per group and assume rows
//! of the same group arrive contiguously: the group key of each row is only
//! compared with the key of the previous row, so an input that is not already
//! grouped produces one chain per contiguous run rather than one per key.

use std::fmt::{self, Write as _};

use crate::{
    error::{RuleError, RuleResult},
    record::Record,
};

const CHAIN_SEPARATOR: &str = " -> ";
const COLON_SEPARATOR: &str = " : ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Last present input column wins.
    Overwrite,
    /// ` <col> = <value> ;` for every present input column.
    SemicolonJoin,
    /// Values chained with ` -> ` while the group key stays the same.
    Summary,
    /// Row values joined with ` : `, then chained like [`Strategy::Summary`].
    SummaryConcatColon,
    /// Row values joined with ` : `.
    ConcatColon,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Overwrite,
        Strategy::SemicolonJoin,
        Strategy::Summary,
        Strategy::SummaryConcatColon,
        Strategy::ConcatColon,
    ];

    /// Looks up a strategy by name, ignoring case. `SEMICOL` is accepted as
    /// an alias of `SEMICOLON_JOIN`.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "SEMICOL" => Some(Strategy::SemicolonJoin),
            other => Self::ALL
                .into_iter()
                .find(|strategy| strategy.as_str() == other),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Overwrite => "OVERWRITE",
            Strategy::SemicolonJoin => "SEMICOLON_JOIN",
            Strategy::Summary => "SUMMARY",
            Strategy::SummaryConcatColon => "SUMMARY_CONCAT_COLON",
            Strategy::ConcatColon => "CONCAT_COLON",
        }
    }

    pub fn requires_group_key(self) -> bool {
        matches!(self, Strategy::Summary | Strategy::SummaryConcatColon)
    }

    /// Whether the strategy itself carries state from one row to the next.
    pub fn is_stateful(self) -> bool {
        self.requires_group_key()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RuleState {
    last_nonempty_value: String,
    accumulated_text: String,
    current_group: Option<String>,
}

impl RuleState {
    /// Starts a new chain when `group` differs from the previous row's group,
    /// otherwise extends the current one.
    fn fold(&mut self, group: &str, value: &str) {
        if self.current_group.as_deref() == Some(group) {
            self.accumulated_text.push_str(CHAIN_SEPARATOR);
            self.accumulated_text.push_str(value);
        } else {
            self.current_group = Some(group.to_string());
            self.accumulated_text.clear();
            self.accumulated_text.push_str(value);
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    output_column: String,
    input_columns: Vec<String>,
    strategy: Strategy,
    group_key: Option<String>,
    carry_last_seen: bool,
    state: RuleState,
}

impl Rule {
    pub fn new(
        output_column: impl Into<String>,
        input_columns: Vec<String>,
        strategy: Strategy,
        group_key: Option<String>,
        carry_last_seen: bool,
    ) -> RuleResult<Self> {
        let output_column = output_column.into();
        if strategy.requires_group_key() && group_key.is_none() {
            return Err(RuleError::Configuration {
                column: output_column,
                strategy: strategy.to_string(),
            });
        }
        Ok(Self {
            output_column,
            input_columns,
            strategy,
            group_key,
            carry_last_seen,
            state: RuleState::default(),
        })
    }

    pub fn output_column(&self) -> &str {
        &self.output_column
    }

    pub fn input_columns(&self) -> &[String] {
        &self.input_columns
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn group_key(&self) -> Option<&str> {
        self.group_key.as_deref()
    }

    pub fn carry_last_seen(&self) -> bool {
        self.carry_last_seen
    }

    /// Drops everything remembered from earlier rows.
    pub fn reset(&mut self) {
        self.state = RuleState::default();
    }

    /// Computes this rule's value for `record`, advancing the cross-row state.
    ///
    /// `row` is the 1-based data row number and only feeds error messages.
    /// Input columns absent from the record are skipped. The group key is
    /// looked up by [`Strategy::Summary`] only when some input column is
    /// present, and by [`Strategy::SummaryConcatColon`] on every row.
    pub fn evaluate(&mut self, record: &Record, row: usize) -> RuleResult<String> {
        let mut result = String::new();
        let mut row_joined = String::new();

        for column in &self.input_columns {
            let Some(value) = record.get(column) else {
                continue;
            };
            if self.carry_last_seen && !value.is_empty() {
                self.state.last_nonempty_value.clear();
                self.state.last_nonempty_value.push_str(value);
            }
            match self.strategy {
                Strategy::Overwrite => {
                    result.clear();
                    result.push_str(value);
                }
                Strategy::SemicolonJoin => {
                    let _ = write!(result, " {column} = {value} ;");
                }
                Strategy::Summary => {
                    let group = group_value(
                        record,
                        &self.output_column,
                        self.group_key.as_deref(),
                        row,
                    )?;
                    self.state.fold(group, value);
                    result.clone_from(&self.state.accumulated_text);
                }
                Strategy::SummaryConcatColon => push_colon_joined(&mut row_joined, value),
                Strategy::ConcatColon => push_colon_joined(&mut result, value),
            }
        }

        if self.strategy == Strategy::SummaryConcatColon {
            let group = group_value(
                record,
                &self.output_column,
                self.group_key.as_deref(),
                row,
            )?;
            self.state.fold(group, &row_joined);
            result.clone_from(&self.state.accumulated_text);
        }

        if self.carry_last_seen && result.is_empty() {
            result.clone_from(&self.state.last_nonempty_value);
        }
        Ok(result)
    }
}

/// Appends `value` with a colon separator, unless nothing has been collected
/// yet, in which case `value` becomes the whole text.
fn push_colon_joined(target: &mut String, value: &str) {
    if !target.is_empty() {
        target.push_str(COLON_SEPARATOR);
    }
    target.push_str(value);
}

fn group_value<'r>(
    record: &'r Record,
    output_column: &str,
    group_key: Option<&str>,
    row: usize,
) -> RuleResult<&'r str> {
    let Some(key) = group_key else {
        return Err(RuleError::Configuration {
            column: output_column.to_string(),
            strategy: "summary".to_string(),
        });
    };
    record.get(key).ok_or_else(|| RuleError::MissingField {
        column: output_column.to_string(),
        field: key.to_string(),
        row,
    })
}
