use thiserror::Error;

/// Convenience result type for rule construction and evaluation.
pub type RuleResult<T> = Result<T, RuleError>;

/// Errors raised while building a rule set or applying it to a row.
///
/// Every variant is fatal for the run: nothing is skipped or retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    /// The strategy name is not one of the supported combination strategies.
    #[error("rule '{column}' uses unknown strategy '{name}'")]
    InvalidStrategy { column: String, name: String },

    /// A summary strategy was configured without the group key it needs.
    #[error("rule '{column}' uses strategy {strategy} which requires a group key")]
    Configuration { column: String, strategy: String },

    /// The group key column is absent from a row the rule had to inspect.
    #[error("rule '{column}' expected group key column '{field}' in data row {row}")]
    MissingField {
        column: String,
        field: String,
        row: usize,
    },

    /// Two definitions target the same output column.
    #[error("output column '{column}' is defined more than once")]
    DuplicateColumn { column: String },
}
