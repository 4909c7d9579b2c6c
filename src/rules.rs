//! Rule definitions and the rule set built from them.
//!
//! A rule file is a mapping from output column name to a definition:
//!
//! ```json
//! {
//!   "Entity": { "input_columns": ["Entity"], "strategy": "OVERWRITE", "carry_last_seen": true },
//!   "Summary": { "input_columns": ["Test Step"], "strategy": "SUMMARY", "group_key": "Test Case ID" }
//! }
//! ```
//!
//! The older field names `Input_col`, `output_type`, `key` and
//! `output_last_seen` are accepted as aliases. Document order decides the
//! output column order, for JSON and YAML alike.

use std::{fmt, fs, path::Path};

use anyhow::{Context, Result};
use serde::{
    Deserialize, Deserializer,
    de::{self, MapAccess, Visitor},
};

use crate::{
    error::{RuleError, RuleResult},
    rule::{Rule, Strategy},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDefinition {
    pub output_column: String,
    pub input_columns: Vec<String>,
    pub strategy: String,
    pub group_key: Option<String>,
    pub carry_last_seen: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleBody {
    #[serde(alias = "Input_col")]
    input_columns: Vec<String>,
    #[serde(alias = "output_type")]
    strategy: String,
    #[serde(default, alias = "key")]
    group_key: Option<String>,
    #[serde(default, alias = "output_last_seen")]
    carry_last_seen: bool,
}

impl RuleDefinition {
    pub fn new(
        output_column: impl Into<String>,
        input_columns: &[&str],
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            output_column: output_column.into(),
            input_columns: input_columns.iter().map(|c| c.to_string()).collect(),
            strategy: strategy.into(),
            group_key: None,
            carry_last_seen: false,
        }
    }

    pub fn with_group_key(mut self, group_key: impl Into<String>) -> Self {
        self.group_key = Some(group_key.into());
        self
    }

    pub fn with_carry_last_seen(mut self, carry: bool) -> Self {
        self.carry_last_seen = carry;
        self
    }

    fn from_body(output_column: String, body: RuleBody) -> Self {
        Self {
            output_column,
            input_columns: body.input_columns,
            strategy: body.strategy,
            group_key: body.group_key,
            carry_last_seen: body.carry_last_seen,
        }
    }

    /// Validates the strategy name and configuration and builds a fresh rule.
    pub fn to_rule(&self) -> RuleResult<Rule> {
        let strategy =
            Strategy::from_name(&self.strategy).ok_or_else(|| RuleError::InvalidStrategy {
                column: self.output_column.clone(),
                name: self.strategy.clone(),
            })?;
        Rule::new(
            self.output_column.clone(),
            self.input_columns.clone(),
            strategy,
            self.group_key.clone(),
            self.carry_last_seen,
        )
    }
}

/// Ordered collection of rule definitions as read from a rule file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleBook {
    pub definitions: Vec<RuleDefinition>,
}

impl RuleBook {
    pub fn new(definitions: Vec<RuleDefinition>) -> Self {
        Self { definitions }
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).context("Parsing rule definitions as JSON")
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        serde_yaml::from_str(input).context("Parsing rule definitions as YAML")
    }

    /// Reads a rule file, choosing YAML for `.yml`/`.yaml` and JSON otherwise.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Opening rule file {path:?}"))?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"));
        let book = if is_yaml {
            Self::from_yaml_str(&raw)
        } else {
            Self::from_json_str(&raw)
        };
        book.with_context(|| format!("Loading rules from {path:?}"))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl<'de> Deserialize<'de> for RuleBook {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RuleBookVisitor;

        impl<'de> Visitor<'de> for RuleBookVisitor {
            type Value = RuleBook;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a mapping of output column names to rule definitions")
            }

            fn visit_map<A>(self, mut map: A) -> Result<RuleBook, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut definitions: Vec<RuleDefinition> =
                    Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((output_column, body)) = map.next_entry::<String, RuleBody>()? {
                    if definitions
                        .iter()
                        .any(|existing| existing.output_column == output_column)
                    {
                        return Err(de::Error::custom(RuleError::DuplicateColumn {
                            column: output_column,
                        }));
                    }
                    definitions.push(RuleDefinition::from_body(output_column, body));
                }
                Ok(RuleBook { definitions })
            }
        }

        deserializer.deserialize_map(RuleBookVisitor)
    }
}

/// The rules of one transformation run, in output column order.
///
/// The structure is fixed once built; only the state inside each rule changes
/// as rows are evaluated.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn build(book: &RuleBook) -> RuleResult<Self> {
        let rules = book
            .definitions
            .iter()
            .map(RuleDefinition::to_rule)
            .collect::<RuleResult<Vec<_>>>()?;
        Self::from_rules(rules)
    }

    pub fn from_rules(rules: Vec<Rule>) -> RuleResult<Self> {
        for (idx, rule) in rules.iter().enumerate() {
            if rules[..idx]
                .iter()
                .any(|earlier| earlier.output_column() == rule.output_column())
            {
                return Err(RuleError::DuplicateColumn {
                    column: rule.output_column().to_string(),
                });
            }
        }
        Ok(Self { rules })
    }

    pub fn headers(&self) -> Vec<String> {
        self.rules
            .iter()
            .map(|rule| rule.output_column().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Rule> {
        self.rules.iter_mut()
    }

    pub fn reset(&mut self) {
        self.rules.iter_mut().for_each(Rule::reset);
    }
}
