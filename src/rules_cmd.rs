//! The `rules` command: validate a rule file and list what it produces.

use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;

use crate::{
    cli::RulesArgs,
    rules::{RuleBook, RuleSet},
    table,
};

pub fn execute(args: &RulesArgs) -> Result<()> {
    let book = RuleBook::load(&args.rules)?;
    let rule_set = RuleSet::build(&book)
        .with_context(|| format!("Validating rules from {:?}", args.rules))?;

    if rule_set.is_empty() {
        info!("Rule file {:?} does not define any rules", args.rules);
        return Ok(());
    }

    let headers = ["#", "output", "strategy", "inputs", "group key", "carry"]
        .map(String::from)
        .to_vec();
    let rows = rule_set
        .iter()
        .enumerate()
        .map(|(idx, rule)| {
            vec![
                (idx + 1).to_string(),
                rule.output_column().to_string(),
                rule.strategy().to_string(),
                rule.input_columns().iter().join(", "),
                rule.group_key().unwrap_or_default().to_string(),
                if rule.carry_last_seen() { "yes" } else { "" }.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    info!("Listed {} rule(s) from {:?}", rule_set.len(), args.rules);
    Ok(())
}
