//! SQL `WHERE`-clause front end.
//!
//! `BETWEEN`, `LIKE`, `IN` and `IS NULL` desugar into core operators and are
//! re-sugared on serialization. `=` compares without coercion, so
//! `code = '123'` does not match the integer `123`.

mod ast;
mod compile;
mod grammar;
mod serial;

pub use ast::SqlNode;

use tracing::instrument;

use crate::serial::SerializeError;
use crate::{Config, FieldResolver, Frontend, Rule, RuleError};

/// Parses and renders SQL `WHERE` clauses such as
/// `age BETWEEN 18 AND 65 AND name LIKE 'J%'`.
#[derive(Debug, Clone, Default)]
pub struct SqlWhere {
    config: Config,
}

impl SqlWhere {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Parse a clause into its syntax tree without compiling it.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Parse`] on malformed input.
    pub fn parse_tree(&self, input: &str) -> Result<SqlNode, RuleError> {
        Ok(grammar::parse_where(input, self.config.max_depth)?)
    }
}

impl Frontend for SqlWhere {
    type Output = String;

    fn name(&self) -> &'static str {
        "sql"
    }

    fn config(&self) -> &Config {
        &self.config
    }

    #[instrument(level = "debug", skip_all, fields(front_end = "sql", input_len = input.len()))]
    fn parse_with_resolver(
        &self,
        input: &str,
        resolver: &mut FieldResolver,
    ) -> Result<Rule, RuleError> {
        let node = grammar::parse_where(input, self.config.max_depth)?;
        let root = compile::compile_where(&node, resolver)?;
        tracing::debug!("where clause compiled");
        Ok(Rule::new(root))
    }

    fn serialize(&self, rule: &Rule) -> Result<String, SerializeError> {
        serial::to_sql(rule.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Context, ErrorKind};

    #[test]
    fn parse_and_evaluate() {
        let sql = SqlWhere::new();
        let rule = sql
            .parse("age BETWEEN 18 AND 65 AND status IN ('active', 'pending')")
            .unwrap();
        let ctx = Context::new().set("age", 30_i64).set("status", "active");
        assert!(rule.evaluate(&ctx).unwrap());
        assert!(!rule.evaluate(&ctx.clone().set("age", 70_i64)).unwrap());
    }

    #[test]
    fn canonical_round_trip() {
        let sql = SqlWhere::new();
        for canonical in [
            "age BETWEEN 18 AND 65",
            "name NOT LIKE 'J%'",
            "email IS NOT NULL AND (a = 1 OR b <> 'x')",
            "NOT (a = 1 OR b = 2)",
            "(price + tax) * 2 > 100",
            "s NOT IN (1, 2.5, 'x', NULL, TRUE)",
        ] {
            let rule = sql.parse(canonical).unwrap();
            assert_eq!(sql.serialize(&rule).unwrap(), canonical);
        }
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let sql = SqlWhere::new();
        let rule = sql.parse("x is not null and y like 'a_'").unwrap();
        assert_eq!(sql.serialize(&rule).unwrap(), "x IS NOT NULL AND y LIKE 'a_'");
    }

    #[test]
    fn validation_reports_position() {
        let result = SqlWhere::new().validate_with_errors("age >= AND x = 1");
        let first = result.first_error().unwrap();
        assert_eq!(first.kind, ErrorKind::Syntax);
        assert_eq!(first.position, Some(7));
    }
}
