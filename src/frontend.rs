use tracing::instrument;

use crate::compile::compile_expression;
use crate::parse::parse_expression;
use crate::serial::{self, SerializeError};
use crate::{Config, Context, FieldResolver, Rule, RuleError, ValidationResult};

/// A surface syntax that compiles into the shared operator tree.
///
/// Implementors provide parsing and serialization; validation comes for free
/// and never fails, whatever the input.
pub trait Frontend {
    /// What [`serialize`](Frontend::serialize) produces: text or a document.
    type Output;

    /// Short name used in log events.
    fn name(&self) -> &'static str;

    fn config(&self) -> &Config;

    /// Parse and compile `input`, resolving fields through `resolver` so
    /// several rules can share reference handles.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Parse`] for syntax errors and
    /// [`RuleError::Compile`] for semantic or structural ones.
    fn parse_with_resolver(
        &self,
        input: &str,
        resolver: &mut FieldResolver,
    ) -> Result<Rule, RuleError>;

    /// Render a rule back into this syntax's canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`] when the tree is malformed or uses values or
    /// operators this syntax cannot express.
    fn serialize(&self, rule: &Rule) -> Result<Self::Output, SerializeError>;

    /// Parse and compile `input` with a fresh resolver.
    ///
    /// # Errors
    ///
    /// See [`parse_with_resolver`](Frontend::parse_with_resolver).
    fn parse(&self, input: &str) -> Result<Rule, RuleError> {
        let mut resolver = FieldResolver::with_default(self.config().property_default.clone());
        self.parse_with_resolver(input, &mut resolver)
    }

    /// Parse, then attach `action`, invoked only when the rule evaluates to `true`.
    ///
    /// # Errors
    ///
    /// See [`parse_with_resolver`](Frontend::parse_with_resolver).
    fn parse_with_action<F>(&self, input: &str, action: F) -> Result<Rule, RuleError>
    where
        F: Fn(&Context) + Send + Sync + 'static,
        Self: Sized,
    {
        Ok(self.parse(input)?.with_action(action))
    }

    fn validate(&self, input: &str) -> bool {
        self.validate_with_errors(input).is_valid()
    }

    fn validate_with_errors(&self, input: &str) -> ValidationResult {
        crate::validate::validate_input(self, input)
    }
}

/// The infix expression language: `age >= 18 and country in ["US", "CA"]`.
#[derive(Debug, Clone, Default)]
pub struct Expression {
    config: Config,
}

impl Expression {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }
}

impl Frontend for Expression {
    type Output = String;

    fn name(&self) -> &'static str {
        "expression"
    }

    fn config(&self) -> &Config {
        &self.config
    }

    #[instrument(level = "debug", skip_all, fields(front_end = "expression", input_len = input.len()))]
    fn parse_with_resolver(
        &self,
        input: &str,
        resolver: &mut FieldResolver,
    ) -> Result<Rule, RuleError> {
        let node = parse_expression(input, self.config.max_depth)?;
        let root = compile_expression(&node, resolver)?;
        tracing::debug!("expression compiled");
        Ok(Rule::new(root))
    }

    fn serialize(&self, rule: &Rule) -> Result<String, SerializeError> {
        serial::to_expression(rule.root())
    }
}
