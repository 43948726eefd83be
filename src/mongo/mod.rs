//! Mongo-style query documents: `{"age": {"$gte": 18}, "status": "active"}`.
//!
//! Keys of one object combine with an implicit `And`, and `{}` matches
//! everything. Plain values and `$eq` compare without coercion.

mod compile;
mod serial;

use tracing::instrument;

use crate::serial::SerializeError;
use crate::{Config, FieldResolver, Frontend, Rule, RuleError};

/// Parses and renders query documents, from JSON text or an already decoded
/// [`serde_json::Value`].
#[derive(Debug, Clone, Default)]
pub struct MongoQuery {
    config: Config,
}

impl MongoQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Compile a decoded document.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Compile`] for unsupported operators and
    /// malformed document shapes.
    pub fn parse_document(&self, document: &serde_json::Value) -> Result<Rule, RuleError> {
        let mut resolver = FieldResolver::with_default(self.config.property_default.clone());
        self.parse_document_with_resolver(document, &mut resolver)
    }

    /// Compile a decoded document, resolving fields through `resolver`.
    ///
    /// # Errors
    ///
    /// See [`parse_document`](MongoQuery::parse_document).
    #[instrument(level = "debug", skip_all, fields(front_end = "mongo"))]
    pub fn parse_document_with_resolver(
        &self,
        document: &serde_json::Value,
        resolver: &mut FieldResolver,
    ) -> Result<Rule, RuleError> {
        let root = compile::compile_document(document, resolver, self.config.max_depth)?;
        tracing::debug!("query document compiled");
        Ok(Rule::new(root))
    }
}

impl Frontend for MongoQuery {
    type Output = serde_json::Value;

    fn name(&self) -> &'static str {
        "mongo"
    }

    fn config(&self) -> &Config {
        &self.config
    }

    #[instrument(level = "debug", skip_all, fields(front_end = "mongo", input_len = input.len()))]
    fn parse_with_resolver(
        &self,
        input: &str,
        resolver: &mut FieldResolver,
    ) -> Result<Rule, RuleError> {
        let document = compile::decode(input)?;
        self.parse_document_with_resolver(&document, resolver)
    }

    fn serialize(&self, rule: &Rule) -> Result<serde_json::Value, SerializeError> {
        serial::to_document(rule.root())
    }
}
