use std::fmt;
use std::sync::Arc;

use super::error::EvalError;
use super::{Context, Operand};

/// Side effect attached to a rule, invoked only when the rule evaluates to `true`.
pub type Action = Arc<dyn Fn(&Context) + Send + Sync>;

/// A compiled rule: an operator tree root plus an optional action.
///
/// Rules are immutable once built and can be evaluated concurrently from
/// several threads against independent contexts.
#[derive(Clone)]
pub struct Rule {
    root: Operand,
    action: Option<Action>,
}

impl Rule {
    #[must_use]
    pub fn new(root: impl Into<Operand>) -> Self {
        Self {
            root: root.into(),
            action: None,
        }
    }

    /// Attach an action, replacing any previous one.
    #[must_use]
    pub fn with_action(mut self, action: impl Fn(&Context) + Send + Sync + 'static) -> Self {
        self.action = Some(Arc::new(action));
        self
    }

    #[must_use]
    pub fn root(&self) -> &Operand {
        &self.root
    }

    #[must_use]
    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Evaluate the tree and convert the root's value to a boolean.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] for runtime failures such as division by zero or
    /// a malformed operator node.
    pub fn evaluate(&self, ctx: &Context) -> Result<bool, EvalError> {
        let result = crate::evaluate::evaluate(&self.root, ctx)?.truthy();
        tracing::trace!(result, "rule evaluated");
        Ok(result)
    }

    /// Evaluate, then invoke the action only when the result is `true`.
    ///
    /// # Errors
    ///
    /// Evaluation errors propagate and the action is not invoked.
    pub fn execute(&self, ctx: &Context) -> Result<bool, EvalError> {
        let matched = self.evaluate(ctx)?;
        if matched {
            if let Some(action) = &self.action {
                action(ctx);
            }
        }
        Ok(matched)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("root", &self.root)
            .field("action", &self.action.as_ref().map(|_| ".."))
            .finish()
    }
}
