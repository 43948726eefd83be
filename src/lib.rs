//! Rule evaluation over a shared operator tree.
//!
//! Several surface syntaxes compile into the same tree of [`Operator`]s:
//! the infix [`Expression`] language, SQL `WHERE` clauses ([`SqlWhere`]) and
//! Mongo-style query documents ([`MongoQuery`]). A compiled [`Rule`] is
//! evaluated against a [`Context`] and can be serialized back into any
//! syntax that can express it.
//!
//! ```
//! use rulekit::{Context, Expression, Frontend};
//!
//! let rule = Expression::new()
//!     .parse(r#"age >= 18 and country in ["US", "CA"]"#)
//!     .unwrap();
//! let ctx = Context::new().set("age", 21_i64).set("country", "CA");
//! assert!(rule.evaluate(&ctx).unwrap());
//! ```

mod compile;
mod config;
mod error;
mod evaluate;
mod frontend;
mod mongo;
pub mod parse;
mod serial;
mod sql;
mod types;
mod validate;

pub use config::Config;
pub use error::RuleError;
pub use frontend::{Expression, Frontend};
pub use mongo::MongoQuery;
pub use parse::ParseError;
pub use serial::SerializeError;
pub use sql::{SqlNode, SqlWhere};
pub use types::{
    and, apply, field, lit, or, xor, Action, Arity, Category, CompileError, Context, ContextValue,
    ErrorKind, EvalError, FieldRef, FieldResolver, Operand, Operator, OperatorKind, Record, Rule,
    StructuralError, Thunk, TypeClass, ValidationError, ValidationResult, Value, Variable,
    VariableProperty,
};
