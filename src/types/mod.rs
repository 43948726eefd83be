mod context;
mod error;
mod expr;
mod field_resolver;
mod operator;
mod reference;
mod rule;
mod validation;
mod value;

pub use context::{Context, ContextValue, Thunk};
pub use error::{CompileError, ErrorKind, EvalError, StructuralError};
pub use expr::{and, apply, field, lit, or, xor};
pub use field_resolver::FieldResolver;
pub use operator::{Arity, Category, Operand, Operator, OperatorKind};
pub use reference::{FieldRef, Variable, VariableProperty};
pub use rule::{Action, Rule};
pub use validation::{ValidationError, ValidationResult};
pub(crate) use value::{format_float, Number};
pub use value::{Record, TypeClass, Value};
