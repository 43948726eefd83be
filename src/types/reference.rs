use std::fmt;
use std::sync::Arc;

use super::{Context, Value};

/// A named reference resolved against the [`Context`] at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
}

impl Variable {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn resolve(&self, ctx: &Context) -> Value {
        ctx.get(&self.name)
    }
}

/// One link of a dotted field path: a property read on the parent's value.
#[derive(Debug, Clone)]
pub struct VariableProperty {
    parent: FieldRef,
    property: String,
    default: Value,
}

impl VariableProperty {
    #[must_use]
    pub fn new(parent: FieldRef, property: impl Into<String>, default: Value) -> Self {
        Self {
            parent,
            property: property.into(),
            default,
        }
    }

    #[must_use]
    pub fn parent(&self) -> &FieldRef {
        &self.parent
    }

    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Resolve by, in order: the object's zero-argument accessor, the
    /// object's public field, then a keyed read on maps and arrays. Falls back
    /// to the configured default.
    #[must_use]
    pub fn resolve(&self, ctx: &Context) -> Value {
        let parent = self.parent.resolve(ctx);
        self.step(&parent)
    }

    fn step(&self, parent: &Value) -> Value {
        self.read(parent).unwrap_or_else(|| self.default.clone())
    }

    fn read(&self, parent: &Value) -> Option<Value> {
        match parent {
            Value::Object(record) => record
                .call(&self.property)
                .or_else(|| record.field(&self.property)),
            Value::Map(map) => map.get(&self.property).cloned(),
            Value::Array(items) => self
                .property
                .parse::<usize>()
                .ok()
                .and_then(|idx| items.get(idx).cloned()),
            _ => None,
        }
    }
}

/// A shared handle to a field reference. Cloning is cheap and preserves
/// identity, see [`FieldRef::ptr_eq`].
#[derive(Debug, Clone)]
pub enum FieldRef {
    Variable(Arc<Variable>),
    Property(Arc<VariableProperty>),
}

impl FieldRef {
    /// The root variable and the property links above it, root first.
    fn chain(&self) -> (&Variable, Vec<&VariableProperty>) {
        let mut links = Vec::new();
        let mut cursor = self;
        loop {
            match cursor {
                FieldRef::Variable(var) => {
                    links.reverse();
                    return (var, links);
                }
                FieldRef::Property(prop) => {
                    links.push(prop.as_ref());
                    cursor = &prop.parent;
                }
            }
        }
    }

    #[must_use]
    pub fn resolve(&self, ctx: &Context) -> Value {
        let (root, links) = self.chain();
        links
            .into_iter()
            .fold(root.resolve(ctx), |value, prop| prop.step(&value))
    }

    /// The dotted path this reference reads.
    #[must_use]
    pub fn path(&self) -> String {
        let (root, links) = self.chain();
        let mut path = root.name().to_owned();
        for prop in links {
            path.push('.');
            path.push_str(prop.property());
        }
        path
    }

    /// Handle identity: true when both refer to the same resolved node.
    #[must_use]
    pub fn ptr_eq(&self, other: &FieldRef) -> bool {
        match (self, other) {
            (FieldRef::Variable(a), FieldRef::Variable(b)) => Arc::ptr_eq(a, b),
            (FieldRef::Property(a), FieldRef::Property(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for FieldRef {
    /// Two references are equal when they read the same path.
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.path() == other.path()
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;

    #[derive(Debug)]
    struct Account {
        balance: i64,
    }

    impl Record for Account {
        fn call(&self, accessor: &str) -> Option<Value> {
            match accessor {
                "overdrawn" => Some(Value::Bool(self.balance < 0)),
                _ => None,
            }
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "balance" => Some(Value::Int(self.balance)),
                _ => None,
            }
        }
    }

    fn prop(parent: FieldRef, name: &str) -> FieldRef {
        FieldRef::Property(Arc::new(VariableProperty::new(parent, name, Value::Null)))
    }

    fn var(name: &str) -> FieldRef {
        FieldRef::Variable(Arc::new(Variable::new(name)))
    }

    #[test]
    fn reads_nested_map() {
        let ctx = Context::new().set("user.profile.age", 30_i64);
        let age = prop(prop(var("user"), "profile"), "age");
        assert_eq!(age.resolve(&ctx), Value::Int(30));
        assert_eq!(age.path(), "user.profile.age");
    }

    #[test]
    fn reads_array_by_index() {
        let ctx = Context::new().set("tags", vec!["a", "b"]);
        assert_eq!(prop(var("tags"), "1").resolve(&ctx), Value::from("b"));
        assert_eq!(prop(var("tags"), "9").resolve(&ctx), Value::Null);
        assert_eq!(prop(var("tags"), "x").resolve(&ctx), Value::Null);
    }

    #[test]
    fn accessor_then_field_on_objects() {
        let record: Arc<dyn Record> = Arc::new(Account { balance: -5 });
        let mut ctx = Context::new();
        ctx.insert("account", Value::Object(record));
        assert_eq!(
            prop(var("account"), "overdrawn").resolve(&ctx),
            Value::Bool(true)
        );
        assert_eq!(prop(var("account"), "balance").resolve(&ctx), Value::Int(-5));
        assert_eq!(prop(var("account"), "owner").resolve(&ctx), Value::Null);
    }

    #[test]
    fn falls_back_to_default() {
        let ctx = Context::new().set("user", "scalar");
        let with_default = FieldRef::Property(Arc::new(VariableProperty::new(
            var("user"),
            "age",
            Value::Int(-1),
        )));
        assert_eq!(with_default.resolve(&ctx), Value::Int(-1));
    }

    #[test]
    fn long_chains_resolve_without_recursion() {
        let mut chain = var("root");
        for _ in 0..50_000 {
            chain = prop(chain, "next");
        }
        assert_eq!(chain.resolve(&Context::new()), Value::Null);
        assert_eq!(chain.path().len(), "root".len() + 50_000 * ".next".len());
        // Unwind by hand so the test's own teardown stays shallow.
        while let FieldRef::Property(link) = chain {
            chain = match Arc::try_unwrap(link) {
                Ok(link) => link.parent,
                Err(_) => break,
            };
        }
    }

    #[test]
    fn identity_vs_path_equality() {
        let a = var("x");
        let b = var("x");
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert!(a.ptr_eq(&a.clone()));
    }
}
