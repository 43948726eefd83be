use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::Value;

/// A zero-argument computation producing a context value on demand.
pub type Thunk = Arc<dyn Fn() -> Value + Send + Sync>;

/// A context slot: either a concrete value or a deferred computation.
///
/// Deferred slots are invoked on every access. No caching is performed, so
/// the computation should be idempotent and side-effect free.
#[derive(Clone)]
pub enum ContextValue {
    Immediate(Value),
    Deferred(Thunk),
}

impl ContextValue {
    /// Produce the slot's value, invoking the thunk for deferred slots.
    #[must_use]
    pub fn resolve(&self) -> Value {
        match self {
            ContextValue::Immediate(v) => v.clone(),
            ContextValue::Deferred(thunk) => thunk(),
        }
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Immediate(v) => f.debug_tuple("Immediate").field(v).finish(),
            ContextValue::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Evaluation context: an insertion-ordered mapping from case-sensitive keys
/// to values.
///
/// Dotted keys passed to [`set`](Context::set) build nested maps, so
/// `set("user.profile.age", 25)` is reachable through the field path
/// `user.profile.age`. Missing keys read as [`Value::Null`].
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: IndexMap<String, ContextValue>,
}

impl Context {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value at a dot-separated path. Creates intermediate nested maps as needed.
    #[must_use]
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value.into());
        self
    }

    /// Set a deferred value under a top-level key.
    #[must_use]
    pub fn set_deferred(
        mut self,
        key: &str,
        thunk: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        self.insert_deferred(key, thunk);
        self
    }

    /// Insert a value at a dot-separated path (mutable reference version).
    pub fn insert(&mut self, path: &str, value: Value) {
        match path.split_once('.') {
            None => {
                self.data
                    .insert(path.to_owned(), ContextValue::Immediate(value));
            }
            Some((head, rest)) => {
                let slot = self
                    .data
                    .entry(head.to_owned())
                    .or_insert_with(|| ContextValue::Immediate(Value::Map(BTreeMap::new())));
                let mut root = match slot {
                    ContextValue::Immediate(Value::Map(map)) => std::mem::take(map),
                    _ => BTreeMap::new(),
                };
                let segments: Vec<&str> = rest.split('.').collect();
                insert_nested(&mut root, &segments, value);
                *slot = ContextValue::Immediate(Value::Map(root));
            }
        }
    }

    /// Insert a deferred value under a top-level key (mutable reference version).
    pub fn insert_deferred(
        &mut self,
        key: &str,
        thunk: impl Fn() -> Value + Send + Sync + 'static,
    ) {
        self.data
            .insert(key.to_owned(), ContextValue::Deferred(Arc::new(thunk)));
    }

    /// Look up a top-level key. Missing keys resolve to [`Value::Null`].
    #[must_use]
    pub fn get(&self, key: &str) -> Value {
        self.data
            .get(key)
            .map_or(Value::Null, ContextValue::resolve)
    }

    /// The raw slot for a key, without invoking deferred computations.
    #[must_use]
    pub fn slot(&self, key: &str) -> Option<&ContextValue> {
        self.data.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn insert_nested(map: &mut BTreeMap<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert((*last).to_owned(), value);
        }
        [first, rest @ ..] => {
            let entry = map
                .entry((*first).to_owned())
                .or_insert_with(|| Value::Map(BTreeMap::new()));
            if !matches!(entry, Value::Map(_)) {
                *entry = Value::Map(BTreeMap::new());
            }
            if let Value::Map(nested) = entry {
                insert_nested(nested, rest, value);
            }
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Context::new();
        for (k, v) in iter {
            ctx.insert(&k.into(), v.into());
        }
        ctx
    }
}
