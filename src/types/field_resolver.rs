use std::collections::HashMap;
use std::sync::Arc;

use super::reference::{FieldRef, Variable, VariableProperty};
use super::Value;

/// Turns dotted field paths into reference chains.
///
/// Results are memoized per resolver instance, keyed by the full path (and by
/// every prefix), so resolving the same path twice returns the identical
/// handle. The cache is a plain map: one resolver belongs to one compilation
/// unit and is passed by `&mut`.
#[derive(Debug, Clone)]
pub struct FieldResolver {
    cache: HashMap<String, FieldRef>,
    default: Value,
}

impl Default for FieldResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::with_default(Value::Null)
    }

    /// Create a resolver whose property links fall back to `default` when a
    /// property cannot be read.
    #[must_use]
    pub fn with_default(default: Value) -> Self {
        Self {
            cache: HashMap::new(),
            default,
        }
    }

    /// Resolve a dotted path. Never fails: absent fields surface only at
    /// evaluation time, as `null` or the configured default.
    pub fn resolve(&mut self, path: &str) -> FieldRef {
        if let Some(hit) = self.cache.get(path) {
            tracing::trace!(path, "field resolver cache hit");
            return hit.clone();
        }
        tracing::trace!(path, "field resolver cache miss");

        // End offset of every prefix, the full path last.
        let ends: Vec<usize> = path
            .match_indices('.')
            .map(|(i, _)| i)
            .chain([path.len()])
            .collect();
        let cached = ends
            .iter()
            .enumerate()
            .rev()
            .skip(1)
            .find_map(|(i, &end)| self.cache.get(&path[..end]).map(|hit| (i, hit.clone())));
        let (mut reference, next) = match cached {
            Some((i, hit)) => (hit, i + 1),
            None => {
                let head = &path[..ends[0]];
                let root = FieldRef::Variable(Arc::new(Variable::new(head)));
                self.cache.insert(head.to_owned(), root.clone());
                (root, 1)
            }
        };
        for i in next..ends.len() {
            let property = &path[ends[i - 1] + 1..ends[i]];
            reference = FieldRef::Property(Arc::new(VariableProperty::new(
                reference,
                property,
                self.default.clone(),
            )));
            self.cache.insert(path[..ends[i]].to_owned(), reference.clone());
        }
        reference
    }

    /// Drop all memoized entries. Handles returned earlier stay valid, but
    /// later resolutions produce new, independent handles.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// The number of memoized paths, prefixes included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
