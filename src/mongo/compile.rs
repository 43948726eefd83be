use serde_json::{Map, Value as Json};

use crate::compile::build;
use crate::parse::ParseError;
use crate::{CompileError, FieldResolver, Operand, OperatorKind, Value};

/// Type aliases accepted by `$type`, with the predicate each selects.
/// `number` is typed as well: it compiles to `IsInteger || IsFloat`, so
/// numeric strings do not match.
pub(crate) const TYPE_ALIASES: &[(&str, OperatorKind)] = &[
    ("null", OperatorKind::IsNull),
    ("bool", OperatorKind::IsBoolean),
    ("int", OperatorKind::IsInteger),
    ("double", OperatorKind::IsFloat),
    ("string", OperatorKind::IsString),
    ("array", OperatorKind::IsArray),
];

fn type_alias(name: &str) -> Option<OperatorKind> {
    let kind = match name {
        "boolean" => OperatorKind::IsBoolean,
        "long" | "integer" => OperatorKind::IsInteger,
        "float" | "decimal" => OperatorKind::IsFloat,
        _ => {
            return TYPE_ALIASES
                .iter()
                .find(|(alias, _)| *alias == name)
                .map(|(_, kind)| *kind)
        }
    };
    Some(kind)
}

/// Byte offset of a 1-based line and column.
fn byte_offset(input: &str, line: usize, column: usize) -> usize {
    let line_start: usize = input
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(input.len())
}

/// Decode JSON text into a document.
pub(crate) fn decode(input: &str) -> Result<Json, ParseError> {
    serde_json::from_str(input).map_err(|err| {
        ParseError::new(
            format!("Invalid JSON: {err}"),
            byte_offset(input, err.line(), err.column()),
        )
    })
}

fn keys(map: &Map<String, Json>) -> Vec<String> {
    map.keys().cloned().collect()
}

fn invalid(message: impl Into<String>, map: &Map<String, Json>) -> CompileError {
    CompileError::InvalidDocument {
        message: message.into(),
        fields: keys(map),
    }
}

fn literal(json: &Json) -> Operand {
    Operand::Literal(Value::from(json.clone()))
}

/// Combine clauses with an implicit `And`; no clauses match everything.
fn all_of(mut clauses: Vec<Operand>) -> Result<Operand, CompileError> {
    match clauses.len() {
        0 => Ok(Operand::Literal(Value::Bool(true))),
        1 => Ok(clauses.remove(0)),
        _ => build(OperatorKind::And, clauses),
    }
}

struct Compiler<'r> {
    resolver: &'r mut FieldResolver,
    max_depth: usize,
}

/// Compile a query document into an operator tree. A top-level array is an
/// implicit `$and` of its query objects.
pub(crate) fn compile_document(
    document: &Json,
    resolver: &mut FieldResolver,
    max_depth: usize,
) -> Result<Operand, CompileError> {
    let mut compiler = Compiler {
        resolver,
        max_depth,
    };
    let compiled = match document {
        Json::Object(map) => Some(compiler.query(map, 1)?),
        Json::Array(items) => compiler.branches(OperatorKind::And, items, 0)?,
        _ => None,
    };
    compiled.ok_or_else(|| CompileError::InvalidDocument {
        message: "Query document must decode to an object or a non-empty array of objects"
            .to_owned(),
        fields: Vec::new(),
    })
}

impl Compiler<'_> {
    fn too_deep(&self, map: &Map<String, Json>) -> CompileError {
        invalid(
            format!("Maximum nesting depth of {} exceeded", self.max_depth),
            map,
        )
    }

    fn enter(&self, map: &Map<String, Json>, depth: usize) -> Result<(), CompileError> {
        if depth > self.max_depth {
            return Err(self.too_deep(map));
        }
        Ok(())
    }

    fn query(&mut self, map: &Map<String, Json>, depth: usize) -> Result<Operand, CompileError> {
        self.enter(map, depth)?;
        let mut clauses = Vec::with_capacity(map.len());
        for (key, value) in map {
            let clause = match key.as_str() {
                "$and" => self.logical(OperatorKind::And, key, value, map, depth)?,
                "$or" => self.logical(OperatorKind::Or, key, value, map, depth)?,
                "$nor" => self.logical(OperatorKind::Nor, key, value, map, depth)?,
                op if op.starts_with('$') => {
                    return Err(CompileError::UnsupportedOperator {
                        token: op.to_owned(),
                        fields: keys(map),
                    })
                }
                path if path.split('.').count() > self.max_depth => {
                    return Err(self.too_deep(map));
                }
                path => self.field(path, value, depth)?,
            };
            clauses.push(clause);
        }
        all_of(clauses)
    }

    fn logical(
        &mut self,
        kind: OperatorKind,
        key: &str,
        value: &Json,
        parent: &Map<String, Json>,
        depth: usize,
    ) -> Result<Operand, CompileError> {
        let branches = match value {
            Json::Array(items) => self.branches(kind, items, depth)?,
            _ => None,
        };
        branches.ok_or_else(|| {
            invalid(
                format!("{key} requires a non-empty array of query objects"),
                parent,
            )
        })
    }

    /// Compile the query objects of a logical array one level down. `None`
    /// when the array is empty or holds anything but objects.
    fn branches(
        &mut self,
        kind: OperatorKind,
        items: &[Json],
        depth: usize,
    ) -> Result<Option<Operand>, CompileError> {
        if items.is_empty() || !items.iter().all(Json::is_object) {
            return Ok(None);
        }
        let mut operands = Vec::with_capacity(items.len());
        for item in items {
            if let Json::Object(map) = item {
                operands.push(self.query(map, depth + 1)?);
            }
        }
        build(kind, operands).map(Some)
    }

    fn field(&mut self, path: &str, value: &Json, depth: usize) -> Result<Operand, CompileError> {
        match value {
            Json::Object(ops) if ops.keys().any(|k| k.starts_with('$')) => {
                if !ops.keys().all(|k| k.starts_with('$')) {
                    return Err(invalid(
                        format!("Cannot mix operators and values for field '{path}'"),
                        ops,
                    ));
                }
                self.operators(path, ops, depth + 1)
            }
            _ => {
                let subject = Operand::Field(self.resolver.resolve(path));
                build(OperatorKind::Identical, vec![subject, literal(value)])
            }
        }
    }

    fn operators(
        &mut self,
        path: &str,
        ops: &Map<String, Json>,
        depth: usize,
    ) -> Result<Operand, CompileError> {
        use OperatorKind as K;

        self.enter(ops, depth)?;
        let mut clauses = Vec::with_capacity(ops.len());
        for (op, arg) in ops {
            let subject = Operand::Field(self.resolver.resolve(path));
            let comparison = match op.as_str() {
                "$eq" => Some(K::Identical),
                "$ne" => Some(K::NotIdentical),
                "$gt" => Some(K::GreaterThan),
                "$gte" => Some(K::GreaterThanOrEqualTo),
                "$lt" => Some(K::LessThan),
                "$lte" => Some(K::LessThanOrEqualTo),
                _ => None,
            };
            let clause = if let Some(kind) = comparison {
                build(kind, vec![subject, literal(arg)])?
            } else {
                match op.as_str() {
                    "$in" | "$nin" | "$all" => {
                        if !arg.is_array() {
                            return Err(invalid(format!("{op} requires an array"), ops));
                        }
                        let kind = match op.as_str() {
                            "$in" => K::In,
                            "$nin" => K::NotIn,
                            _ => K::ContainsAll,
                        };
                        build(kind, vec![subject, literal(arg)])?
                    }
                    "$exists" => {
                        let Json::Bool(exists) = arg else {
                            return Err(invalid("$exists requires a boolean", ops));
                        };
                        let is_null = build(
                            K::EqualTo,
                            vec![subject, Operand::Literal(Value::Null)],
                        )?;
                        if *exists {
                            build(K::Not, vec![is_null])?
                        } else {
                            is_null
                        }
                    }
                    "$regex" => {
                        let Json::String(pattern) = arg else {
                            return Err(invalid("$regex requires a string pattern", ops));
                        };
                        let flags = match ops.get("$options") {
                            None => "",
                            Some(Json::String(flags))
                                if flags.chars().all(|c| matches!(c, 'i' | 'm' | 's' | 'x')) =>
                            {
                                flags.as_str()
                            }
                            Some(_) => {
                                return Err(invalid("$options must be a string of i, m, s, x", ops))
                            }
                        };
                        let pattern = if flags.is_empty() {
                            pattern.clone()
                        } else {
                            format!("(?{flags}){pattern}")
                        };
                        build(
                            K::Matches,
                            vec![subject, Operand::Literal(Value::String(pattern))],
                        )?
                    }
                    "$options" => {
                        if !ops.contains_key("$regex") {
                            return Err(invalid("$options requires $regex", ops));
                        }
                        continue;
                    }
                    "$not" => {
                        let Json::Object(inner) = arg else {
                            return Err(invalid("$not requires an operator object", ops));
                        };
                        if inner.is_empty() || !inner.keys().all(|k| k.starts_with('$')) {
                            return Err(invalid("$not requires an operator object", ops));
                        }
                        let negated = self.operators(path, inner, depth + 1)?;
                        build(K::Not, vec![negated])?
                    }
                    "$size" => {
                        let Some(size) = arg.as_i64() else {
                            return Err(invalid("$size requires an integer", ops));
                        };
                        let length = build(K::Length, vec![subject])?;
                        build(K::Identical, vec![length, Operand::Literal(Value::Int(size))])?
                    }
                    "$type" if arg.as_str() == Some("number") => {
                        let int = build(K::IsInteger, vec![subject.clone()])?;
                        let float = build(K::IsFloat, vec![subject])?;
                        build(K::Or, vec![int, float])?
                    }
                    "$type" => {
                        let kind = arg
                            .as_str()
                            .and_then(type_alias)
                            .ok_or_else(|| invalid(format!("Unknown $type alias {arg}"), ops))?;
                        build(kind, vec![subject])?
                    }
                    other => {
                        return Err(CompileError::UnsupportedOperator {
                            token: other.to_owned(),
                            fields: keys(ops),
                        })
                    }
                }
            };
            clauses.push(clause);
        }
        all_of(clauses)
    }
}
