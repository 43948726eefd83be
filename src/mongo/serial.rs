use serde_json::{json, Map, Value as Json};

use crate::serial::SerializeError;
use crate::{Operand, Operator, OperatorKind, Value};

use super::compile::TYPE_ALIASES;

const SYNTAX: &str = "Mongo";

fn json_value(value: &Value) -> Result<Json, SerializeError> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f).map(Json::Number).ok_or(
            SerializeError::UnsupportedValue {
                type_name: "non-finite float",
            },
        )?,
        Value::String(s) => Json::String(s.clone()),
        Value::Array(items) => Json::Array(
            items
                .iter()
                .map(json_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Map(map) => Json::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), json_value(v)?)))
                .collect::<Result<Map<_, _>, SerializeError>>()?,
        ),
        Value::Object(_) => {
            return Err(SerializeError::UnsupportedValue { type_name: "object" })
        }
    })
}

fn field_path(operand: &Operand) -> Result<Option<String>, SerializeError> {
    let Some(reference) = operand.as_field() else {
        return Ok(None);
    };
    let path = reference.path();
    if path.is_empty() || path.starts_with('$') {
        return Err(SerializeError::InvalidField {
            path,
            syntax: SYNTAX,
        });
    }
    Ok(Some(path))
}

/// Split a leading inline flag group such as `(?i)` off a pattern.
fn split_flags(pattern: &str) -> Option<(&str, &str)> {
    let rest = pattern.strip_prefix("(?")?;
    let end = rest.find(')')?;
    let flags = &rest[..end];
    (!flags.is_empty() && flags.chars().all(|c| matches!(c, 'i' | 'm' | 's' | 'x')))
        .then(|| (flags, &rest[end + 1..]))
}

fn clause(op: &str, arg: Json) -> Map<String, Json> {
    let mut map = Map::new();
    map.insert(op.to_owned(), arg);
    map
}

/// The `(path, {"$op": arg})` form of a single-field predicate, if it has one.
fn field_clause(op: &Operator) -> Result<Option<(String, Map<String, Json>)>, SerializeError> {
    use OperatorKind as K;

    op.check()?;
    let operands = op.operands();

    if op.kind() == K::Not {
        let Some(inner) = operands[0].as_operator() else {
            return Ok(None);
        };
        if let Some((path, map)) = field_clause(inner)? {
            if map.get("$exists") == Some(&Json::Bool(false)) {
                return Ok(Some((path, clause("$exists", Json::Bool(true)))));
            }
            return Ok(Some((path, clause("$not", Json::Object(map)))));
        }
        return Ok(None);
    }

    if op.kind() == K::Or {
        if let [Operand::Operator(int), Operand::Operator(float)] = operands {
            if let (K::IsInteger, K::IsFloat, [a], [b]) =
                (int.kind(), float.kind(), int.operands(), float.operands())
            {
                if let (Some(path), Some(other)) = (field_path(a)?, field_path(b)?) {
                    if path == other {
                        return Ok(Some((path, clause("$type", Json::from("number")))));
                    }
                }
            }
        }
        return Ok(None);
    }

    if let [Operand::Operator(length), Operand::Literal(Value::Int(size))] = operands {
        if op.kind() == K::Identical && length.kind() == K::Length {
            if let [subject] = length.operands() {
                if let Some(path) = field_path(subject)? {
                    return Ok(Some((path, clause("$size", Json::from(*size)))));
                }
            }
        }
        return Ok(None);
    }

    let Some(path) = operands.first().map(field_path).transpose()?.flatten() else {
        return Ok(None);
    };

    if let Some((alias, _)) = TYPE_ALIASES.iter().find(|(_, kind)| *kind == op.kind()) {
        return Ok(Some((path, clause("$type", Json::from(*alias)))));
    }

    let Some(Operand::Literal(value)) = operands.get(1) else {
        return Ok(None);
    };
    let name = match op.kind() {
        K::Identical => "$eq",
        K::NotIdentical => "$ne",
        K::GreaterThan => "$gt",
        K::GreaterThanOrEqualTo => "$gte",
        K::LessThan => "$lt",
        K::LessThanOrEqualTo => "$lte",
        K::In if matches!(value, Value::Array(_)) => "$in",
        K::NotIn if matches!(value, Value::Array(_)) => "$nin",
        K::ContainsAll if matches!(value, Value::Array(_)) => "$all",
        K::EqualTo if value.is_null() => "$exists",
        K::Matches => {
            let Value::String(pattern) = value else {
                return Ok(None);
            };
            let map = match split_flags(pattern) {
                Some((flags, rest)) => {
                    let mut map = clause("$regex", Json::from(rest));
                    map.insert("$options".to_owned(), Json::from(flags));
                    map
                }
                None => clause("$regex", Json::from(pattern.as_str())),
            };
            return Ok(Some((path, map)));
        }
        _ => return Ok(None),
    };
    let arg = if name == "$exists" {
        Json::Bool(false)
    } else {
        json_value(value)?
    };
    Ok(Some((path, clause(name, arg))))
}

/// Render an operator tree as a canonical query document.
pub(crate) fn to_document(root: &Operand) -> Result<Json, SerializeError> {
    match root {
        Operand::Literal(Value::Bool(true)) => Ok(json!({})),
        Operand::Literal(value) => Err(SerializeError::UnsupportedValue {
            type_name: value.type_name(),
        }),
        Operand::Field(reference) => Err(SerializeError::InvalidField {
            path: reference.path(),
            syntax: SYNTAX,
        }),
        Operand::Operator(op) => operator_document(op),
    }
}

fn operator_document(op: &Operator) -> Result<Json, SerializeError> {
    op.check()?;
    let key = match op.kind() {
        OperatorKind::And if op.operands().len() == 1 => {
            return to_document(&op.operands()[0]);
        }
        OperatorKind::And => "$and",
        OperatorKind::Or => match field_clause(op)? {
            Some((path, map)) => return Ok(Json::Object(clause(&path, Json::Object(map)))),
            None => "$or",
        },
        OperatorKind::Nor => "$nor",
        kind => {
            if let Some((path, map)) = field_clause(op)? {
                return Ok(Json::Object(clause(&path, Json::Object(map))));
            }
            if kind == OperatorKind::Not {
                let inner = to_document(&op.operands()[0])?;
                return Ok(json!({ "$nor": [inner] }));
            }
            return Err(SerializeError::Unrepresentable {
                operator: kind,
                syntax: SYNTAX,
            });
        }
    };
    let items = op
        .operands()
        .iter()
        .map(to_document)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json::Object(clause(key, Json::Array(items))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{and, apply, field, lit, or};

    #[test]
    fn comparisons_use_operator_form() {
        let doc = to_document(&field("age").gte(lit(18_i64))).unwrap();
        assert_eq!(doc, json!({"age": {"$gte": 18}}));
        let doc = to_document(&field("s").identical(lit("x"))).unwrap();
        assert_eq!(doc, json!({"s": {"$eq": "x"}}));
    }

    #[test]
    fn logical_nodes() {
        let tree = or([
            field("a").identical(lit(1_i64)),
            and([field("b").gt(lit(2_i64)), field("c").lt(lit(3.5))]),
        ]);
        assert_eq!(
            to_document(&tree).unwrap(),
            json!({"$or": [
                {"a": {"$eq": 1}},
                {"$and": [{"b": {"$gt": 2}}, {"c": {"$lt": 3.5}}]}
            ]})
        );
    }

    #[test]
    fn negations() {
        let is_null = field("x").equals(lit(Value::Null));
        assert_eq!(to_document(&is_null).unwrap(), json!({"x": {"$exists": false}}));
        assert_eq!(to_document(&!is_null).unwrap(), json!({"x": {"$exists": true}}));

        let not_gt = !field("x").gt(lit(1_i64));
        assert_eq!(to_document(&not_gt).unwrap(), json!({"x": {"$not": {"$gt": 1}}}));

        let not_or = !or([field("a").identical(lit(1_i64))]);
        assert_eq!(
            to_document(&not_or).unwrap(),
            json!({"$nor": [{"$or": [{"a": {"$eq": 1}}]}]})
        );
    }

    #[test]
    fn regex_flags_become_options() {
        let tree = field("name").matches(lit("(?i)^jo"));
        assert_eq!(
            to_document(&tree).unwrap(),
            json!({"name": {"$regex": "^jo", "$options": "i"}})
        );
        let tree = field("name").matches(lit("(?:a|b)"));
        assert_eq!(to_document(&tree).unwrap(), json!({"name": {"$regex": "(?:a|b)"}}));
    }

    #[test]
    fn size_and_type() {
        let size = apply(OperatorKind::Length, vec![field("tags")]).identical(lit(2_i64));
        assert_eq!(to_document(&size).unwrap(), json!({"tags": {"$size": 2}}));
        let ty = apply(OperatorKind::IsString, vec![field("n")]);
        assert_eq!(to_document(&ty).unwrap(), json!({"n": {"$type": "string"}}));

        let number = or([
            apply(OperatorKind::IsInteger, vec![field("n")]),
            apply(OperatorKind::IsFloat, vec![field("n")]),
        ]);
        assert_eq!(to_document(&number).unwrap(), json!({"n": {"$type": "number"}}));
        assert_eq!(
            to_document(&!number).unwrap(),
            json!({"n": {"$not": {"$type": "number"}}})
        );

        let loose = apply(OperatorKind::IsNumeric, vec![field("n")]);
        assert!(matches!(
            to_document(&loose),
            Err(SerializeError::Unrepresentable { .. })
        ));
    }

    #[test]
    fn rejects_what_has_no_document_form() {
        let sum = (field("a") + lit(1_i64)).gt(lit(2_i64));
        assert!(matches!(
            to_document(&sum),
            Err(SerializeError::Unrepresentable {
                operator: OperatorKind::GreaterThan,
                syntax: "Mongo"
            })
        ));
        assert!(to_document(&lit(false)).is_err());
        assert!(to_document(&field("a").identical(lit(f64::NAN))).is_err());
        assert_eq!(to_document(&lit(true)).unwrap(), json!({}));
    }
}
