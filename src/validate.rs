//! Conversion of parse and compile failures into [`ValidationResult`]s.

use crate::{Config, ErrorKind, Frontend, RuleError, ValidationError, ValidationResult};

/// A window of `input` around the byte offset `position`, at most `radius`
/// characters each side, with `...` marking a truncated side.
pub(crate) fn snippet(input: &str, position: usize, radius: usize) -> String {
    let total = input.chars().count();
    let at = input
        .char_indices()
        .take_while(|(offset, _)| *offset < position)
        .count();
    let start = at.saturating_sub(radius);
    let end = at.saturating_add(radius).min(total);

    let mut out = String::new();
    if start > 0 {
        out.push_str("...");
    }
    out.extend(input.chars().skip(start).take(end - start));
    if end < total {
        out.push_str("...");
    }
    out
}

/// `fields: a, b, c`, capped at `max` names.
pub(crate) fn field_listing(fields: &[String], max: usize) -> Option<String> {
    if fields.is_empty() {
        return None;
    }
    let shown: Vec<&str> = fields.iter().take(max).map(String::as_str).collect();
    let mut listing = format!("fields: {}", shown.join(", "));
    if fields.len() > max {
        listing.push_str(", ...");
    }
    Some(listing)
}

/// Build the single error entry describing `err`.
pub(crate) fn report(err: &RuleError, input: &str, config: &Config) -> ValidationError {
    match err {
        RuleError::Parse(parse) => {
            let entry = ValidationError::new(ErrorKind::Syntax, parse.message());
            match parse.position() {
                Some(position) => entry
                    .with_position(position)
                    .with_context(snippet(input, position, config.snippet_radius)),
                None => entry,
            }
        }
        RuleError::Compile(compile) => {
            let entry = ValidationError::new(compile.kind(), compile.to_string());
            match field_listing(compile.fields(), config.max_fields_listed) {
                Some(listing) => entry.with_context(listing),
                None => entry,
            }
        }
    }
}

/// Run `frontend`'s full parse and compile pipeline over `input`, capturing
/// every failure as a result.
pub(crate) fn validate_input<F: Frontend + ?Sized>(frontend: &F, input: &str) -> ValidationResult {
    if input.trim().is_empty() {
        tracing::debug!(front_end = frontend.name(), "validation failed: empty input");
        return ValidationResult::failure(vec![ValidationError::new(
            ErrorKind::Syntax,
            "Expression must not be empty",
        )]);
    }
    match frontend.parse(input) {
        Ok(_) => {
            tracing::debug!(
                front_end = frontend.name(),
                input_len = input.len(),
                "validation passed"
            );
            ValidationResult::success()
        }
        Err(err) => {
            tracing::debug!(
                front_end = frontend.name(),
                input_len = input.len(),
                error = %err,
                "validation failed"
            );
            ValidationResult::failure(vec![report(&err, input, frontend.config())])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParseError;
    use crate::CompileError;

    #[test]
    fn snippet_marks_truncated_sides() {
        let input = "abcdefghijklmnopqrstuvwxyz";
        assert_eq!(snippet(input, 13, 3), "...klmnop...");
        assert_eq!(snippet(input, 1, 3), "abcd...");
        assert_eq!(snippet(input, 25, 3), "...wxyz");
        assert_eq!(snippet("short", 2, 50), "short");
    }

    #[test]
    fn snippet_counts_characters_not_bytes() {
        let input = "ééééé == x";
        let position = input.find("==").unwrap();
        assert_eq!(snippet(input, position, 2), "...é ==...");
    }

    #[test]
    fn snippet_tolerates_out_of_range_positions() {
        assert_eq!(snippet("abc", 99, 1), "...c");
    }

    #[test]
    fn listing_is_capped() {
        let fields: Vec<String> = ["a", "b", "c"].iter().map(|s| (*s).to_owned()).collect();
        assert_eq!(field_listing(&fields, 5).unwrap(), "fields: a, b, c");
        assert_eq!(field_listing(&fields, 2).unwrap(), "fields: a, b, ...");
        assert_eq!(field_listing(&[], 5), None);
    }

    #[test]
    fn syntax_reports_carry_position_and_snippet() {
        let err = RuleError::from(ParseError::new("Unexpected token ')'", 6));
        let entry = report(&err, "a == 1)", &Config::default());
        assert_eq!(entry.kind, ErrorKind::Syntax);
        assert_eq!(entry.message, "Unexpected token ')'");
        assert_eq!(entry.position, Some(6));
        assert_eq!(entry.context.as_deref(), Some("a == 1)"));
    }

    #[test]
    fn structural_reports_list_fields() {
        let err = RuleError::from(CompileError::UnsupportedOperator {
            token: "$where".into(),
            fields: vec!["$where".into(), "age".into()],
        });
        let entry = report(&err, "{}", &Config::default());
        assert_eq!(entry.kind, ErrorKind::Semantic);
        assert_eq!(entry.message, "Unsupported operator: $where");
        assert_eq!(entry.context.as_deref(), Some("fields: $where, age"));
        assert_eq!(entry.position, None);
    }
}
