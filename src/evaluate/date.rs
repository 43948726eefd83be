use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc, Weekday};

use crate::{OperatorKind, Value};

/// Read a date from an RFC 3339 string, a `YYYY-MM-DD[ HH:MM:SS]` string, or
/// a unix timestamp in seconds.
#[allow(clippy::cast_possible_truncation)]
fn parse(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(naive.and_utc());
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        Value::Int(secs) => DateTime::from_timestamp(*secs, 0),
        Value::Float(secs) if secs.is_finite() => DateTime::from_timestamp(secs.trunc() as i64, 0),
        _ => None,
    }
}

/// Date comparisons. Unparseable operands make the predicate false.
pub(super) fn compare(kind: OperatorKind, a: &Value, b: &Value) -> bool {
    let (Some(a), Some(b)) = (parse(a), parse(b)) else {
        return false;
    };
    match kind {
        OperatorKind::Before => a < b,
        OperatorKind::After => a > b,
        OperatorKind::SameDay => a.date_naive() == b.date_naive(),
        _ => false,
    }
}

/// Unary date operators. Predicates are false and accessors `null` for
/// values that do not parse as dates.
pub(super) fn inspect(kind: OperatorKind, value: &Value) -> Value {
    let Some(date) = parse(value) else {
        return if kind.is_predicate() {
            Value::Bool(false)
        } else {
            Value::Null
        };
    };
    let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
    match kind {
        OperatorKind::IsWeekend => Value::Bool(weekend),
        OperatorKind::IsWeekday => Value::Bool(!weekend),
        OperatorKind::Year => Value::Int(i64::from(date.year())),
        OperatorKind::Month => Value::Int(i64::from(date.month())),
        OperatorKind::DayOfMonth => Value::Int(i64::from(date.day())),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_formats() {
        for input in [
            Value::from("2024-03-15"),
            Value::from("2024-03-15 10:30:00"),
            Value::from("2024-03-15T10:30:00"),
            Value::from("2024-03-15T10:30:00Z"),
            Value::from("2024-03-15T10:30:00+00:00"),
            Value::Int(1_710_498_600),
        ] {
            assert_eq!(
                inspect(OperatorKind::DayOfMonth, &input),
                Value::Int(15),
                "{input:?}"
            );
        }
    }

    #[test]
    fn ordering_and_same_day() {
        let a = Value::from("2024-01-01");
        let b = Value::from("2024-06-01 12:00:00");
        assert!(compare(OperatorKind::Before, &a, &b));
        assert!(compare(OperatorKind::After, &b, &a));
        assert!(compare(
            OperatorKind::SameDay,
            &Value::from("2024-06-01"),
            &b
        ));
        assert!(!compare(OperatorKind::Before, &Value::from("soon"), &b));
    }

    #[test]
    fn weekend_and_accessors() {
        let saturday = Value::from("2024-03-16");
        assert_eq!(inspect(OperatorKind::IsWeekend, &saturday), Value::Bool(true));
        assert_eq!(inspect(OperatorKind::IsWeekday, &saturday), Value::Bool(false));
        assert_eq!(inspect(OperatorKind::Year, &saturday), Value::Int(2024));
        assert_eq!(inspect(OperatorKind::Month, &saturday), Value::Int(3));
    }

    #[test]
    fn unparseable_dates() {
        assert_eq!(inspect(OperatorKind::IsWeekend, &Value::Null), Value::Bool(false));
        assert_eq!(inspect(OperatorKind::Year, &Value::from("nope")), Value::Null);
    }
}
