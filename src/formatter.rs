//! Renders typed literal values into expression text.

use crate::ast::TypedValue;
use crate::config::{DateStyle, Dialect};
use crate::error::FilterError;

/// Fixed date text format, independent of locale.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Format mask passed to `TO_DATE`, matching [`DATE_FORMAT`].
pub const DATE_MASK: &str = "YYYY-MM-DD";

/// Quote a string literal, doubling embedded single quotes.
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// Format a value as it appears to the right of its operator keyword.
///
/// `TypedValue::None` produces an empty string: `IS NULL` carries no operand.
pub fn format_value(value: &TypedValue, dialect: &Dialect) -> Result<String, FilterError> {
    let text = match value {
        TypedValue::String(s) => quote_string(s),
        TypedValue::Number(n) => n.to_string(),
        TypedValue::Date(d) => {
            let day = d.format(DATE_FORMAT);
            match dialect.date_style {
                DateStyle::ToDate => format!("TO_DATE('{}', '{}')", day, DATE_MASK),
                DateStyle::Ansi => format!("DATE '{}'", day),
            }
        }
        TypedValue::Boolean(b) => dialect.boolean_style.literal(*b).to_string(),
        TypedValue::StringList(items) => {
            if items.is_empty() {
                return Err(FilterError::EmptyListOperand {
                    field: String::new(),
                });
            }
            let quoted: Vec<String> = items.iter().map(|s| quote_string(s)).collect();
            format!("({})", quoted.join(", "))
        }
        TypedValue::Range { lower, upper } => {
            format!(
                "{} AND {}",
                format_value(lower, dialect)?,
                format_value(upper, dialect)?
            )
        }
        TypedValue::None => String::new(),
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Number;
    use chrono::NaiveDate;

    fn fmt(value: TypedValue) -> String {
        format_value(&value, &Dialect::default()).unwrap()
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(fmt(TypedValue::string("HR")), "'HR'");
        assert_eq!(fmt(TypedValue::string("O'Brien")), "'O''Brien'");
        assert_eq!(fmt(TypedValue::string("''")), "''''''");
        assert_eq!(fmt(TypedValue::string("")), "''");
    }

    #[test]
    fn test_numbers_are_bare() {
        assert_eq!(fmt(TypedValue::number(50000)), "50000");
        assert_eq!(fmt(TypedValue::Number(Number::Float(1.5))), "1.5");
        assert_eq!(fmt(TypedValue::Number(Number::Float(2.0))), "2.0");
    }

    #[test]
    fn test_large_and_tiny_floats_are_fixed_point() {
        assert_eq!(fmt(TypedValue::Number(Number::Float(1e16))), "10000000000000000.0");
        assert_eq!(fmt(TypedValue::Number(Number::Float(-1e-7))), "-0.0000001");

        let huge = fmt(TypedValue::Number(Number::Float(1e300)));
        assert!(huge.starts_with('1') && huge.ends_with(".0"));
        assert!(!huge.contains('e'));
    }

    #[test]
    fn test_date_uses_explicit_format() {
        let date = TypedValue::Date(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert_eq!(fmt(date.clone()), "TO_DATE('2024-03-07', 'YYYY-MM-DD')");
        assert_eq!(
            format_value(&date, &Dialect::ansi()).unwrap(),
            "DATE '2024-03-07'"
        );
    }

    #[test]
    fn test_boolean_policy() {
        assert_eq!(fmt(TypedValue::Boolean(true)), "1");
        assert_eq!(fmt(TypedValue::Boolean(false)), "0");
        let ansi = Dialect::ansi();
        assert_eq!(format_value(&TypedValue::Boolean(false), &ansi).unwrap(), "FALSE");
    }

    #[test]
    fn test_string_list() {
        assert_eq!(fmt(TypedValue::list(["Open", "It's"])), "('Open', 'It''s')");
        assert_eq!(fmt(TypedValue::list(["x"])), "('x')");
        let err = format_value(&TypedValue::list(Vec::<String>::new()), &Dialect::default());
        assert!(matches!(err, Err(FilterError::EmptyListOperand { .. })));
    }

    #[test]
    fn test_range_formats_each_bound() {
        let range = TypedValue::range(TypedValue::number(1), TypedValue::Number(Number::Float(9.5)));
        assert_eq!(fmt(range), "1 AND 9.5");
    }

    #[test]
    fn test_none_is_empty() {
        assert_eq!(fmt(TypedValue::None), "");
    }
}
