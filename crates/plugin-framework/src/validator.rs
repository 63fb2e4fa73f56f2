//! Attribute validators
//!
//! Checks run against configured (non-null) attribute values during
//! config validation. Type mismatches are reported by the schema walk, so a
//! validator silently skips values it cannot interpret.

use crate::coerce;
use crate::diagnostics::Diagnostics;
use crate::path::AttributePath;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Provider-supplied validation logic
pub trait AttributeValidator: Send + Sync + fmt::Debug {
    /// Human readable description, shown in schema output
    fn description(&self) -> String;

    /// Appends diagnostics for an invalid `value` found at `path`
    fn validate(&self, path: &AttributePath, value: &Value, diagnostics: &mut Diagnostics);
}

/// Validator attached to an [`Attribute`](crate::schema::Attribute)
#[derive(Debug, Clone)]
pub enum Validator {
    /// String value must be one of the listed values
    OneOf(Vec<String>),
    /// String length (in characters) bounds
    LengthBetween { min: Option<usize>, max: Option<usize> },
    /// String value must match the regular expression
    RegexMatches(Regex),
    /// Whole number bounds
    Int64Between { min: Option<i64>, max: Option<i64> },
    /// Number bounds
    Float64Between { min: Option<f64>, max: Option<f64> },
    /// List or map element count bounds
    SizeBetween { min: Option<usize>, max: Option<usize> },
    Custom(Arc<dyn AttributeValidator>),
}

impl Validator {
    pub fn custom(validator: impl AttributeValidator + 'static) -> Self {
        Self::Custom(Arc::new(validator))
    }

    pub fn description(&self) -> String {
        match self {
            Self::OneOf(values) => format!("value must be one of: {}", quoted_list(values)),
            Self::LengthBetween { min, max } => {
                format!("string length must be {}", bounds(min, max))
            }
            Self::RegexMatches(regex) => {
                format!("value must match regular expression '{}'", regex.as_str())
            }
            Self::Int64Between { min, max } => format!("value must be {}", bounds(min, max)),
            Self::Float64Between { min, max } => format!("value must be {}", bounds(min, max)),
            Self::SizeBetween { min, max } => {
                format!("must contain {} elements", bounds(min, max))
            }
            Self::Custom(validator) => validator.description(),
        }
    }

    pub fn validate(&self, path: &AttributePath, value: &Value, diagnostics: &mut Diagnostics) {
        match self {
            Self::OneOf(values) => {
                let Some(s) = coerce::to_string(value) else { return };
                if !values.contains(&s) {
                    diagnostics.add_attribute_error(
                        path,
                        "Invalid Attribute Value Match",
                        format!(
                            "Attribute {path} value must be one of: {}, got: {s:?}",
                            quoted_list(values)
                        ),
                    );
                }
            }
            Self::LengthBetween { min, max } => {
                let Some(s) = coerce::to_string(value) else { return };
                let length = s.chars().count();
                if out_of_bounds(length, *min, *max) {
                    diagnostics.add_attribute_error(
                        path,
                        "Invalid Attribute Value Length",
                        format!(
                            "Attribute {path} string length must be {}, got: {length}",
                            bounds(min, max)
                        ),
                    );
                }
            }
            Self::RegexMatches(regex) => {
                let Some(s) = coerce::to_string(value) else { return };
                if !regex.is_match(&s) {
                    diagnostics.add_attribute_error(
                        path,
                        "Invalid Attribute Value Match",
                        format!(
                            "Attribute {path} value must match regular expression '{}', got: {s:?}",
                            regex.as_str()
                        ),
                    );
                }
            }
            Self::Int64Between { min, max } => {
                let Some(n) = coerce::to_i64(value) else { return };
                if out_of_bounds(n, *min, *max) {
                    diagnostics.add_attribute_error(
                        path,
                        "Invalid Attribute Value",
                        format!("Attribute {path} value must be {}, got: {n}", bounds(min, max)),
                    );
                }
            }
            Self::Float64Between { min, max } => {
                let Some(n) = coerce::to_f64(value) else { return };
                if out_of_bounds(n, *min, *max) {
                    diagnostics.add_attribute_error(
                        path,
                        "Invalid Attribute Value",
                        format!("Attribute {path} value must be {}, got: {n}", bounds(min, max)),
                    );
                }
            }
            Self::SizeBetween { min, max } => {
                let size = match value {
                    Value::Array(items) => items.len(),
                    Value::Object(entries) => entries.len(),
                    _ => return,
                };
                if out_of_bounds(size, *min, *max) {
                    diagnostics.add_attribute_error(
                        path,
                        "Invalid Attribute Value",
                        format!(
                            "Attribute {path} must contain {} elements, got: {size}",
                            bounds(min, max)
                        ),
                    );
                }
            }
            Self::Custom(validator) => validator.validate(path, value, diagnostics),
        }
    }
}

// Regex has no equality; validators compare by what they check
impl PartialEq for Validator {
    fn eq(&self, other: &Self) -> bool {
        self.description() == other.description()
    }
}

impl Serialize for Validator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.description())
    }
}

fn out_of_bounds<T: PartialOrd>(value: T, min: Option<T>, max: Option<T>) -> bool {
    min.is_some_and(|min| value < min) || max.is_some_and(|max| value > max)
}

fn bounds<T: fmt::Display>(min: &Option<T>, max: &Option<T>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("between {min} and {max}"),
        (Some(min), None) => format!("at least {min}"),
        (None, Some(max)) => format!("at most {max}"),
        (None, None) => "unbounded".to_string(),
    }
}

fn quoted_list(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
    format!("[{}]", quoted.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(validator: &Validator, value: Value) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        validator.validate(&AttributePath::root("field"), &value, &mut diagnostics);
        diagnostics
    }

    #[test]
    fn test_one_of() {
        let validator = Validator::OneOf(vec!["text".to_string(), "json".to_string()]);
        assert!(run(&validator, json!("json")).is_empty());

        let diagnostics = run(&validator, json!("xml"));
        assert!(diagnostics.has_error());
        let detail = &diagnostics.iter().next().expect("one diagnostic").detail;
        assert_eq!(
            detail,
            r#"Attribute field value must be one of: ["text" "json"], got: "xml""#
        );
    }

    #[test]
    fn test_length_between() {
        let validator = Validator::LengthBetween { min: Some(1), max: Some(3) };
        assert!(run(&validator, json!("abc")).is_empty());
        assert!(run(&validator, json!("")).has_error());
        assert!(run(&validator, json!("abcd")).has_error());
    }

    #[test]
    fn test_regex_matches() {
        let regex = Regex::new("^[a-z]+$").expect("valid regex");
        let validator = Validator::RegexMatches(regex);
        assert!(run(&validator, json!("kiali")).is_empty());
        assert!(run(&validator, json!("Kiali")).has_error());
    }

    #[test]
    fn test_int64_between() {
        let validator = Validator::Int64Between { min: Some(1), max: Some(65535) };
        assert!(run(&validator, json!(8080)).is_empty());
        assert!(run(&validator, json!("8080")).is_empty());
        assert!(run(&validator, json!(0)).has_error());
        assert!(run(&validator, json!(70000)).has_error());
        // not a number: left to the type check
        assert!(run(&validator, json!("http")).is_empty());
    }

    #[test]
    fn test_float64_between() {
        let validator = Validator::Float64Between { min: Some(0.0), max: None };
        assert!(run(&validator, json!(0.5)).is_empty());
        assert!(run(&validator, json!(-0.5)).has_error());
    }

    #[test]
    fn test_size_between() {
        let validator = Validator::SizeBetween { min: None, max: Some(2) };
        assert!(run(&validator, json!(["a", "b"])).is_empty());
        assert!(run(&validator, json!(["a", "b", "c"])).has_error());
        assert!(run(&validator, json!({"a": "1", "b": "2", "c": "3"})).has_error());
    }

    #[test]
    fn test_description() {
        let validator = Validator::Int64Between { min: Some(0), max: None };
        assert_eq!(validator.description(), "value must be at least 0");

        let validator = Validator::SizeBetween { min: Some(1), max: Some(3) };
        assert_eq!(validator.description(), "must contain between 1 and 3 elements");
    }
}
