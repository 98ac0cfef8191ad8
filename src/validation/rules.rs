//! Declarative per-field rules implementing `SchemaValidator`

use super::{FieldError, SchemaError, SchemaValidator, ValidateOptions, ValidationOutcome};
use crate::state::path::lookup;
use crate::state::Value;

/// A single check applied to the value at a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Present and not an empty string
    Required,
    /// At least this many characters (or items)
    MinLen(usize),
    /// At most this many characters (or items)
    MaxLen(usize),
    /// Looks like `local@domain.tld`; empty strings pass
    Email,
    /// Boolean `true`
    Checked,
}

impl Rule {
    fn passes(&self, value: Option<&Value>) -> bool {
        match self {
            Rule::Required => match value {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
            },
            Rule::MinLen(min) => length(value).is_none_or(|len| len >= *min),
            Rule::MaxLen(max) => length(value).is_none_or(|len| len <= *max),
            Rule::Email => match value.and_then(Value::as_str) {
                Some(s) if !s.is_empty() => looks_like_email(s),
                _ => true,
            },
            Rule::Checked => value.and_then(Value::as_bool) == Some(true),
        }
    }
}

fn length(value: Option<&Value>) -> Option<usize> {
    match value? {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

#[derive(Debug, Clone)]
struct FieldRules {
    path: String,
    checks: Vec<(Rule, String)>,
}

/// Ordered set of field rules
#[derive(Debug, Clone, Default)]
pub struct Rules {
    fields: Vec<FieldRules>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule for `path`; rules run in insertion order
    pub fn rule(mut self, path: &str, rule: Rule, message: &str) -> Self {
        let entry = match self.fields.iter().position(|f| f.path == path) {
            Some(i) => &mut self.fields[i],
            None => {
                self.fields.push(FieldRules {
                    path: path.to_string(),
                    checks: Vec::new(),
                });
                let last = self.fields.len() - 1;
                &mut self.fields[last]
            }
        };
        entry.checks.push((rule, message.to_string()));
        self
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.path.as_str())
    }

    fn check(field: &FieldRules, values: &Value, abort_early: bool, out: &mut Vec<FieldError>) {
        let value = lookup(values, &field.path);
        for (rule, message) in &field.checks {
            if !rule.passes(value) {
                out.push(FieldError::new(field.path.clone(), message.clone()));
                if abort_early {
                    return;
                }
            }
        }
    }
}

fn outcome(errors: Vec<FieldError>) -> ValidationOutcome {
    if errors.is_empty() {
        ValidationOutcome::Valid
    } else {
        ValidationOutcome::Invalid(errors)
    }
}

impl SchemaValidator for Rules {
    fn validate_at(&self, path: &str, values: &Value) -> Result<ValidationOutcome, SchemaError> {
        let field = self
            .fields
            .iter()
            .find(|f| f.path == path)
            .ok_or_else(|| SchemaError::UnknownPath(path.to_string()))?;
        let mut errors = Vec::new();
        Self::check(field, values, true, &mut errors);
        Ok(outcome(errors))
    }

    fn validate(
        &self,
        values: &Value,
        options: ValidateOptions,
    ) -> Result<ValidationOutcome, SchemaError> {
        let mut errors = Vec::new();
        for field in &self.fields {
            Self::check(field, values, options.abort_early, &mut errors);
            if options.abort_early && !errors.is_empty() {
                break;
            }
        }
        Ok(outcome(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn signup_rules() -> Rules {
        Rules::new()
            .rule("email", Rule::Required, "Email is required")
            .rule("email", Rule::Email, "Email is invalid")
            .rule("password", Rule::Required, "Password is required")
            .rule("password", Rule::MinLen(8), "Password is too short")
            .rule("terms", Rule::Checked, "You must accept the terms")
    }

    #[test]
    fn test_required_rejects_blank() {
        assert!(!Rule::Required.passes(None));
        assert!(!Rule::Required.passes(Some(&Value::from("  "))));
        assert!(Rule::Required.passes(Some(&Value::from("x"))));
        assert!(Rule::Required.passes(Some(&Value::from(false))));
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("ada@example.com"));
        assert!(!looks_like_email("ada@example"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("a@b@c.com"));
        assert!(Rule::Email.passes(Some(&Value::from(""))));
    }

    #[test]
    fn test_length_rules() {
        assert!(Rule::MinLen(3).passes(Some(&Value::from("abc"))));
        assert!(!Rule::MinLen(3).passes(Some(&Value::from("ab"))));
        assert!(!Rule::MaxLen(1).passes(Some(&Value::from(json!(["a", "b"])))));
        assert!(Rule::MaxLen(1).passes(None));
    }

    #[test]
    fn test_validate_collects_every_failure() {
        let values = Value::from(json!({"email": "", "password": "", "terms": false}));
        let outcome = signup_rules()
            .validate(&values, ValidateOptions { abort_early: false })
            .unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome::Invalid(vec![
                FieldError::new("email", "Email is required"),
                FieldError::new("password", "Password is required"),
                FieldError::new("password", "Password is too short"),
                FieldError::new("terms", "You must accept the terms"),
            ])
        );
    }

    #[test]
    fn test_validate_abort_early_stops_at_first() {
        let values = Value::from(json!({"email": "", "password": ""}));
        let outcome = signup_rules()
            .validate(&values, ValidateOptions { abort_early: true })
            .unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome::Invalid(vec![FieldError::new("email", "Email is required")])
        );
    }

    #[test]
    fn test_validate_at_reports_first_failing_rule() {
        let values = Value::from(json!({"password": "short"}));
        let outcome = signup_rules().validate_at("password", &values).unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome::Invalid(vec![FieldError::new("password", "Password is too short")])
        );
    }

    #[test]
    fn test_validate_at_unknown_path_is_schema_error() {
        let result = signup_rules().validate_at("nickname", &Value::object());
        assert!(matches!(result, Err(SchemaError::UnknownPath(p)) if p == "nickname"));
    }

    #[test]
    fn test_valid_values() {
        let values = Value::from(json!({
            "email": "ada@example.com",
            "password": "correct horse",
            "terms": true
        }));
        let outcome = signup_rules()
            .validate(&values, ValidateOptions::default())
            .unwrap();
        assert!(outcome.is_valid());
    }

    #[test]
    fn test_paths_in_declaration_order() {
        let rules = signup_rules();
        assert_eq!(rules.paths().collect::<Vec<_>>(), vec!["email", "password", "terms"]);
    }
}
