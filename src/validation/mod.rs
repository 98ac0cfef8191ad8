//! Schema validation adapter
//!
//! A `SchemaValidator` reports failures as data (`ValidationOutcome`); any
//! other problem comes back as a `SchemaError`. The functions here fold an
//! outcome into the form's error map.

mod rules;

pub use rules::{Rule, Rules};

use crate::state::path::normalize_error_path;
use crate::state::{ErrorMap, Value, Writable};
use thiserror::Error;

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of running a validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(Vec<FieldError>),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }
}

/// Options for whole-tree validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidateOptions {
    /// Stop at the first failure instead of collecting all of them
    pub abort_early: bool,
}

/// A failure that is not a validation result
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("no rules declared for path `{0}`")]
    UnknownPath(String),
    #[error("validator failed: {0}")]
    Other(String),
}

/// External validator the form delegates to
#[cfg_attr(test, mockall::automock)]
pub trait SchemaValidator {
    /// Validate a single path of `values`
    fn validate_at(&self, path: &str, values: &Value) -> Result<ValidationOutcome, SchemaError>;

    /// Validate the whole value tree
    fn validate(
        &self,
        values: &Value,
        options: ValidateOptions,
    ) -> Result<ValidationOutcome, SchemaError>;
}

/// Index field errors by normalized path; the first message per path wins
pub fn collect_errors(errors: &[FieldError]) -> ErrorMap {
    let mut map = ErrorMap::new();
    for error in errors {
        map.entry(normalize_error_path(&error.path).to_string())
            .or_insert_with(|| error.message.clone());
    }
    map
}

fn report_unexpected(error: &SchemaError) {
    if cfg!(debug_assertions) {
        tracing::warn!("Unhandled error caught during validation: {error}");
    }
}

/// Validate one field and update only that field's entry in `errors`
pub fn validate_field(
    validator: &dyn SchemaValidator,
    name: &str,
    values: &Value,
    errors: &Writable<ErrorMap>,
) -> Option<ValidationOutcome> {
    let key = normalize_error_path(name).to_string();
    let outcome = match validator.validate_at(name, values) {
        Ok(outcome) => outcome,
        Err(e) => {
            report_unexpected(&e);
            return None;
        }
    };

    match &outcome {
        ValidationOutcome::Valid => {
            errors.update(|current| {
                let mut next = current.clone();
                next.remove(&key);
                next
            });
        }
        ValidationOutcome::Invalid(field_errors) => {
            let collected = collect_errors(field_errors);
            let message = collected
                .get(&key)
                .cloned()
                .or_else(|| field_errors.first().map(|e| e.message.clone()));
            match message {
                Some(message) => errors.update(|current| {
                    let mut next = current.clone();
                    next.insert(key.clone(), message);
                    next
                }),
                None => tracing::debug!("Validator reported `{name}` invalid without a message"),
            }
        }
    }

    Some(outcome)
}

/// Validate the whole tree, collecting every error, and rebuild `errors`
pub fn validate_form(
    validator: &dyn SchemaValidator,
    values: &Value,
    errors: &Writable<ErrorMap>,
) -> Option<ValidationOutcome> {
    let outcome = match validator.validate(values, ValidateOptions { abort_early: false }) {
        Ok(outcome) => outcome,
        Err(e) => {
            report_unexpected(&e);
            return None;
        }
    };

    match &outcome {
        ValidationOutcome::Valid => errors.set(ErrorMap::new()),
        ValidationOutcome::Invalid(field_errors) if field_errors.is_empty() => {
            tracing::debug!("Validator reported the form invalid without field errors")
        }
        ValidationOutcome::Invalid(field_errors) => errors.set(collect_errors(field_errors)),
    }

    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn errors_of(pairs: &[(&str, &str)]) -> ErrorMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn values() -> Value {
        Value::from(json!({"a": "", "b": {"c": ""}}))
    }

    #[test]
    fn test_collect_errors_first_wins() {
        let map = collect_errors(&[
            FieldError::new("a", "first"),
            FieldError::new("b.c", "nested"),
            FieldError::new("a", "second"),
        ]);
        assert_eq!(map, errors_of(&[("a", "first"), ("b.c", "nested")]));
    }

    #[test]
    fn test_collect_errors_strips_index_suffix() {
        let map = collect_errors(&[
            FieldError::new("items[1]", "bad item"),
            FieldError::new("items[3]", "another bad item"),
        ]);
        assert_eq!(map, errors_of(&[("items", "bad item")]));
    }

    #[test]
    fn test_validate_form_collects_all_errors() {
        let mut validator = MockSchemaValidator::new();
        validator
            .expect_validate()
            .withf(|_, options| !options.abort_early)
            .times(1)
            .returning(|_, _| {
                Ok(ValidationOutcome::Invalid(vec![
                    FieldError::new("a", "a is required"),
                    FieldError::new("b.c", "c is required"),
                    FieldError::new("a", "a is too short"),
                ]))
            });
        let errors = Writable::new(ErrorMap::new());

        let outcome = validate_form(&validator, &values(), &errors);

        assert!(matches!(outcome, Some(ValidationOutcome::Invalid(_))));
        assert_eq!(
            errors.get(),
            errors_of(&[("a", "a is required"), ("b.c", "c is required")])
        );
    }

    #[test]
    fn test_validate_form_success_clears_errors() {
        let mut validator = MockSchemaValidator::new();
        validator
            .expect_validate()
            .returning(|_, _| Ok(ValidationOutcome::Valid));
        let errors = Writable::new(errors_of(&[("a", "stale")]));

        validate_form(&validator, &values(), &errors);

        assert!(errors.get().is_empty());
    }

    #[test]
    fn test_validate_form_unexpected_error_keeps_map() {
        let mut validator = MockSchemaValidator::new();
        validator
            .expect_validate()
            .returning(|_, _| Err(SchemaError::Other("boom".to_string())));
        let errors = Writable::new(errors_of(&[("a", "kept")]));

        let outcome = validate_form(&validator, &values(), &errors);

        assert!(outcome.is_none());
        assert_eq!(errors.get(), errors_of(&[("a", "kept")]));
    }

    #[test]
    fn test_validate_form_invalid_without_field_errors_keeps_map() {
        let mut validator = MockSchemaValidator::new();
        validator
            .expect_validate()
            .returning(|_, _| Ok(ValidationOutcome::Invalid(vec![])));
        let errors = Writable::new(errors_of(&[("a", "stale")]));

        let outcome = validate_form(&validator, &values(), &errors);

        assert_eq!(outcome, Some(ValidationOutcome::Invalid(vec![])));
        assert_eq!(errors.get(), errors_of(&[("a", "stale")]));
    }

    #[test]
    fn test_validate_field_success_clears_only_that_field() {
        let mut validator = MockSchemaValidator::new();
        validator
            .expect_validate_at()
            .withf(|path, _| path == "a")
            .returning(|_, _| Ok(ValidationOutcome::Valid));
        let errors = Writable::new(errors_of(&[("a", "old"), ("b.c", "other")]));

        validate_field(&validator, "a", &values(), &errors);

        assert_eq!(errors.get(), errors_of(&[("b.c", "other")]));
    }

    #[test]
    fn test_validate_field_failure_sets_only_that_field() {
        let mut validator = MockSchemaValidator::new();
        validator.expect_validate_at().returning(|path, _| {
            Ok(ValidationOutcome::Invalid(vec![FieldError::new(
                path,
                "c is required",
            )]))
        });
        let errors = Writable::new(errors_of(&[("a", "untouched")]));

        validate_field(&validator, "b.c", &values(), &errors);

        assert_eq!(
            errors.get(),
            errors_of(&[("a", "untouched"), ("b.c", "c is required")])
        );
    }

    #[test]
    fn test_validate_field_indexed_name_uses_normalized_key() {
        let mut validator = MockSchemaValidator::new();
        validator.expect_validate_at().returning(|_, _| {
            Ok(ValidationOutcome::Invalid(vec![FieldError::new(
                "items[1]",
                "bad item",
            )]))
        });
        let errors = Writable::new(ErrorMap::new());

        validate_field(&validator, "items[1]", &values(), &errors);

        assert_eq!(errors.get(), errors_of(&[("items", "bad item")]));
    }

    #[test]
    fn test_validate_field_unexpected_error_keeps_map() {
        let mut validator = MockSchemaValidator::new();
        validator
            .expect_validate_at()
            .returning(|path, _| Err(SchemaError::UnknownPath(path.to_string())));
        let errors = Writable::new(errors_of(&[("a", "kept")]));

        let outcome = validate_field(&validator, "zzz", &values(), &errors);

        assert!(outcome.is_none());
        assert_eq!(errors.get(), errors_of(&[("a", "kept")]));
    }
}
