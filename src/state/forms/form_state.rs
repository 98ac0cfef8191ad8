//! Form state bundle and its event handlers

use super::field::{Event, SubmitEvent};
use crate::config::FormConfig;
use crate::debounce::Debounced;
use crate::error::FormError;
use crate::state::path::{leaf_paths, lookup, normalize_error_path, set_in};
use crate::state::store::{Readable, Writable};
use crate::state::value::Value;
use crate::validation::{self, SchemaValidator, ValidationOutcome};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::rc::Rc;
use uuid::Uuid;

/// Field path -> error message
pub type ErrorMap = BTreeMap<String, String>;

/// Field path -> touched flag
pub type TouchedMap = BTreeMap<String, bool>;

/// Shared handle to a form; clone it to hand it to child components
pub type FormContext = Rc<FormState>;

type SubmitCallback = Box<dyn Fn(&Value)>;

/// What `handle_submit` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Values were valid and the submit callback ran
    Submitted,
    /// Validation produced errors
    Invalid,
    /// The validator failed unexpectedly; errors were left as they were
    Failed,
    /// A submission was already in progress
    Skipped,
}

/// Builder for a `FormState`
pub struct FormBuilder {
    initial_values: Value,
    config: FormConfig,
    validator: Option<Rc<dyn SchemaValidator>>,
    on_submit: Option<SubmitCallback>,
}

impl FormBuilder {
    pub fn new(initial_values: Value) -> Self {
        Self {
            initial_values,
            config: FormConfig::default(),
            validator: None,
            on_submit: None,
        }
    }

    /// Start from any serializable struct
    pub fn from_serialize<T: Serialize>(initial_values: &T) -> Result<Self, FormError> {
        Ok(Self::new(Value::from(serde_json::to_value(initial_values)?)))
    }

    pub fn config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }

    pub fn validator(mut self, validator: impl SchemaValidator + 'static) -> Self {
        self.validator = Some(Rc::new(validator));
        self
    }

    pub fn on_submit(mut self, callback: impl Fn(&Value) + 'static) -> Self {
        self.on_submit = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> Result<FormContext, FormError> {
        if !matches!(self.initial_values, Value::Object(_)) {
            return Err(FormError::InvalidInitialValues(
                self.initial_values.to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let values = Writable::new(self.initial_values.clone());
        let touched = Writable::new(TouchedMap::new());
        let errors = Writable::new(ErrorMap::new());

        let initial = self.initial_values.clone();
        let is_dirty = Readable::derived(&values, move |current| *current != initial);
        let is_valid = Readable::derived(&errors, |errors: &ErrorMap| errors.is_empty());

        let is_validating = Writable::new(false);
        let mut input_debounce = self.config.input_debounce();
        if input_debounce.is_some() && tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!("Form {id}: no tokio runtime, input validation will not be debounced");
            input_debounce = None;
        }
        let input_validation = match (&self.validator, input_debounce) {
            (Some(validator), Some(delay)) => {
                let validator = Rc::clone(validator);
                let values = values.clone();
                let errors = errors.clone();
                let is_validating = is_validating.clone();
                Some(Debounced::new(
                    move |field: String| {
                        is_validating.set(true);
                        validation::validate_field(
                            validator.as_ref(),
                            &field,
                            &values.get(),
                            &errors,
                        );
                        is_validating.set(false);
                    },
                    delay,
                ))
            }
            _ => None,
        };

        tracing::debug!("Created form {id}");

        Ok(Rc::new(FormState {
            id,
            config: self.config,
            initial_values: self.initial_values,
            values,
            touched,
            errors,
            submit_count: Writable::new(0),
            is_submitting: Writable::new(false),
            is_validating,
            is_dirty,
            is_valid,
            validator: self.validator,
            on_submit: self.on_submit,
            input_validation,
        }))
    }
}

/// Values, touched flags and errors of one form, plus the handlers that drive them
pub struct FormState {
    id: Uuid,
    config: FormConfig,
    initial_values: Value,
    values: Writable<Value>,
    touched: Writable<TouchedMap>,
    errors: Writable<ErrorMap>,
    submit_count: Writable<u32>,
    is_submitting: Writable<bool>,
    is_validating: Writable<bool>,
    is_dirty: Readable<bool>,
    is_valid: Readable<bool>,
    validator: Option<Rc<dyn SchemaValidator>>,
    on_submit: Option<SubmitCallback>,
    input_validation: Option<Debounced<String>>,
}

impl std::fmt::Debug for FormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormState")
            .field("id", &self.id)
            .field("values", &self.values)
            .field("touched", &self.touched)
            .field("errors", &self.errors)
            .field("submit_count", &self.submit_count)
            .finish_non_exhaustive()
    }
}

impl FormState {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn initial_values(&self) -> &Value {
        &self.initial_values
    }

    pub fn values(&self) -> &Writable<Value> {
        &self.values
    }

    pub fn touched(&self) -> &Writable<TouchedMap> {
        &self.touched
    }

    pub fn errors(&self) -> &Writable<ErrorMap> {
        &self.errors
    }

    pub fn is_dirty(&self) -> &Readable<bool> {
        &self.is_dirty
    }

    pub fn is_valid(&self) -> &Readable<bool> {
        &self.is_valid
    }

    pub fn submit_count(&self) -> Readable<u32> {
        self.submit_count.readonly()
    }

    pub fn is_submitting(&self) -> Readable<bool> {
        self.is_submitting.readonly()
    }

    pub fn is_validating(&self) -> Readable<bool> {
        self.is_validating.readonly()
    }

    /// Current value at `path`
    pub fn field_value(&self, path: &str) -> Option<Value> {
        self.values.with(|values| lookup(values, path).cloned())
    }

    pub fn field_error(&self, path: &str) -> Option<String> {
        self.errors
            .with(|errors| errors.get(normalize_error_path(path)).cloned())
    }

    pub fn is_touched(&self, path: &str) -> bool {
        self.touched
            .with(|touched| touched.get(path).copied().unwrap_or(false))
    }

    /// Deserialize the current values into `T`
    pub fn values_as<T: DeserializeOwned>(&self) -> Result<T, FormError> {
        let json = serde_json::Value::from(self.values.get());
        Ok(serde_json::from_value(json)?)
    }

    pub fn set_field_value(&self, path: &str, value: impl Into<Value>) {
        let value = value.into();
        self.values.update(|values| set_in(values, path, value));
    }

    pub fn set_field_touched(&self, path: &str, touched: bool) {
        self.touched.update(|current| {
            let mut next = current.clone();
            next.insert(path.to_string(), touched);
            next
        });
    }

    /// Set or clear (`None`) the error shown for `path`
    pub fn set_field_error(&self, path: &str, message: Option<String>) {
        let key = normalize_error_path(path).to_string();
        self.errors.update(|current| {
            let mut next = current.clone();
            match message {
                Some(message) => {
                    next.insert(key, message);
                }
                None => {
                    next.remove(&key);
                }
            }
            next
        });
    }

    /// Validate one field now, bypassing any debounce
    pub fn validate_field(&self, path: &str) -> Option<ValidationOutcome> {
        let validator = self.validator.as_ref()?;
        self.is_validating.set(true);
        let outcome =
            validation::validate_field(validator.as_ref(), path, &self.values.get(), &self.errors);
        self.is_validating.set(false);
        outcome
    }

    /// Validate the whole value tree and rebuild the error map
    pub fn validate(&self) -> Option<ValidationOutcome> {
        let validator = self.validator.as_ref()?;
        self.is_validating.set(true);
        let outcome = validation::validate_form(validator.as_ref(), &self.values.get(), &self.errors);
        self.is_validating.set(false);
        outcome
    }

    fn validate_input(&self, path: &str) {
        match &self.input_validation {
            Some(debounced) => debounced.call(path.to_string()),
            None => {
                self.validate_field(path);
            }
        }
    }

    /// Text input: store the string value
    pub fn handle_input(&self, event: &Event) {
        let Some(field) = event.target.field() else {
            tracing::debug!("Form {}: input event without a field name", self.id);
            return;
        };
        tracing::debug!("Form {}: input on `{field}`", self.id);
        self.set_field_value(field, event.target.value.as_str());
        if self.config.validate_on_input() {
            self.validate_input(field);
        }
    }

    /// Focus left a control: mark it touched
    pub fn handle_blur(&self, event: &Event) {
        let Some(field) = event.target.field() else {
            tracing::debug!("Form {}: blur event without a field name", self.id);
            return;
        };
        tracing::debug!("Form {}: blur on `{field}`", self.id);
        self.set_field_touched(field, true);
        if self.config.validate_on_blur() {
            self.validate_field(field);
        }
    }

    /// Checkbox toggled: store the checked flag
    pub fn handle_checked(&self, event: &Event) {
        let Some(field) = event.target.field() else {
            tracing::debug!("Form {}: checked event without a field name", self.id);
            return;
        };
        tracing::debug!("Form {}: checked on `{field}`", self.id);
        self.set_field_value(field, event.target.checked);
        if self.config.validate_on_change() {
            self.validate_field(field);
        }
    }

    /// Committed change: checked flag for checkboxes, value otherwise
    pub fn handle_change(&self, event: &Event) {
        let Some(field) = event.target.field() else {
            tracing::debug!("Form {}: change event without a field name", self.id);
            return;
        };
        tracing::debug!("Form {}: change on `{field}`", self.id);
        if event.target.is_checkbox() {
            self.set_field_value(field, event.target.checked);
        } else {
            self.set_field_value(field, event.target.value.as_str());
        }
        if self.config.validate_on_change() {
            self.validate_field(field);
        }
    }

    /// Count the attempt, touch every field, validate, and submit when clean
    pub fn handle_submit(&self, event: &SubmitEvent) -> SubmitOutcome {
        event.prevent_default();
        if self.is_submitting.get() {
            tracing::debug!("Form {}: submit ignored, already submitting", self.id);
            return SubmitOutcome::Skipped;
        }

        self.submit_count.update(|count| count + 1);
        self.is_submitting.set(true);
        if let Some(debounced) = &self.input_validation {
            debounced.cancel();
        }

        let values = self.values.get();
        self.touched.update(|current| {
            let mut next = current.clone();
            for path in leaf_paths(&values) {
                next.insert(path, true);
            }
            next
        });

        let outcome = match self.validator {
            Some(_) => match self.validate() {
                Some(ValidationOutcome::Valid) => SubmitOutcome::Submitted,
                Some(ValidationOutcome::Invalid(_)) => SubmitOutcome::Invalid,
                None => SubmitOutcome::Failed,
            },
            None => SubmitOutcome::Submitted,
        };

        if outcome == SubmitOutcome::Submitted {
            tracing::info!("Form {}: submitting", self.id);
            if let Some(callback) = &self.on_submit {
                callback(&values);
            }
        } else {
            tracing::debug!("Form {}: submit blocked ({outcome:?})", self.id);
        }

        self.is_submitting.set(false);
        outcome
    }

    /// Restore initial values and clear touched flags and errors
    pub fn reset(&self) {
        if let Some(debounced) = &self.input_validation {
            debounced.cancel();
        }
        self.values.set(self.initial_values.clone());
        self.touched.set(TouchedMap::new());
        self.errors.set(ErrorMap::new());
        tracing::debug!("Form {}: reset", self.id);
    }
}
