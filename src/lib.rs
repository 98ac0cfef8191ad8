//! form-state - form state management
//!
//! Tracks field values, touched flags, dirtiness, submit counts and
//! validation errors for one form, exposes them as observable stores, and
//! delegates validation to a pluggable `SchemaValidator`.
//!
//! ```
//! use form_state::{Event, FormBuilder, InputTarget, Rule, Rules, SubmitEvent, SubmitOutcome};
//!
//! let form = FormBuilder::new(serde_json::json!({"email": ""}).into())
//!     .validator(Rules::new().rule("email", Rule::Email, "Email is invalid"))
//!     .build()
//!     .unwrap();
//!
//! form.handle_input(&Event::new(InputTarget::text("email", "ada@example.com")));
//! assert!(form.is_dirty().get());
//! assert_eq!(form.handle_submit(&SubmitEvent::new()), SubmitOutcome::Submitted);
//! ```

pub mod config;
pub mod context;
pub mod debounce;
pub mod error;
pub mod state;
pub mod validation;

pub use config::FormConfig;
pub use context::{get_form_context, set_form_context, Scope};
pub use debounce::Debounced;
pub use error::FormError;
pub use state::path::{delete_in, get_in, lookup, set_in, FieldPath};
pub use state::{
    ErrorMap, Event, FormBuilder, FormContext, FormState, InputKind, InputTarget, Readable,
    SubmitEvent, SubmitOutcome, Subscription, TouchedMap, Value, Writable,
};
pub use validation::{
    FieldError, Rule, Rules, SchemaError, SchemaValidator, ValidateOptions, ValidationOutcome,
};
