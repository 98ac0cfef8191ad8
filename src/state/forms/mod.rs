//! Form domain layer
//!
//! A `FormState` owns the value, touched and error stores of one form and
//! exposes the handlers input components call.

mod field;
mod form_state;

pub use field::{Event, InputKind, InputTarget, SubmitEvent};
pub use form_state::{
    ErrorMap, FormBuilder, FormContext, FormState, SubmitOutcome, TouchedMap,
};
