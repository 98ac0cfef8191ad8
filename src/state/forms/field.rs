//! Input targets and the events the form handlers consume

use std::cell::Cell;

/// Kind of control that produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    #[default]
    Text,
    TextArea,
    Checkbox,
    Radio,
    Select,
}

/// The control an event was dispatched on
#[derive(Debug, Clone, Default)]
pub struct InputTarget {
    pub name: String,
    pub id: String,
    pub value: String,
    pub checked: bool,
    pub kind: InputKind,
}

impl InputTarget {
    /// Create a text input target
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            ..Default::default()
        }
    }

    /// Create a checkbox target
    pub fn checkbox(name: &str, checked: bool) -> Self {
        Self {
            name: name.to_string(),
            checked,
            kind: InputKind::Checkbox,
            ..Default::default()
        }
    }

    /// Create a target with a specific kind and value
    pub fn with_kind(name: &str, kind: InputKind, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            kind,
            ..Default::default()
        }
    }

    /// Set the element id (used as field name when `name` is empty)
    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// Field path this control is bound to: `name`, falling back to `id`
    pub fn field(&self) -> Option<&str> {
        if !self.name.is_empty() {
            Some(&self.name)
        } else if !self.id.is_empty() {
            Some(&self.id)
        } else {
            None
        }
    }

    pub fn is_checkbox(&self) -> bool {
        self.kind == InputKind::Checkbox
    }
}

/// An input, blur or change event
#[derive(Debug, Clone, Default)]
pub struct Event {
    pub target: InputTarget,
}

impl Event {
    pub fn new(target: InputTarget) -> Self {
        Self { target }
    }
}

impl From<InputTarget> for Event {
    fn from(target: InputTarget) -> Self {
        Self::new(target)
    }
}

/// A form submission event
#[derive(Debug, Default)]
pub struct SubmitEvent {
    /// Name of the button that triggered the submission, if any
    pub submitter: Option<String>,
    default_prevented: Cell<bool>,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}
