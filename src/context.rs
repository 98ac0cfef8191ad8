//! Scoped context lookup
//!
//! A `Scope` belongs to a component subtree. Values provided on a scope are
//! visible to that scope and its descendants, never to siblings.

use crate::state::{FormContext, FormState};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

struct ScopeInner {
    parent: Option<Rc<ScopeInner>>,
    slots: RefCell<HashMap<TypeId, Rc<dyn Any>>>,
}

/// Handle to a node in the scope tree
#[derive(Clone)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

impl Scope {
    /// A scope with no parent
    pub fn root() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                parent: None,
                slots: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// A nested scope that can see everything this one provides
    pub fn child(&self) -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                parent: Some(Rc::clone(&self.inner)),
                slots: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Store `value` on this scope, replacing any earlier value of type `T`
    pub fn provide<T: 'static>(&self, value: Rc<T>) {
        self.inner
            .slots
            .borrow_mut()
            .insert(TypeId::of::<T>(), value as Rc<dyn Any>);
    }

    /// Nearest value of type `T` on this scope or an ancestor
    pub fn lookup<T: 'static>(&self) -> Option<Rc<T>> {
        let mut node = Some(&self.inner);
        while let Some(scope) = node {
            let found = scope.slots.borrow().get(&TypeId::of::<T>()).cloned();
            if let Some(value) = found {
                return value.downcast::<T>().ok();
            }
            node = scope.parent.as_ref();
        }
        None
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("slots", &self.inner.slots.borrow().len())
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}

/// Make `form` available to `scope` and its descendants
pub fn set_form_context(scope: &Scope, form: FormContext) {
    tracing::debug!("Providing form {} to scope", form.id());
    scope.provide(form);
}

/// The form provided on `scope` or its nearest ancestor
pub fn get_form_context(scope: &Scope) -> Option<FormContext> {
    scope.lookup::<FormState>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FormBuilder, Value};

    fn form() -> FormContext {
        FormBuilder::new(Value::object()).build().unwrap()
    }

    #[test]
    fn test_empty_scope_has_no_form() {
        assert!(get_form_context(&Scope::root()).is_none());
    }

    #[test]
    fn test_descendants_see_provided_form() {
        let root = Scope::root();
        let form = form();
        set_form_context(&root, Rc::clone(&form));

        let grandchild = root.child().child();
        let found = get_form_context(&grandchild).unwrap();
        assert!(Rc::ptr_eq(&found, &form));
    }

    #[test]
    fn test_siblings_do_not_share() {
        let root = Scope::root();
        let left = root.child();
        let right = root.child();
        set_form_context(&left, form());

        assert!(get_form_context(&left).is_some());
        assert!(get_form_context(&right).is_none());
        assert!(get_form_context(&root).is_none());
    }

    #[test]
    fn test_nearest_form_wins() {
        let root = Scope::root();
        let outer = form();
        let inner = form();
        set_form_context(&root, Rc::clone(&outer));
        let nested = root.child();
        set_form_context(&nested, Rc::clone(&inner));

        assert_eq!(get_form_context(&nested).unwrap().id(), inner.id());
        assert_eq!(get_form_context(&root).unwrap().id(), outer.id());
    }

    #[test]
    fn test_other_types_share_the_scope() {
        let root = Scope::root();
        root.provide(Rc::new(42u32));
        set_form_context(&root, form());

        assert_eq!(root.child().lookup::<u32>().as_deref(), Some(&42));
        assert!(root.lookup::<String>().is_none());
    }

    #[test]
    fn test_dropping_scopes_releases_form() {
        let root = Scope::root();
        let form = form();
        set_form_context(&root, Rc::clone(&form));
        assert_eq!(Rc::strong_count(&form), 2);
        drop(root);
        assert_eq!(Rc::strong_count(&form), 1);
    }
}
