//! Observable cells
//!
//! `Writable` holds a value and a subscriber list. Subscribers run
//! synchronously after each change, with no borrow held, so a subscriber may
//! write back into the store it is watching.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    value: T,
    subscribers: Vec<(u64, Callback<T>)>,
    next_id: u64,
}

/// A readable and writable observable value
pub struct Writable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Writable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Writable")
            .field(&self.inner.borrow().value)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Writable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Snapshot of the current value
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Run `f` against the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value, notifying subscribers if it changed
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
        }
        self.notify();
    }

    /// Derive the next value from the current one
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let current = self.get();
        let next = f(&current);
        self.set(next);
    }

    /// Register `callback`; it runs immediately with the current value
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Callback<T> = Rc::new(callback);
        let (id, current) = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Rc::clone(&callback)));
            (id, inner.value.clone())
        };
        callback(&current);

        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().subscribers.retain(|(sid, _)| *sid != id);
                }
            })),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Read-only view over this store
    pub fn readonly(&self) -> Readable<T> {
        Readable {
            cell: self.clone(),
            _source: None,
        }
    }

    fn notify(&self) {
        let (value, subscribers) = {
            let inner = self.inner.borrow();
            let subscribers: Vec<Callback<T>> =
                inner.subscribers.iter().map(|(_, cb)| Rc::clone(cb)).collect();
            (inner.value.clone(), subscribers)
        };
        for callback in subscribers {
            callback(&value);
        }
    }
}

/// A read-only observable value
pub struct Readable<T> {
    cell: Writable<T>,
    _source: Option<Rc<Subscription>>,
}

impl<T> Clone for Readable<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            _source: self._source.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Readable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Readable")
            .field(&self.cell.inner.borrow().value)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Readable<T> {
    /// A store whose value is `map` applied to `source`, kept in sync
    pub fn derived<S>(source: &Writable<S>, map: impl Fn(&S) -> T + 'static) -> Self
    where
        S: Clone + PartialEq + 'static,
    {
        let cell = Writable::new(source.with(&map));
        let target = cell.clone();
        let subscription = source.subscribe(move |value| target.set(map(value)));
        Self {
            cell,
            _source: Some(Rc::new(subscription)),
        }
    }

    pub fn get(&self) -> T {
        self.cell.get()
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.cell.subscribe(callback)
    }
}

/// Handle returned by `subscribe`; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unsubscribe now
    pub fn cancel(mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}
