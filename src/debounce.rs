//! Trailing-edge debounce on the tokio timer queue
//!
//! Timers run as local tasks so callbacks may hold `Rc` state. `call` must be
//! made from inside a `tokio::task::LocalSet`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Delay used by `Debounced::with_default_delay`
pub const DEFAULT_DELAY: Duration = Duration::from_millis(200);

/// Collapses bursts of calls into one trailing call with the last arguments
pub struct Debounced<A> {
    callback: Rc<dyn Fn(A)>,
    delay: Duration,
    pending: RefCell<Option<JoinHandle<()>>>,
}

impl<A: 'static> Debounced<A> {
    pub fn new(callback: impl Fn(A) + 'static, delay: Duration) -> Self {
        Self {
            callback: Rc::new(callback),
            delay,
            pending: RefCell::new(None),
        }
    }

    pub fn with_default_delay(callback: impl Fn(A) + 'static) -> Self {
        Self::new(callback, DEFAULT_DELAY)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the quiet period; `args` replace any pending arguments
    pub fn call(&self, args: A) {
        self.cancel();
        let callback = Rc::clone(&self.callback);
        let delay = self.delay;
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            callback(args);
        });
        *self.pending.borrow_mut() = Some(handle);
    }

    /// Drop the pending call, if any
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.borrow_mut().take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .borrow()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<A> Drop for Debounced<A> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}
