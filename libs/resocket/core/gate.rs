//! Callback gate
//!
//! Every user callback runs inside [`CallbackGate::run`]. `close` takes the
//! same lock, so once it returns no callback is running on another thread and
//! none will start. The lock is reentrant: a callback may call `close` or
//! `send` on its own manager.

use parking_lot::ReentrantMutex;
use std::cell::Cell;

pub(crate) struct CallbackGate {
    closed: ReentrantMutex<Cell<bool>>,
}

impl CallbackGate {
    pub(crate) fn new() -> Self {
        Self {
            closed: ReentrantMutex::new(Cell::new(false)),
        }
    }

    /// Close the gate. Returns `true` for the call that actually closed it.
    pub(crate) fn close(&self) -> bool {
        let guard = self.closed.lock();
        !guard.replace(true)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.lock().get()
    }

    /// Run `f` while the gate is open, holding it open for the duration
    pub(crate) fn run<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let guard = self.closed.lock();
        if guard.get() {
            return None;
        }
        Some(f())
    }
}
