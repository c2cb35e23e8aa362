//! Per-thread diagnostic context
//!
//! This module provides:
//! - `DiagnosticContext`: one NDC stack plus one MDC map, owned by value
//! - `AttachGuard`: RAII guard that installs a context on the current thread
//!
//! Every thread has exactly one attached context, created empty on first use
//! and dropped with the thread. The only way to reach it is
//! [`DiagnosticContext::with_current`], which the [`ndc`](super::ndc) and
//! [`mdc`](super::mdc) facades and the logger's snapshot step go through.
//!
//! Contexts do not follow work onto other threads by themselves. To carry one
//! across, [`fork`](DiagnosticContext::fork) it on the source thread and
//! [`attach`](DiagnosticContext::attach) it on the destination:
//!
//! ```
//! use rust_diagnostic_logger::{mdc, DiagnosticContext};
//!
//! mdc::set("request_id", "abc-123");
//! let ctx = DiagnosticContext::fork();
//!
//! std::thread::spawn(move || {
//!     let _attached = ctx.attach();
//!     assert_eq!(mdc::get("request_id").as_deref(), Some("abc-123"));
//! })
//! .join()
//! .unwrap();
//! ```

use super::context_map::ContextMap;
use super::context_stack::ContextStack;
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

thread_local! {
    static CURRENT: RefCell<DiagnosticContext> = RefCell::new(DiagnosticContext::new());
}

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_context_id() -> u64 {
    NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// One NDC stack plus one MDC map
///
/// Every instance carries an identity. Clones get a fresh one, so a fork is
/// never mistaken for the context it was copied from.
#[derive(Debug)]
pub struct DiagnosticContext {
    id: u64,
    stack: ContextStack,
    map: ContextMap,
}

impl Default for DiagnosticContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DiagnosticContext {
    fn clone(&self) -> Self {
        Self {
            id: next_context_id(),
            stack: self.stack.clone(),
            map: self.map.clone(),
        }
    }
}

impl DiagnosticContext {
    pub fn new() -> Self {
        Self {
            id: next_context_id(),
            stack: ContextStack::new(),
            map: ContextMap::new(),
        }
    }

    /// Identity used by scope guards to find the context they modified
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub fn stack(&self) -> &ContextStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut ContextStack {
        &mut self.stack
    }

    pub fn map(&self) -> &ContextMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut ContextMap {
        &mut self.map
    }

    /// Run `f` against the calling thread's attached context
    ///
    /// Returns `None` when the context cannot be reached: during thread
    /// teardown, or when called re-entrantly from inside another
    /// `with_current` closure.
    pub fn with_current<R>(f: impl FnOnce(&mut DiagnosticContext) -> R) -> Option<R> {
        CURRENT
            .try_with(|cell| cell.try_borrow_mut().ok().map(|mut ctx| f(&mut ctx)))
            .ok()
            .flatten()
    }

    /// Copy of the calling thread's context
    pub fn fork() -> DiagnosticContext {
        Self::with_current(|ctx| ctx.clone()).unwrap_or_default()
    }

    /// Detach the calling thread's context, leaving an empty one in its place
    pub fn take_current() -> DiagnosticContext {
        Self::with_current(std::mem::take).unwrap_or_default()
    }

    /// Install this context on the calling thread
    ///
    /// The previously attached context is restored when the guard drops.
    #[must_use = "the context is detached again when the guard is dropped"]
    pub fn attach(self) -> AttachGuard {
        let previous = Self::with_current(move |ctx| std::mem::replace(ctx, self));
        AttachGuard {
            previous,
            _not_send: PhantomData,
        }
    }

    /// Stack and map snapshots for a log record
    pub(crate) fn snapshot_current() -> (Vec<String>, HashMap<String, String>) {
        Self::with_current(|ctx| (ctx.stack.peek_all(), ctx.map.snapshot())).unwrap_or_default()
    }
}

/// RAII guard returned by [`DiagnosticContext::attach`]
///
/// Bound to the thread it was created on.
pub struct AttachGuard {
    previous: Option<DiagnosticContext>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for AttachGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            DiagnosticContext::with_current(|ctx| *ctx = previous);
        }
    }
}
