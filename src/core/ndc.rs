//! Nested diagnostic context of the calling thread
//!
//! Tags pushed here appear, outermost first, on every record emitted from
//! this thread until they are popped.
//!
//! ```
//! use rust_diagnostic_logger::ndc;
//!
//! {
//!     let _tag = ndc::push("NDC_Message");
//!     assert_eq!(ndc::peek_all(), vec!["NDC_Message"]);
//! }
//! assert!(ndc::peek_all().is_empty());
//! ```

use super::diagnostic_context::DiagnosticContext;
use std::marker::PhantomData;

/// RAII guard returned by [`push`]
///
/// Dropping it restores the stack to the depth it had before the push,
/// including on early return and panic unwinding. A guard dropped while a
/// different context is attached leaves that context alone.
#[must_use = "the tag is popped as soon as the guard is dropped"]
pub struct NdcGuard {
    /// Owning context id and the depth to restore
    scope: Option<(u64, usize)>,
    _not_send: PhantomData<*const ()>,
}

impl NdcGuard {
    /// Stack depth the guard restores on drop
    pub fn restore_depth(&self) -> Option<usize> {
        self.scope.map(|(_, depth)| depth)
    }
}

impl Drop for NdcGuard {
    fn drop(&mut self) {
        if let Some((owner, depth)) = self.scope {
            DiagnosticContext::with_current(|ctx| {
                if ctx.id() == owner {
                    ctx.stack_mut().truncate(depth);
                }
            });
        }
    }
}

/// Push a tag, popped when the returned guard drops
pub fn push(tag: impl Into<String>) -> NdcGuard {
    let tag = tag.into();
    let scope = DiagnosticContext::with_current(|ctx| {
        let depth = ctx.stack().depth();
        ctx.stack_mut().push(tag);
        (ctx.id(), depth)
    });
    NdcGuard {
        scope,
        _not_send: PhantomData,
    }
}

/// Push a tag without a guard; pair with [`pop`]
pub fn push_tag(tag: impl Into<String>) {
    let tag = tag.into();
    DiagnosticContext::with_current(|ctx| ctx.stack_mut().push(tag));
}

/// Pop the innermost tag; `None` on an empty stack
pub fn pop() -> Option<String> {
    DiagnosticContext::with_current(|ctx| ctx.stack_mut().pop()).flatten()
}

pub fn peek() -> Option<String> {
    DiagnosticContext::with_current(|ctx| ctx.stack().peek().map(String::from)).flatten()
}

/// Snapshot of the stack, outermost first
pub fn peek_all() -> Vec<String> {
    DiagnosticContext::with_current(|ctx| ctx.stack().peek_all()).unwrap_or_default()
}

pub fn depth() -> usize {
    DiagnosticContext::with_current(|ctx| ctx.stack().depth()).unwrap_or(0)
}

/// Remove every tag
pub fn clear() {
    DiagnosticContext::with_current(|ctx| ctx.stack_mut().clear());
}

/// Limit how many tags are copied into records (`None` = unlimited)
pub fn set_max_depth(max_depth: Option<usize>) {
    DiagnosticContext::with_current(|ctx| ctx.stack_mut().set_max_depth(max_depth));
}
