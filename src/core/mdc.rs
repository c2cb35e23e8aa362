//! Mapped diagnostic context of the calling thread
//!
//! ```
//! use rust_diagnostic_logger::mdc;
//!
//! mdc::set("auth", "auth-none");
//! assert_eq!(mdc::get("auth").as_deref(), Some("auth-none"));
//!
//! {
//!     let _scoped = mdc::scoped("auth", "bearer");
//!     assert_eq!(mdc::get("auth").as_deref(), Some("bearer"));
//! }
//! assert_eq!(mdc::get("auth").as_deref(), Some("auth-none"));
//! ```

use super::diagnostic_context::DiagnosticContext;
use std::collections::HashMap;
use std::marker::PhantomData;

/// RAII guard for a scoped MDC entry
///
/// When dropped, puts back the value the key had before the guard was
/// created, or removes the key if it had none. Nothing happens if the
/// context it was created in is no longer attached.
#[must_use = "the entry is reverted as soon as the guard is dropped"]
pub struct MdcGuard {
    key: String,
    previous: Option<String>,
    owner: Option<u64>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for MdcGuard {
    fn drop(&mut self) {
        let Some(owner) = self.owner else {
            return;
        };
        let previous = self.previous.take();
        DiagnosticContext::with_current(|ctx| {
            if ctx.id() != owner {
                return;
            }
            match previous {
                Some(value) => {
                    ctx.map_mut().set(self.key.as_str(), value);
                }
                None => {
                    ctx.map_mut().remove(&self.key);
                }
            }
        });
    }
}

/// Set a key, overwriting any existing value
pub fn set(key: impl Into<String>, value: impl Into<String>) {
    let (key, value) = (key.into(), value.into());
    DiagnosticContext::with_current(|ctx| ctx.map_mut().set(key, value));
}

pub fn get(key: &str) -> Option<String> {
    DiagnosticContext::with_current(|ctx| ctx.map().get(key).map(String::from)).flatten()
}

/// Remove a key; absent keys are ignored
pub fn remove(key: &str) -> Option<String> {
    DiagnosticContext::with_current(|ctx| ctx.map_mut().remove(key)).flatten()
}

/// Copy of the map, independent of later mutation
pub fn snapshot() -> HashMap<String, String> {
    DiagnosticContext::with_current(|ctx| ctx.map().snapshot()).unwrap_or_default()
}

pub fn clear() {
    DiagnosticContext::with_current(|ctx| ctx.map_mut().clear());
}

/// Set a key for the lifetime of the returned guard
pub fn scoped(key: impl Into<String>, value: impl Into<String>) -> MdcGuard {
    let (key, value) = (key.into(), value.into());
    let entry = DiagnosticContext::with_current(|ctx| {
        (ctx.id(), ctx.map_mut().set(key.as_str(), value))
    });
    let (owner, previous) = match entry {
        Some((owner, previous)) => (Some(owner), previous),
        None => (None, None),
    };
    MdcGuard {
        key,
        previous,
        owner,
        _not_send: PhantomData,
    }
}
