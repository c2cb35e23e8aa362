//! Failure chains attached to log records
//!
//! This module provides:
//! - `Failure`: an error value with an optional cause that remembers where it
//!   was constructed
//! - `FailureChain`: the captured, renderable sequence of an error and its
//!   causes, walked through `Error::source()`
//!
//! # Example
//!
//! ```
//! use rust_diagnostic_logger::{Failure, FailureChain};
//!
//! let inner = Failure::new("This is an Exception");
//! let outer = Failure::caused_by("Failed in Goo. Calling Foo", inner);
//!
//! let chain = FailureChain::capture(&outer);
//! let rendered = chain.render();
//! let lines: Vec<&str> = rendered.lines().collect();
//!
//! assert_eq!(lines.len(), 2);
//! assert!(lines[0].starts_with("Failed in Goo. Calling Foo"));
//! assert!(lines[1].starts_with("caused by: This is an Exception"));
//! ```

use super::log_record::sanitize_message;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{self, Write as _};
use std::panic::Location;

/// Default bound on captured frames
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Final line of a rendered chain that hit a cycle or the depth bound
pub const TRUNCATION_MARKER: &str = "... chain truncated";

/// Frame description used when an error's `Display` reports failure
pub const UNPRINTABLE_ERROR: &str = "<unprintable error>";

type BoxedCause = Box<dyn Error + Send + Sync + 'static>;

/// Error value with an explicit optional cause
///
/// The construction site is captured with `#[track_caller]` and shows up in
/// rendered chains.
#[derive(Debug)]
pub struct Failure {
    message: String,
    location: &'static Location<'static>,
    cause: Option<BoxedCause>,
}

impl Failure {
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: Location::caller(),
            cause: None,
        }
    }

    /// Wrap `cause` in a new failure
    #[track_caller]
    pub fn caused_by(message: impl Into<String>, cause: impl Into<BoxedCause>) -> Self {
        Self {
            message: message.into(),
            location: Location::caller(),
            cause: Some(cause.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for Failure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}

/// One element of a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureFrame {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl FailureFrame {
    fn from_error(err: &(dyn Error + 'static)) -> Self {
        let location = err
            .downcast_ref::<Failure>()
            .map(|failure| failure.location().to_string());
        let mut description = String::new();
        if write!(description, "{}", err).is_err() {
            description = UNPRINTABLE_ERROR.to_string();
        }
        Self {
            description: sanitize_message(&description),
            location,
        }
    }
}

impl fmt::Display for FailureFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(ref location) => write!(f, "{} (at {})", self.description, location),
            None => f.write_str(&self.description),
        }
    }
}

/// Captured failure and its causes, outermost first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureChain {
    frames: Vec<FailureFrame>,
    truncated: bool,
}

impl FailureChain {
    /// Capture with [`DEFAULT_MAX_DEPTH`]
    pub fn capture(failure: &(dyn Error + 'static)) -> Self {
        Self::capture_with_depth(failure, DEFAULT_MAX_DEPTH)
    }

    /// Walk `source()` links, keeping at most `max_depth` frames
    ///
    /// Stops early and marks the chain truncated when an error already in
    /// the chain shows up again. Detection compares references, so the depth
    /// bound remains the backstop for cycles it cannot see.
    pub fn capture_with_depth(failure: &(dyn Error + 'static), max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        let mut frames = Vec::new();
        let mut visited: Vec<*const (dyn Error + 'static)> = Vec::new();
        let mut truncated = false;
        let mut current = Some(failure);

        while let Some(err) = current {
            let ptr = err as *const (dyn Error + 'static);
            if visited.iter().any(|seen| std::ptr::eq(*seen, ptr)) {
                truncated = true;
                break;
            }
            if frames.len() == max_depth {
                truncated = true;
                break;
            }
            visited.push(ptr);
            frames.push(FailureFrame::from_error(err));
            current = err.source();
        }

        Self { frames, truncated }
    }

    pub fn frames(&self) -> &[FailureFrame] {
        &self.frames
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Fixed multi-line rendering, innermost cause last
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .frames
            .iter()
            .enumerate()
            .map(|(idx, frame)| {
                if idx == 0 {
                    frame.to_string()
                } else {
                    format!("caused by: {}", frame)
                }
            })
            .collect();

        if self.truncated {
            lines.push(TRUNCATION_MARKER.to_string());
        }

        lines.join("\n")
    }
}

impl fmt::Display for FailureChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
