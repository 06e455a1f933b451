//! The error classes this crate raises, plus their exit-code mapping.

use std::fmt;
use std::process::ExitCode;

/// Fatal errors raised above the parser layer (parsers recover locally and
/// warn instead).
#[derive(Debug)]
pub enum SliceError {
    /// Missing target function, empty target list, unreadable input.
    InputError(String),
    /// Vertex double-add, meta-edge refers to an unknown kind — an
    /// implementation bug, not a user mistake.
    GraphInvariantBreach(String),
    /// A cycle of mixed kinds the slicer's policy table doesn't cover.
    UnresolvableCycle { message: String, path: Vec<String> },
}

impl fmt::Display for SliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceError::InputError(msg) => write!(f, "{msg}"),
            SliceError::GraphInvariantBreach(msg) => write!(f, "internal error: {msg}"),
            SliceError::UnresolvableCycle { message, path } => {
                write!(f, "unresolvable cycle: {message} ({})", path.join(" -> "))
            }
        }
    }
}

impl std::error::Error for SliceError {}

impl SliceError {
    /// 2 for user/argument errors, 1 for everything else that reaches
    /// main.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            SliceError::InputError(_) => ExitCode::from(2),
            SliceError::GraphInvariantBreach(_) | SliceError::UnresolvableCycle { .. } => {
                ExitCode::from(1)
            }
        }
    }
}

/// Maps any top-level `anyhow::Error` to an exit code: a `SliceError`
/// carries its own mapping, anything else (I/O, etc.) is an internal
/// error.
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<SliceError>() {
        Some(e) => e.exit_code(),
        None => ExitCode::from(1),
    }
}
