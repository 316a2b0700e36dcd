//! Error types and error code constants for paketti.
//!
//! Every fallible stage of a build run returns `Result<_, PakettiError>` and
//! chains with `?`, so a run either succeeds completely or surfaces exactly
//! one error: the first one that occurred.
//!
//! ## Error Code Mapping
//!
//! Exit codes:
//! - `2`: Invalid arguments (bad input from caller, unreadable config)
//! - `3`: Resolution errors (solution file missing or not a `.sln`)
//! - `4`: Commit errors (the workspace rejected the change set)
//! - `5`: Compile failures (precondition, rewrite or post-rewrite compile)
//! - `10`: Internal errors (invariant violations, I/O, serialization)

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// The solution could not be located.
    ResolutionError = 3,
    /// The workspace refused the final change set.
    CommitError = 4,
    /// The project did not compile before or after a rewrite.
    CompileFailed = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the engine and the CLI.
#[derive(Debug, Error)]
pub enum PakettiError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// The solution path does not carry the `.sln` extension.
    #[error("The specified solution file does not end with .sln: {path}")]
    InvalidSolutionPath { path: PathBuf },

    /// The solution file does not exist.
    #[error("Solution file {path} doesn't exist.")]
    SolutionNotFound { path: PathBuf },

    /// The project failed to compile before any rewrite ran.
    ///
    /// `diagnostics` is the compiler's text, verbatim.
    #[error("Project didn't compile before rewriting anything: {diagnostics}")]
    PreconditionFailed { project: String, diagnostics: String },

    /// A rewriter could not transform a document.
    #[error("rewriter '{rewriter}' failed on {document}: {message}")]
    RewriteFailed {
        rewriter: String,
        document: String,
        message: String,
    },

    /// The project stopped compiling after a rewrite.
    #[error("project '{project}' failed to compile after {stage}: {diagnostics}")]
    CompileFailed {
        project: String,
        stage: String,
        diagnostics: String,
    },

    /// The workspace rejected the final change set.
    #[error("Workspace.TryApplyChanges() failed: {reason}")]
    CommitRejected { reason: String },

    /// A structural invariant was violated (a defect, not a runtime condition).
    #[error("invariant violated: {message}")]
    Invariant { message: String },

    /// Configuration file could not be read or parsed.
    #[error("config error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&PakettiError> for OutputErrorCode {
    fn from(err: &PakettiError) -> Self {
        match err {
            PakettiError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            PakettiError::Config { .. } => OutputErrorCode::InvalidArguments,
            PakettiError::InvalidSolutionPath { .. } => OutputErrorCode::ResolutionError,
            PakettiError::SolutionNotFound { .. } => OutputErrorCode::ResolutionError,
            PakettiError::CommitRejected { .. } => OutputErrorCode::CommitError,
            PakettiError::PreconditionFailed { .. } => OutputErrorCode::CompileFailed,
            PakettiError::RewriteFailed { .. } => OutputErrorCode::CompileFailed,
            PakettiError::CompileFailed { .. } => OutputErrorCode::CompileFailed,
            PakettiError::Invariant { .. } => OutputErrorCode::InternalError,
            PakettiError::Io(_) => OutputErrorCode::InternalError,
            PakettiError::Json(_) => OutputErrorCode::InternalError,
            PakettiError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<PakettiError> for OutputErrorCode {
    fn from(err: PakettiError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl PakettiError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        PakettiError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create an invariant violation.
    pub fn invariant(message: impl Into<String>) -> Self {
        PakettiError::Invariant {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        PakettiError::Internal {
            message: message.into(),
        }
    }

    /// Create a commit rejection.
    pub fn commit_rejected(reason: impl Into<String>) -> Self {
        PakettiError::CommitRejected {
            reason: reason.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

/// Result alias used across the workspace.
pub type PakettiResult<T> = Result<T, PakettiError>;

// ============================================================================
// Tests
// ============================================================================
