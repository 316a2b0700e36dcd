//! JSON output types for CLI responses.
//!
//! Every response has `status` as its first field and carries
//! `schema_version` so consumers can detect format changes.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, PakettiError};

/// Current schema version for JSON output.
pub const SCHEMA_VERSION: &str = "1";

/// One package of a built library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub key: String,
    /// `extension_methods`, `interwoven_extension_methods`,
    /// `interwoven_type_members` or `member_container`.
    pub kind: String,
    /// Owning type for type-member packages, container name for containers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Interweave keys the package depends on, sorted.
    pub dependencies: Vec<String>,
    /// Using directives the package needs (member containers only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usings: Vec<String>,
    /// Declaration line (member containers only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration: Option<String>,
    pub content: String,
}

/// Package counts by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub projects: usize,
    pub packages: usize,
    pub interwoven_extension_methods: usize,
    pub interwoven_type_members: usize,
    pub member_containers: usize,
}

/// Response for the `build` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// Solution file the library was built from.
    pub solution: String,
    /// Content hash of the solution before any rewrite.
    pub snapshot_id: String,
    /// RFC 3339 timestamp.
    pub generated_at: String,
    pub summary: BuildSummary,
    pub packages: Vec<PackageInfo>,
    /// Where the stripped solution was written, if requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripped_solution: Option<String>,
}

impl BuildResponse {
    pub fn new(
        solution: impl Into<String>,
        snapshot_id: impl Into<String>,
        summary: BuildSummary,
        packages: Vec<PackageInfo>,
    ) -> Self {
        BuildResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            solution: solution.into(),
            snapshot_id: snapshot_id.into(),
            generated_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            summary,
            packages,
            stripped_solution: None,
        }
    }
}

/// Response for the `extensions` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionsResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub solution: String,
    pub packages: Vec<PackageInfo>,
}

impl ExtensionsResponse {
    pub fn new(solution: impl Into<String>, packages: Vec<PackageInfo>) -> Self {
        ExtensionsResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            solution: solution.into(),
            packages,
        }
    }
}

/// Response for the `check` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub solution: String,
    pub snapshot_id: String,
    pub projects: Vec<String>,
}

impl CheckResponse {
    pub fn new(
        solution: impl Into<String>,
        snapshot_id: impl Into<String>,
        projects: Vec<String>,
    ) -> Self {
        CheckResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            solution: solution.into(),
            snapshot_id: snapshot_id.into(),
            projects,
        }
    }
}

/// Error information for error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code (same as the exit code).
    pub code: u8,
    pub message: String,
}

impl ErrorInfo {
    pub fn from_error(err: &PakettiError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &PakettiError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
