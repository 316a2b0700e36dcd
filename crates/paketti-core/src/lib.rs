//! Core infrastructure for paketti.
//!
//! This crate provides the language-agnostic pieces the engine builds on:
//! - Source model: solutions, projects, documents, syntax trees and symbols
//! - Diagnostics, including the using-directive analyzer
//! - Compiler oracle (structural check and sandboxed external command)
//! - Formatting service
//! - Workspaces with atomic commit
//! - Error types, configuration and JSON output types

pub mod compile;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod model;
pub mod output;
pub mod sandbox;
pub mod workspace;
