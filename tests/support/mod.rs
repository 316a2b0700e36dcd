//! Shared test support utilities.
//!
//! This module provides solution fixtures built through the programmatic
//! front-end, plus workspace doubles for failure paths.

pub mod fixtures;
pub mod workspaces;
