//! Paketti: extract interwoven declarations into merge-deduplicated packages.
//!
//! Paketti strips a solution of every declaration that depends on types from
//! outside the trusted base runtime, grouping what it removes into packages
//! keyed by those foreign dependencies, and finally packs whatever remains of
//! each class and struct as a member container.

// Core infrastructure - re-exported from paketti-core
pub use paketti_core::compile;
pub use paketti_core::config;
pub use paketti_core::diagnostics;
pub use paketti_core::error;
pub use paketti_core::format;
pub use paketti_core::model;
pub use paketti_core::output;
pub use paketti_core::sandbox;
pub use paketti_core::workspace;

// Engine - re-exported from paketti-engine
pub use paketti_engine::{
    analyzer, builder, context, interweave, library, rewriters, selector, transaction, type_ref,
    walker,
};

// Front door
pub mod cli;
