//! Dependency analysis and extraction engine for paketti.
//!
//! This crate provides:
//! - Project and document contexts over an immutable snapshot
//! - Type references and interweave classification
//! - The cached, cycle-safe dependency walker
//! - Content selection, document rewriters and extraction passes
//! - The transactional solution rewriter
//! - Packages, the merge-deduplicating library and the library builders

pub mod analyzer;
pub mod builder;
pub mod context;
pub mod interweave;
pub mod library;
pub mod rewriters;
pub mod selector;
pub mod transaction;
pub mod type_ref;
pub mod walker;

pub use analyzer::ProjectAnalyzer;
pub use builder::{
    AfterRewrites, BuildServices, LibraryBuild, ProjectToLibraryBuilder, SolutionToLibraryBuilder,
};
pub use context::{DeclInfo, Declaration, DocumentContext, ProjectContext};
pub use interweave::InterweavePolicy;
pub use library::{ContainerDetails, InterweaveDescriptions, Library, Package, PackageKind};
pub use selector::{ContentSelector, Selected};
pub use transaction::SolutionRewriter;
pub use type_ref::TypeRef;
pub use walker::{DependencySet, DependencyWalker, Visited};
