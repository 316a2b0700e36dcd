//! Source model: solutions, projects, documents and their syntax trees.
//!
//! This is the boundary to the front-end that parses source text and binds
//! symbols. Everything here is an immutable value; a "mutation" is always a
//! new value built from the old one.

pub mod builder;
pub mod solution;
pub mod symbols;
pub mod syntax;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use builder::{ProjectBuilder, SolutionBuilder};
pub use solution::{Document, Project, Solution, SourceKind};
pub use symbols::{SymbolRef, TypeSymbol, TypeSymbolKind};
pub use syntax::{
    Body, BodyKind, CompilationUnit, ConstructorDecl, DelegateDecl, Expression, FieldDecl,
    MemberDecl, MethodDecl, NamespaceDecl, Parameter, PropertyAccessors, PropertyDecl, Trivia,
    TriviaKind, TypeDecl, TypeKind, TypeSyntax, UsingDirective, VariableDeclarator,
};

/// Stable identity of a syntax node.
///
/// Ids are unique within a solution. They are assigned by the front-end (or
/// [`ProjectBuilder`]) and never change while the node is kept by a rewrite.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Placeholder for nodes that have not been through a builder yet.
    pub const UNASSIGNED: NodeId = NodeId(0);

    pub fn is_assigned(&self) -> bool {
        *self != NodeId::UNASSIGNED
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a document inside a project.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DocumentId(pub u32);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc{}", self.0)
    }
}

/// Identity of a project inside a solution.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProjectId(pub u32);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proj{}", self.0)
    }
}
