//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.
//!
//! Run with: cargo test -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Core Infrastructure Types
// ============================================================================

// model module - the immutable source model
use paketti::model::{
    Body, BodyKind, CompilationUnit, ConstructorDecl, DelegateDecl, Document, DocumentId,
    Expression, FieldDecl, MemberDecl, MethodDecl, NamespaceDecl, NodeId, Parameter, Project,
    ProjectBuilder, ProjectId, PropertyAccessors, PropertyDecl, Solution, SolutionBuilder,
    SourceKind, SymbolRef, Trivia, TriviaKind, TypeDecl, TypeKind, TypeSymbol, TypeSymbolKind,
    TypeSyntax, UsingDirective, VariableDeclarator,
};

// error module - error types and codes
use paketti::error::{OutputErrorCode, PakettiError, PakettiResult};

// output module - JSON output types
use paketti::output::{
    emit_response, BuildResponse, BuildSummary, CheckResponse, ErrorInfo, ErrorResponse,
    ExtensionsResponse, PackageInfo, SCHEMA_VERSION,
};

// config module
use paketti::config::{
    CompilerConfig, CompilerMode, Config, FormatConfig, InterweaveConfig, CONFIG_FILE_NAME,
};

// compile, diagnostics and format modules - the compiler oracle and services
use paketti::compile::{CompileFailure, Compiler, StructuralCompiler};
use paketti::diagnostics::{
    project_diagnostics, used_namespaces, Diagnostic, DiagnosticProvider, Severity,
    UsingAnalyzer, DUPLICATE_USING, UNNECESSARY_USING,
};
use paketti::format::{Formatter, SourceFormatter};

// sandbox module - external compiler command
use paketti::sandbox::{CommandCompiler, CommandOutcome, SandboxConfig, DIR_PLACEHOLDER};

// workspace module
use paketti::workspace::{
    save_solution, validate_solution_path, AdhocWorkspace, FileWorkspace, Workspace,
    SOLUTION_EXTENSION,
};

// ============================================================================
// Engine Types
// ============================================================================

use paketti::context::{DeclInfo, Declaration, DocumentContext, ProjectContext};
use paketti::interweave::InterweavePolicy;
use paketti::type_ref::{open_type_name, TypeRef};
use paketti::walker::{DependencySet, DependencyWalker, Visited};

use paketti::selector::{ContentSelector, Selected};
use paketti::rewriters::{
    remove_declarations, DocumentRewriter, EnsurePartial, ExtractInterwovenExtensionMethods,
    ExtractInterwovenTypeMembers, ExtractMemberContainers, Extracted, RemoveRegions,
    RemoveUnusedUsings,
};
use paketti::transaction::SolutionRewriter;

use paketti::library::{
    ContainerDetails, InterweaveDescriptions, Library, Package, PackageKind, CONTENT_SEPARATOR,
};
use paketti::analyzer::ProjectAnalyzer;
use paketti::builder::{
    AfterRewrites, BuildServices, LibraryBuild, ProjectToLibraryBuilder, SolutionToLibraryBuilder,
};

// ============================================================================
// Front Door
// ============================================================================

use paketti::cli::{load_config, make_compiler, run_build, run_check, run_extensions};

#[test]
fn api_surface_compiles() {
    // Fails to build, not to run, when a public re-export goes missing.
    let _ = std::any::type_name::<Solution>();
    let _ = std::any::type_name::<PakettiError>();
    let _ = std::any::type_name::<TypeRef>();
    let _ = std::any::type_name::<Library>();
    let _ = std::any::type_name::<Package>();
    let _ = std::any::type_name::<FileWorkspace>();
}

#[test]
fn schema_version_is_stable() {
    assert_eq!(SCHEMA_VERSION, "1");
}
