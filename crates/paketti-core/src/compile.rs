//! Compiler oracle.
//!
//! The engine only ever asks one question: does this project still compile?
//! [`StructuralCompiler`] answers it from the source model alone;
//! [`crate::sandbox::CommandCompiler`] asks a real toolchain.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::diagnostics::{Diagnostic, DUPLICATE_TYPE, MISSING_TYPE, UNRESOLVED_REFERENCE};
use crate::model::{Body, MemberDecl, NodeId, Project, TypeSymbol, TypeSymbolKind};

/// Why a compile failed: the compiler's text plus any structured diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileFailure {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileFailure {
    /// One diagnostic per line.
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let text = diagnostics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        CompileFailure { text, diagnostics }
    }

    /// Raw tool output without structured diagnostics.
    pub fn from_output(text: impl Into<String>) -> Self {
        CompileFailure {
            text: text.into(),
            diagnostics: Vec::new(),
        }
    }
}

impl fmt::Display for CompileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::error::Error for CompileFailure {}

pub trait Compiler {
    fn compile(&self, project: &Project) -> Result<(), CompileFailure>;
}

// ============================================================================
// Structural compiler
// ============================================================================

/// Built-in oracle that checks the bound model for consistency.
///
/// Errors reported:
/// - `CS0103`: an expression is bound to a declaration that no longer exists;
/// - `CS0246`: a type from the project's own assembly is not declared;
/// - `CS0101`: a type is declared twice without being partial.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralCompiler;

/// (namespace, containing type path, name, arity)
type TypeKey = (String, String, String, usize);

#[derive(Default)]
struct ProjectFacts {
    declarations: HashSet<NodeId>,
    /// (namespace, name, arity) of every declared type, nested ones included.
    type_names: HashSet<(String, String, usize)>,
    /// Every declaration of a type: (document, is_partial).
    type_decls: HashMap<TypeKey, Vec<(String, bool)>>,
    /// (document, symbol name, target) for every bound member reference.
    references: Vec<(String, String, NodeId)>,
    /// (document, symbol) for every type used in the project.
    used_types: Vec<(String, TypeSymbol)>,
}

impl ProjectFacts {
    fn collect(project: &Project) -> Self {
        let mut facts = ProjectFacts::default();
        for document in &project.documents {
            for member in &document.root.members {
                facts.visit(member, &document.name, "", "");
            }
        }
        facts
    }

    fn visit(&mut self, member: &MemberDecl, document: &str, namespace: &str, container: &str) {
        self.declarations.insert(member.id());
        match member {
            MemberDecl::Namespace(ns) => {
                let inner = if namespace.is_empty() {
                    ns.name.clone()
                } else {
                    format!("{}.{}", namespace, ns.name)
                };
                for m in &ns.members {
                    self.visit(m, document, &inner, "");
                }
            }
            MemberDecl::Type(ty) => {
                self.type_names
                    .insert((namespace.to_string(), ty.name.clone(), ty.arity()));
                self.type_decls
                    .entry((
                        namespace.to_string(),
                        container.to_string(),
                        ty.name.clone(),
                        ty.arity(),
                    ))
                    .or_default()
                    .push((document.to_string(), ty.is_partial()));
                for base in &ty.base_list {
                    self.used(document, &base.symbol);
                }
                let path = if container.is_empty() {
                    ty.name.clone()
                } else {
                    format!("{}.{}", container, ty.name)
                };
                for m in &ty.members {
                    self.visit(m, document, namespace, &path);
                }
            }
            MemberDecl::Delegate(d) => {
                self.used(document, &d.return_type.symbol);
                for p in &d.parameters {
                    self.used(document, &p.ty.symbol);
                }
            }
            MemberDecl::Method(m) => {
                self.used(document, &m.return_type.symbol);
                for p in &m.parameters {
                    self.used(document, &p.ty.symbol);
                }
                if let Some(body) = &m.body {
                    self.body(document, body);
                }
            }
            MemberDecl::Property(p) => {
                self.used(document, &p.ty.symbol);
                for body in p.bodies() {
                    self.body(document, body);
                }
            }
            MemberDecl::Constructor(c) => {
                for p in &c.parameters {
                    self.used(document, &p.ty.symbol);
                }
                if let Some(body) = &c.body {
                    self.body(document, body);
                }
            }
            MemberDecl::Field(f) => {
                self.used(document, &f.ty.symbol);
                for v in &f.variables {
                    if let Some(init) = &v.initializer {
                        self.body(document, init);
                    }
                }
            }
        }
    }

    fn used(&mut self, document: &str, symbol: &TypeSymbol) {
        self.used_types.push((document.to_string(), symbol.clone()));
    }

    fn body(&mut self, document: &str, body: &Body) {
        for expression in &body.expressions {
            if let Some(ty) = expression.type_of() {
                self.used(document, ty);
            }
            if let Some(symbol) = &expression.symbol {
                if let Some(target) = symbol.declaration {
                    self.references
                        .push((document.to_string(), symbol.name.clone(), target));
                }
            }
        }
    }
}

fn local_named_types<'a>(symbol: &'a TypeSymbol, assembly: &str, out: &mut Vec<&'a TypeSymbol>) {
    if symbol.kind == TypeSymbolKind::Named && symbol.assembly.eq_ignore_ascii_case(assembly) {
        out.push(symbol);
    }
    for arg in &symbol.type_arguments {
        local_named_types(arg, assembly, out);
    }
}

impl Compiler for StructuralCompiler {
    fn compile(&self, project: &Project) -> Result<(), CompileFailure> {
        let facts = ProjectFacts::collect(project);
        let mut errors = Vec::new();

        for (document, name, target) in &facts.references {
            if !facts.declarations.contains(target) {
                errors.push(
                    Diagnostic::error(
                        UNRESOLVED_REFERENCE,
                        document,
                        format!("The name '{}' does not exist in the current context", name),
                    )
                    .at(*target),
                );
            }
        }

        let mut reported = HashSet::new();
        for (document, symbol) in &facts.used_types {
            let mut locals = Vec::new();
            local_named_types(symbol, &project.assembly_name, &mut locals);
            for local in locals {
                let key = (
                    local.namespace.clone().unwrap_or_default(),
                    local.name.clone(),
                    local.type_arguments.len(),
                );
                if !facts.type_names.contains(&key) && reported.insert((document.clone(), key)) {
                    errors.push(Diagnostic::error(
                        MISSING_TYPE,
                        document,
                        format!(
                            "The type or namespace name '{}' could not be found",
                            local.display_name()
                        ),
                    ));
                }
            }
        }

        let mut duplicates: Vec<_> = facts
            .type_decls
            .iter()
            .filter(|(_, decls)| decls.len() > 1 && decls.iter().any(|(_, partial)| !partial))
            .collect();
        duplicates.sort_by(|a, b| a.0.cmp(b.0));
        for ((namespace, _, name, _), decls) in duplicates {
            let scope = if namespace.is_empty() {
                "<global namespace>"
            } else {
                namespace.as_str()
            };
            errors.push(Diagnostic::error(
                DUPLICATE_TYPE,
                &decls[1].0,
                format!(
                    "The namespace '{}' already contains a definition for '{}'",
                    scope, name
                ),
            ));
        }

        if errors.is_empty() {
            debug!(project = %project.name, "structural compile succeeded");
            Ok(())
        } else {
            debug!(project = %project.name, errors = errors.len(), "structural compile failed");
            Err(CompileFailure::from_diagnostics(errors))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
