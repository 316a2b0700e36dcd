//! Compiler diagnostics and the using-directive analyzer.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{
    Body, CompilationUnit, Document, DocumentId, MemberDecl, NodeId, Project, TypeSymbol,
    UsingDirective,
};

/// `using` directive appeared previously in this namespace.
pub const DUPLICATE_USING: &str = "CS0105";
/// Unnecessary `using` directive.
pub const UNNECESSARY_USING: &str = "CS8019";
/// The name does not exist in the current context.
pub const UNRESOLVED_REFERENCE: &str = "CS0103";
/// The type or namespace name could not be found.
pub const MISSING_TYPE: &str = "CS0246";
/// The namespace already contains a definition for the type.
pub const DUPLICATE_TYPE: &str = "CS0101";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Hidden,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    pub document: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeId>,
}

impl Diagnostic {
    pub fn error(id: &str, document: &str, message: impl Into<String>) -> Self {
        Diagnostic {
            id: id.to_string(),
            severity: Severity::Error,
            message: message.into(),
            document: document.to_string(),
            node: None,
        }
    }

    pub fn at(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Hidden => "hidden",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {} {}: {}", self.document, severity, self.id, self.message)
    }
}

/// Source of per-document diagnostics.
pub trait DiagnosticProvider {
    fn diagnostics(&self, project: &Project, document: &Document) -> Vec<Diagnostic>;
}

// ============================================================================
// Using analyzer
// ============================================================================

/// Reports duplicate (`CS0105`) and unnecessary (`CS8019`) using directives.
///
/// A namespace import is necessary when some type or member referenced in the
/// document lives in that namespace. Alias and static imports are only ever
/// reported as duplicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsingAnalyzer;

impl DiagnosticProvider for UsingAnalyzer {
    fn diagnostics(&self, _project: &Project, document: &Document) -> Vec<Diagnostic> {
        let used = used_namespaces(&document.root);
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        check_scope(&document.root.usings, &mut seen, &used, &document.name, &mut out);
        for member in &document.root.members {
            check_namespaces(member, &seen, &used, &document.name, &mut out);
        }
        out
    }
}

type UsingKey = (String, Option<String>, bool);

fn using_key(using: &UsingDirective) -> UsingKey {
    (using.name.clone(), using.alias.clone(), using.is_static)
}

fn check_scope(
    usings: &[UsingDirective],
    seen: &mut HashSet<UsingKey>,
    used: &HashSet<String>,
    document: &str,
    out: &mut Vec<Diagnostic>,
) {
    for using in usings {
        if !seen.insert(using_key(using)) {
            out.push(hidden(
                DUPLICATE_USING,
                document,
                format!("The using directive for '{}' appeared previously", using.name),
                using.id,
            ));
        } else if using.alias.is_none() && !using.is_static && !used.contains(&using.name) {
            out.push(hidden(
                UNNECESSARY_USING,
                document,
                "Unnecessary using directive.".to_string(),
                using.id,
            ));
        }
    }
}

fn check_namespaces(
    member: &MemberDecl,
    outer: &HashSet<UsingKey>,
    used: &HashSet<String>,
    document: &str,
    out: &mut Vec<Diagnostic>,
) {
    if let MemberDecl::Namespace(ns) = member {
        let mut scope = outer.clone();
        check_scope(&ns.usings, &mut scope, used, document, out);
        for inner in &ns.members {
            check_namespaces(inner, &scope, used, document, out);
        }
    }
}

fn hidden(id: &str, document: &str, message: String, node: NodeId) -> Diagnostic {
    Diagnostic {
        id: id.to_string(),
        severity: Severity::Hidden,
        message,
        document: document.to_string(),
        node: Some(node),
    }
}

/// Every namespace a type symbol or member reference in `unit` lives in.
pub fn used_namespaces(unit: &CompilationUnit) -> HashSet<String> {
    let mut used = HashSet::new();
    for member in &unit.members {
        collect_member(member, &mut used);
    }
    used
}

fn collect_symbol(symbol: &TypeSymbol, used: &mut HashSet<String>) {
    if let Some(ns) = &symbol.namespace {
        used.insert(ns.clone());
    }
    for arg in &symbol.type_arguments {
        collect_symbol(arg, used);
    }
}

fn collect_body(body: &Body, used: &mut HashSet<String>) {
    for expression in &body.expressions {
        if let Some(ty) = expression.type_of() {
            collect_symbol(ty, used);
        }
        if let Some(ns) = expression.symbol.as_ref().and_then(|s| s.namespace.as_ref()) {
            used.insert(ns.clone());
        }
    }
}

fn collect_member(member: &MemberDecl, used: &mut HashSet<String>) {
    match member {
        MemberDecl::Namespace(ns) => {
            for inner in &ns.members {
                collect_member(inner, used);
            }
        }
        MemberDecl::Type(ty) => {
            for base in &ty.base_list {
                collect_symbol(&base.symbol, used);
            }
            for inner in &ty.members {
                collect_member(inner, used);
            }
        }
        MemberDecl::Delegate(d) => {
            collect_symbol(&d.return_type.symbol, used);
            for p in &d.parameters {
                collect_symbol(&p.ty.symbol, used);
            }
        }
        MemberDecl::Method(m) => {
            collect_symbol(&m.return_type.symbol, used);
            for p in &m.parameters {
                collect_symbol(&p.ty.symbol, used);
            }
            if let Some(body) = &m.body {
                collect_body(body, used);
            }
        }
        MemberDecl::Property(p) => {
            collect_symbol(&p.ty.symbol, used);
            for body in p.bodies() {
                collect_body(body, used);
            }
        }
        MemberDecl::Constructor(c) => {
            for p in &c.parameters {
                collect_symbol(&p.ty.symbol, used);
            }
            if let Some(body) = &c.body {
                collect_body(body, used);
            }
        }
        MemberDecl::Field(f) => {
            collect_symbol(&f.ty.symbol, used);
            for v in &f.variables {
                if let Some(init) = &v.initializer {
                    collect_body(init, used);
                }
            }
        }
    }
}

/// Diagnostics for every document of a project, keyed by document.
pub fn project_diagnostics(
    provider: &dyn DiagnosticProvider,
    project: &Project,
) -> Vec<(DocumentId, Diagnostic)> {
    project
        .documents
        .iter()
        .flat_map(|d| {
            provider
                .diagnostics(project, d)
                .into_iter()
                .map(move |diag| (d.id, diag))
        })
        .collect()
}
