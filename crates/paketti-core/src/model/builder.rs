//! Programmatic front-end for building projects.
//!
//! Nodes are created with [`NodeId::UNASSIGNED`]. [`ProjectBuilder::build`]
//! gives every node a unique id and binds member references that were left
//! unresolved (`SymbolRef::declaration == None`) to declarations in the same
//! project:
//!
//! - `SymbolRef::member("Type", "Name")` binds to member `Name` of type `Type`;
//! - `SymbolRef::local("Name")` binds to a sibling member of the enclosing
//!   type, falling back to a top-level delegate.
//!
//! Types are never bound through a `SymbolRef`; type usage is carried by
//! resolved type symbols.

use std::collections::HashMap;

use super::solution::{Document, Project, Solution, SourceKind};
use super::syntax::{Body, CompilationUnit, MemberDecl, PropertyAccessors, UsingDirective};
use super::{DocumentId, NodeId, ProjectId};

/// Builds a [`Project`] from hand-assembled compilation units.
#[derive(Debug, Clone)]
pub struct ProjectBuilder {
    id: ProjectId,
    name: String,
    assembly_name: String,
    documents: Vec<(String, SourceKind, CompilationUnit)>,
}

impl ProjectBuilder {
    pub fn new(name: impl Into<String>, assembly_name: impl Into<String>) -> Self {
        ProjectBuilder {
            id: ProjectId(1),
            name: name.into(),
            assembly_name: assembly_name.into(),
            documents: Vec::new(),
        }
    }

    pub fn id(mut self, id: ProjectId) -> Self {
        self.id = id;
        self
    }

    pub fn document(self, name: impl Into<String>, root: CompilationUnit) -> Self {
        self.document_of_kind(name, SourceKind::Regular, root)
    }

    pub fn document_of_kind(
        mut self,
        name: impl Into<String>,
        kind: SourceKind,
        root: CompilationUnit,
    ) -> Self {
        self.documents.push((name.into(), kind, root));
        self
    }

    /// Assign node ids starting at 1 and bind local references.
    pub fn build(self) -> Project {
        let mut next = 1;
        self.build_from(&mut next)
    }

    /// Like [`build`](Self::build) but continues numbering from `next`.
    pub fn build_from(self, next: &mut u32) -> Project {
        let mut documents = Vec::with_capacity(self.documents.len());
        for (index, (name, kind, mut root)) in self.documents.into_iter().enumerate() {
            assign_unit_ids(&mut root, next);
            documents.push(Document {
                id: DocumentId(index as u32 + 1),
                path: Some(name.clone()),
                name,
                kind,
                root,
            });
        }

        let index = DeclarationIndex::collect(&documents);
        for document in &mut documents {
            for member in &mut document.root.members {
                bind_member(member, None, &index);
            }
        }

        Project {
            id: self.id,
            name: self.name,
            assembly_name: self.assembly_name,
            documents,
        }
    }
}

/// Builds a multi-project [`Solution`] with ids unique across projects.
#[derive(Debug, Clone, Default)]
pub struct SolutionBuilder {
    projects: Vec<ProjectBuilder>,
}

impl SolutionBuilder {
    pub fn new() -> Self {
        SolutionBuilder::default()
    }

    pub fn project(mut self, project: ProjectBuilder) -> Self {
        self.projects.push(project);
        self
    }

    pub fn build(self) -> Solution {
        let mut next = 1;
        let projects = self
            .projects
            .into_iter()
            .enumerate()
            .map(|(i, p)| p.id(ProjectId(i as u32 + 1)).build_from(&mut next))
            .collect();
        Solution::new(projects)
    }
}

// ============================================================================
// Id assignment
// ============================================================================

fn fresh(id: &mut NodeId, next: &mut u32) {
    if !id.is_assigned() {
        *id = NodeId(*next);
        *next += 1;
    }
}

fn assign_using_ids(usings: &mut [UsingDirective], next: &mut u32) {
    for using in usings {
        fresh(&mut using.id, next);
    }
}

fn assign_unit_ids(unit: &mut CompilationUnit, next: &mut u32) {
    assign_using_ids(&mut unit.usings, next);
    for member in &mut unit.members {
        assign_member_ids(member, next);
    }
}

fn assign_member_ids(member: &mut MemberDecl, next: &mut u32) {
    match member {
        MemberDecl::Namespace(ns) => {
            fresh(&mut ns.id, next);
            assign_using_ids(&mut ns.usings, next);
            for inner in &mut ns.members {
                assign_member_ids(inner, next);
            }
        }
        MemberDecl::Type(ty) => {
            fresh(&mut ty.id, next);
            for inner in &mut ty.members {
                assign_member_ids(inner, next);
            }
        }
        MemberDecl::Delegate(d) => fresh(&mut d.id, next),
        MemberDecl::Method(d) => fresh(&mut d.id, next),
        MemberDecl::Property(d) => fresh(&mut d.id, next),
        MemberDecl::Constructor(d) => fresh(&mut d.id, next),
        MemberDecl::Field(d) => fresh(&mut d.id, next),
    }
}

// ============================================================================
// Reference binding
// ============================================================================

/// (containing type name, member name) -> declaring node, first one wins.
#[derive(Default)]
struct DeclarationIndex {
    members: HashMap<(Option<String>, String), NodeId>,
}

impl DeclarationIndex {
    fn collect(documents: &[Document]) -> Self {
        let mut index = DeclarationIndex::default();
        for document in documents {
            for member in &document.root.members {
                index.visit(member, None);
            }
        }
        index
    }

    fn insert(&mut self, container: Option<&str>, name: &str, id: NodeId) {
        self.members
            .entry((container.map(str::to_string), name.to_string()))
            .or_insert(id);
    }

    fn visit(&mut self, member: &MemberDecl, container: Option<&str>) {
        match member {
            MemberDecl::Namespace(ns) => {
                for inner in &ns.members {
                    self.visit(inner, None);
                }
            }
            MemberDecl::Type(ty) => {
                for inner in &ty.members {
                    self.visit(inner, Some(&ty.name));
                }
            }
            MemberDecl::Delegate(d) => self.insert(container, &d.name, d.id),
            MemberDecl::Method(d) => self.insert(container, &d.name, d.id),
            MemberDecl::Property(d) => self.insert(container, &d.name, d.id),
            MemberDecl::Constructor(d) => self.insert(container, &d.name, d.id),
            MemberDecl::Field(d) => {
                for name in d.names() {
                    self.insert(container, name, d.id);
                }
            }
        }
    }

    fn resolve(&self, container: Option<&str>, enclosing: Option<&str>, name: &str) -> Option<NodeId> {
        let lookup = |c: Option<&str>| {
            self.members
                .get(&(c.map(str::to_string), name.to_string()))
                .copied()
        };
        match container {
            Some(c) => lookup(Some(c)),
            None => enclosing.and_then(|e| lookup(Some(e))).or_else(|| lookup(None)),
        }
    }
}

fn bind_body(body: &mut Body, enclosing: Option<&str>, index: &DeclarationIndex) {
    for expression in &mut body.expressions {
        if let Some(symbol) = &mut expression.symbol {
            if symbol.declaration.is_none() {
                symbol.declaration =
                    index.resolve(symbol.container.as_deref(), enclosing, &symbol.name);
            }
        }
    }
}

fn bind_member(member: &mut MemberDecl, enclosing: Option<&str>, index: &DeclarationIndex) {
    match member {
        MemberDecl::Namespace(ns) => {
            for inner in &mut ns.members {
                bind_member(inner, None, index);
            }
        }
        MemberDecl::Type(ty) => {
            let name = ty.name.clone();
            for inner in &mut ty.members {
                bind_member(inner, Some(&name), index);
            }
        }
        MemberDecl::Delegate(_) => {}
        MemberDecl::Method(m) => {
            if let Some(body) = &mut m.body {
                bind_body(body, enclosing, index);
            }
        }
        MemberDecl::Constructor(c) => {
            if let Some(body) = &mut c.body {
                bind_body(body, enclosing, index);
            }
        }
        MemberDecl::Property(p) => match &mut p.accessors {
            PropertyAccessors::Auto { .. } => {}
            PropertyAccessors::Arrow { body } => bind_body(body, enclosing, index),
            PropertyAccessors::Explicit { getter, setter } => {
                for body in getter.iter_mut().chain(setter.iter_mut()) {
                    bind_body(body, enclosing, index);
                }
            }
        },
        MemberDecl::Field(f) => {
            for variable in &mut f.variables {
                if let Some(init) = &mut variable.initializer {
                    bind_body(init, enclosing, index);
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
