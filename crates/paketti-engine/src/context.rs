//! Read-only views over one project snapshot.
//!
//! A [`ProjectContext`] borrows a [`Project`] and indexes every declaration
//! by [`NodeId`]. It is tied to that exact snapshot: after any rewrite a new
//! context must be built from the new project, which the borrow checker
//! enforces since the old context borrows the old value.

use std::collections::HashMap;

use paketti_core::model::{
    ConstructorDecl, DelegateDecl, Document, DocumentId, FieldDecl, MemberDecl, MethodDecl,
    NodeId, Project, PropertyDecl, TypeDecl, TypeKind, UsingDirective,
};

use crate::type_ref::open_type_name;

/// One of the seven declaration kinds the engine reasons about.
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'p> {
    Class(&'p TypeDecl),
    Struct(&'p TypeDecl),
    Delegate(&'p DelegateDecl),
    Method(&'p MethodDecl),
    Property(&'p PropertyDecl),
    Constructor(&'p ConstructorDecl),
    Field(&'p FieldDecl),
}

impl<'p> Declaration<'p> {
    pub fn id(&self) -> NodeId {
        match self {
            Declaration::Class(d) | Declaration::Struct(d) => d.id,
            Declaration::Delegate(d) => d.id,
            Declaration::Method(d) => d.id,
            Declaration::Property(d) => d.id,
            Declaration::Constructor(d) => d.id,
            Declaration::Field(d) => d.id,
        }
    }

    pub fn name(&self) -> &'p str {
        match self {
            Declaration::Class(d) | Declaration::Struct(d) => &d.name,
            Declaration::Delegate(d) => &d.name,
            Declaration::Method(d) => &d.name,
            Declaration::Property(d) => &d.name,
            Declaration::Constructor(d) => &d.name,
            Declaration::Field(d) => d.names().next().unwrap_or_default(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Declaration::Class(_) => "class",
            Declaration::Struct(_) => "struct",
            Declaration::Delegate(_) => "delegate",
            Declaration::Method(_) => "method",
            Declaration::Property(_) => "property",
            Declaration::Constructor(_) => "constructor",
            Declaration::Field(_) => "field",
        }
    }

    /// Owned syntax for rendering.
    pub fn to_member(&self) -> MemberDecl {
        match self {
            Declaration::Class(d) | Declaration::Struct(d) => MemberDecl::Type((*d).clone()),
            Declaration::Delegate(d) => MemberDecl::Delegate((*d).clone()),
            Declaration::Method(d) => MemberDecl::Method((*d).clone()),
            Declaration::Property(d) => MemberDecl::Property((*d).clone()),
            Declaration::Constructor(d) => MemberDecl::Constructor((*d).clone()),
            Declaration::Field(d) => MemberDecl::Field((*d).clone()),
        }
    }

    pub fn is_extension_method(&self) -> bool {
        matches!(self, Declaration::Method(m) if m.is_extension())
    }

    /// Methods, properties, constructors and fields.
    pub fn is_type_member(&self) -> bool {
        matches!(
            self,
            Declaration::Method(_)
                | Declaration::Property(_)
                | Declaration::Constructor(_)
                | Declaration::Field(_)
        )
    }

    /// Declarations a body can invoke or read.
    pub fn is_callable(&self) -> bool {
        self.is_type_member() || matches!(self, Declaration::Delegate(_))
    }

    fn from_member(member: &'p MemberDecl) -> Option<Self> {
        Some(match member {
            MemberDecl::Namespace(_) => return None,
            MemberDecl::Type(t) if t.kind == TypeKind::Class => Declaration::Class(t),
            MemberDecl::Type(t) => Declaration::Struct(t),
            MemberDecl::Delegate(d) => Declaration::Delegate(d),
            MemberDecl::Method(m) => Declaration::Method(m),
            MemberDecl::Property(p) => Declaration::Property(p),
            MemberDecl::Constructor(c) => Declaration::Constructor(c),
            MemberDecl::Field(f) => Declaration::Field(f),
        })
    }
}

/// A declaration together with where it lives.
#[derive(Debug, Clone)]
pub struct DeclInfo<'p> {
    pub declaration: Declaration<'p>,
    pub document: DocumentId,
    /// Enclosing type; `None` for top-level types and delegates.
    pub containing_type: Option<&'p TypeDecl>,
    /// Dotted namespace the declaration sits in (empty for global).
    pub namespace: String,
    /// Nesting depth in types: 0 for top-level types.
    pub type_depth: usize,
}

impl<'p> DeclInfo<'p> {
    pub fn id(&self) -> NodeId {
        self.declaration.id()
    }

    /// `Namespace.Type<,>` of the enclosing type, matching [`crate::TypeRef::open_name`].
    pub fn containing_type_open_name(&self) -> Option<String> {
        self.containing_type
            .map(|t| open_type_name(&self.namespace, &t.name, t.arity()))
    }

    /// Namespace-qualified name of the enclosing type, without generics.
    pub fn containing_type_name(&self) -> Option<String> {
        self.containing_type.map(|t| qualify(&self.namespace, &t.name))
    }

    /// Namespace-qualified name of the declaration itself.
    pub fn qualified_name(&self) -> String {
        match self.containing_type {
            Some(t) => format!("{}.{}", qualify(&self.namespace, &t.name), self.declaration.name()),
            None => qualify(&self.namespace, self.declaration.name()),
        }
    }
}

pub(crate) fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

// ============================================================================
// Project context
// ============================================================================

#[derive(Debug)]
pub struct ProjectContext<'p> {
    project: &'p Project,
    index: HashMap<NodeId, DeclInfo<'p>>,
    /// Declaration ids in document order, depth first.
    order: Vec<NodeId>,
}

impl<'p> ProjectContext<'p> {
    pub fn new(project: &'p Project) -> Self {
        let mut context = ProjectContext {
            project,
            index: HashMap::new(),
            order: Vec::new(),
        };
        for document in &project.documents {
            for member in &document.root.members {
                context.visit(member, document.id, "", None, 0);
            }
        }
        context
    }

    fn visit(
        &mut self,
        member: &'p MemberDecl,
        document: DocumentId,
        namespace: &str,
        containing_type: Option<&'p TypeDecl>,
        type_depth: usize,
    ) {
        if let MemberDecl::Namespace(ns) = member {
            let inner = qualify(namespace, &ns.name);
            for m in &ns.members {
                self.visit(m, document, &inner, containing_type, type_depth);
            }
            return;
        }
        let Some(declaration) = Declaration::from_member(member) else {
            return;
        };
        let id = declaration.id();
        self.order.push(id);
        self.index.insert(
            id,
            DeclInfo {
                declaration,
                document,
                containing_type,
                namespace: namespace.to_string(),
                type_depth,
            },
        );
        if let MemberDecl::Type(ty) = member {
            for m in &ty.members {
                self.visit(m, document, namespace, Some(ty), type_depth + 1);
            }
        }
    }

    pub fn project(&self) -> &'p Project {
        self.project
    }

    pub fn declaration(&self, id: NodeId) -> Option<&DeclInfo<'p>> {
        self.index.get(&id)
    }

    /// Every declaration in document order.
    pub fn declarations(&self) -> impl Iterator<Item = &DeclInfo<'p>> {
        self.order.iter().filter_map(|id| self.index.get(id))
    }

    pub fn extension_methods(&self) -> Vec<&DeclInfo<'p>> {
        self.declarations()
            .filter(|d| d.declaration.is_extension_method())
            .collect()
    }

    /// Methods (minus extensions), properties, constructors and fields.
    pub fn type_members_excluding_extensions(&self) -> Vec<&DeclInfo<'p>> {
        self.declarations()
            .filter(|d| d.declaration.is_type_member() && !d.declaration.is_extension_method())
            .collect()
    }

    /// Classes and structs declared directly in a document or namespace.
    pub fn top_level_types(&self) -> Vec<&DeclInfo<'p>> {
        self.declarations()
            .filter(|d| {
                matches!(d.declaration, Declaration::Class(_) | Declaration::Struct(_))
                    && d.type_depth == 0
            })
            .collect()
    }

    /// Documents rewriters may touch, each with a fresh context.
    pub fn documents(&self) -> Vec<DocumentContext<'p>> {
        self.project
            .documents
            .iter()
            .map(|document| DocumentContext {
                project: self.project,
                document,
            })
            .collect()
    }
}

/// One document of one project snapshot.
#[derive(Debug, Clone, Copy)]
pub struct DocumentContext<'p> {
    pub project: &'p Project,
    pub document: &'p Document,
}

impl<'p> DocumentContext<'p> {
    pub fn new(project: &'p Project, document: &'p Document) -> Self {
        DocumentContext { project, document }
    }

    /// Usings in scope for a declaration at the root or in `namespace`.
    pub fn usings_for(&self, namespace: &str) -> Vec<&'p UsingDirective> {
        let mut usings: Vec<&'p UsingDirective> = self.document.root.usings.iter().collect();
        collect_namespace_usings(&self.document.root.members, "", namespace, &mut usings);
        usings
    }
}

fn collect_namespace_usings<'p>(
    members: &'p [MemberDecl],
    prefix: &str,
    target: &str,
    out: &mut Vec<&'p UsingDirective>,
) {
    for member in members {
        if let MemberDecl::Namespace(ns) = member {
            let name = qualify(prefix, &ns.name);
            if target == name || target.starts_with(&format!("{}.", name)) {
                out.extend(ns.usings.iter());
                collect_namespace_usings(&ns.members, &name, target, out);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
