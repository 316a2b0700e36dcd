//! Immutable syntax tree for one document.
//!
//! Trees are plain values. A rewrite never edits a tree in place: it builds a
//! new [`CompilationUnit`] and the caller swaps it into a new document. Node
//! identity is the [`NodeId`] carried by every declaration and using
//! directive, so identity survives any number of rewrites that keep the node.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::symbols::{SymbolRef, TypeSymbol};
use super::NodeId;

// ============================================================================
// Trivia
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriviaKind {
    Whitespace,
    Comment,
    RegionDirective,
    EndRegionDirective,
    /// Any other preprocessor directive (`#if`, `#pragma`, ...).
    Directive,
}

/// Non-semantic text attached in front of a node or a closing brace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: String,
}

impl Trivia {
    pub fn comment(text: impl Into<String>) -> Self {
        Trivia {
            kind: TriviaKind::Comment,
            text: text.into(),
        }
    }

    pub fn region(name: &str) -> Self {
        Trivia {
            kind: TriviaKind::RegionDirective,
            text: format!("#region {}", name).trim_end().to_string(),
        }
    }

    pub fn end_region() -> Self {
        Trivia {
            kind: TriviaKind::EndRegionDirective,
            text: "#endregion".to_string(),
        }
    }

    pub fn is_region(&self) -> bool {
        matches!(
            self.kind,
            TriviaKind::RegionDirective | TriviaKind::EndRegionDirective
        )
    }
}

// ============================================================================
// Types and bodies
// ============================================================================

/// A type as written in source together with what it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeSyntax {
    pub text: String,
    pub symbol: TypeSymbol,
}

impl TypeSyntax {
    pub fn new(text: impl Into<String>, symbol: TypeSymbol) -> Self {
        TypeSyntax {
            text: text.into(),
            symbol,
        }
    }

    /// Use the symbol's display name as source text.
    pub fn of(symbol: TypeSymbol) -> Self {
        TypeSyntax {
            text: symbol.display_name(),
            symbol,
        }
    }

    pub fn void() -> Self {
        TypeSyntax::new("void", TypeSymbol::system("Void"))
    }

    pub fn int() -> Self {
        TypeSyntax::new("int", TypeSymbol::system("Int32"))
    }

    pub fn string() -> Self {
        TypeSyntax::new("string", TypeSymbol::system("String"))
    }
}

/// One resolved expression inside a body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_type: Option<TypeSymbol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolRef>,
}

impl Expression {
    pub fn typed(text: impl Into<String>, ty: TypeSymbol) -> Self {
        Expression {
            text: text.into(),
            resolved_type: Some(ty),
            symbol: None,
        }
    }

    pub fn call(text: impl Into<String>, symbol: SymbolRef) -> Self {
        Expression {
            text: text.into(),
            resolved_type: None,
            symbol: Some(symbol),
        }
    }

    pub fn with_type(mut self, ty: TypeSymbol) -> Self {
        self.resolved_type = Some(ty);
        self
    }

    /// The semantic type of this expression, if the front-end resolved one.
    pub fn type_of(&self) -> Option<&TypeSymbol> {
        self.resolved_type.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    /// `{ ... }`
    Block,
    /// `=> ...;`
    Arrow,
}

/// A member body: its text plus every expression the front-end resolved in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub kind: BodyKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expressions: Vec<Expression>,
}

impl Body {
    pub fn block(text: impl Into<String>) -> Self {
        Body {
            kind: BodyKind::Block,
            text: text.into(),
            expressions: Vec::new(),
        }
    }

    pub fn arrow(text: impl Into<String>) -> Self {
        Body {
            kind: BodyKind::Arrow,
            text: text.into(),
            expressions: Vec::new(),
        }
    }

    pub fn expr(mut self, expression: Expression) -> Self {
        self.expressions.push(expression);
        self
    }
}

// ============================================================================
// Directives
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsingDirective {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leading_trivia: Vec<Trivia>,
    /// Imported namespace or type name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub is_static: bool,
}

impl UsingDirective {
    pub fn new(name: impl Into<String>) -> Self {
        UsingDirective {
            id: NodeId::UNASSIGNED,
            leading_trivia: Vec::new(),
            name: name.into(),
            alias: None,
            is_static: false,
        }
    }

    pub fn alias(alias: impl Into<String>, name: impl Into<String>) -> Self {
        UsingDirective {
            alias: Some(alias.into()),
            ..UsingDirective::new(name)
        }
    }

    pub fn static_import(name: impl Into<String>) -> Self {
        UsingDirective {
            is_static: true,
            ..UsingDirective::new(name)
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Struct,
}

impl TypeKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeSyntax,
    /// `this` modifier on the first parameter of an extension method.
    #[serde(default)]
    pub is_this: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeSyntax) -> Self {
        Parameter {
            name: name.into(),
            ty,
            is_this: false,
        }
    }

    pub fn this(name: impl Into<String>, ty: TypeSyntax) -> Self {
        Parameter {
            name: name.into(),
            ty,
            is_this: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDecl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leading_trivia: Vec<Trivia>,
    pub name: String,
    #[serde(default)]
    pub usings: Vec<UsingDirective>,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub close_trivia: Vec<Trivia>,
}

impl NamespaceDecl {
    pub fn new(name: impl Into<String>) -> Self {
        NamespaceDecl {
            id: NodeId::UNASSIGNED,
            leading_trivia: Vec::new(),
            name: name.into(),
            usings: Vec::new(),
            members: Vec::new(),
            close_trivia: Vec::new(),
        }
    }

    pub fn using(mut self, name: impl Into<String>) -> Self {
        self.usings.push(UsingDirective::new(name));
        self
    }

    pub fn member(mut self, member: impl Into<MemberDecl>) -> Self {
        self.members.push(member.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leading_trivia: Vec<Trivia>,
    pub kind: TypeKind,
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_list: Vec<TypeSyntax>,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub close_trivia: Vec<Trivia>,
}

impl TypeDecl {
    pub fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        TypeDecl {
            id: NodeId::UNASSIGNED,
            leading_trivia: Vec::new(),
            kind,
            modifiers: Vec::new(),
            name: name.into(),
            type_parameters: Vec::new(),
            base_list: Vec::new(),
            members: Vec::new(),
            close_trivia: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        TypeDecl::new(TypeKind::Class, name)
    }

    pub fn structure(name: impl Into<String>) -> Self {
        TypeDecl::new(TypeKind::Struct, name)
    }

    pub fn with_modifiers<I, S>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers = modifiers.into_iter().map(Into::into).collect();
        self
    }

    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_parameters.push(name.into());
        self
    }

    pub fn base(mut self, ty: TypeSyntax) -> Self {
        self.base_list.push(ty);
        self
    }

    pub fn leading(mut self, trivia: Trivia) -> Self {
        self.leading_trivia.push(trivia);
        self
    }

    pub fn closing(mut self, trivia: Trivia) -> Self {
        self.close_trivia.push(trivia);
        self
    }

    pub fn member(mut self, member: impl Into<MemberDecl>) -> Self {
        self.members.push(member.into());
        self
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    pub fn is_partial(&self) -> bool {
        self.has_modifier("partial")
    }

    /// Number of generic type parameters.
    pub fn arity(&self) -> usize {
        self.type_parameters.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateDecl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leading_trivia: Vec<Trivia>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    pub return_type: TypeSyntax,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl DelegateDecl {
    pub fn new(name: impl Into<String>, return_type: TypeSyntax) -> Self {
        DelegateDecl {
            id: NodeId::UNASSIGNED,
            leading_trivia: Vec::new(),
            modifiers: Vec::new(),
            name: name.into(),
            type_parameters: Vec::new(),
            return_type,
            parameters: Vec::new(),
        }
    }

    pub fn with_modifiers<I, S>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers = modifiers.into_iter().map(Into::into).collect();
        self
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leading_trivia: Vec<Trivia>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    pub return_type: TypeSyntax,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>, return_type: TypeSyntax) -> Self {
        MethodDecl {
            id: NodeId::UNASSIGNED,
            leading_trivia: Vec::new(),
            modifiers: Vec::new(),
            name: name.into(),
            type_parameters: Vec::new(),
            return_type,
            parameters: Vec::new(),
            body: None,
        }
    }

    pub fn with_modifiers<I, S>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers = modifiers.into_iter().map(Into::into).collect();
        self
    }

    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_parameters.push(name.into());
        self
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn leading(mut self, trivia: Trivia) -> Self {
        self.leading_trivia.push(trivia);
        self
    }

    /// An extension method is a method whose first parameter carries `this`.
    pub fn is_extension(&self) -> bool {
        self.parameters.first().is_some_and(|p| p.is_this)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.iter().any(|m| m == "static")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum PropertyAccessors {
    /// `{ get; set; }` or `{ get; }`
    Auto { setter: bool },
    /// `=> expr;`
    Arrow { body: Body },
    /// `{ get { ... } set { ... } }`
    Explicit {
        getter: Option<Body>,
        setter: Option<Body>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDecl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leading_trivia: Vec<Trivia>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub name: String,
    pub ty: TypeSyntax,
    pub accessors: PropertyAccessors,
}

impl PropertyDecl {
    pub fn new(name: impl Into<String>, ty: TypeSyntax) -> Self {
        PropertyDecl {
            id: NodeId::UNASSIGNED,
            leading_trivia: Vec::new(),
            modifiers: Vec::new(),
            name: name.into(),
            ty,
            accessors: PropertyAccessors::Auto { setter: true },
        }
    }

    pub fn with_modifiers<I, S>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers = modifiers.into_iter().map(Into::into).collect();
        self
    }

    pub fn arrow(mut self, body: Body) -> Self {
        self.accessors = PropertyAccessors::Arrow { body };
        self
    }

    pub fn getter(mut self, body: Body) -> Self {
        self.accessors = match self.accessors {
            PropertyAccessors::Explicit { setter, .. } => PropertyAccessors::Explicit {
                getter: Some(body),
                setter,
            },
            _ => PropertyAccessors::Explicit {
                getter: Some(body),
                setter: None,
            },
        };
        self
    }

    pub fn setter(mut self, body: Body) -> Self {
        self.accessors = match self.accessors {
            PropertyAccessors::Explicit { getter, .. } => PropertyAccessors::Explicit {
                getter,
                setter: Some(body),
            },
            _ => PropertyAccessors::Explicit {
                getter: None,
                setter: Some(body),
            },
        };
        self
    }

    /// Every accessor body, in source order.
    pub fn bodies(&self) -> Vec<&Body> {
        match &self.accessors {
            PropertyAccessors::Auto { .. } => Vec::new(),
            PropertyAccessors::Arrow { body } => vec![body],
            PropertyAccessors::Explicit { getter, setter } => {
                getter.iter().chain(setter.iter()).collect()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leading_trivia: Vec<Trivia>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// Name of the type being constructed.
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

impl ConstructorDecl {
    pub fn new(name: impl Into<String>) -> Self {
        ConstructorDecl {
            id: NodeId::UNASSIGNED,
            leading_trivia: Vec::new(),
            modifiers: Vec::new(),
            name: name.into(),
            parameters: Vec::new(),
            body: None,
        }
    }

    pub fn with_modifiers<I, S>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers = modifiers.into_iter().map(Into::into).collect();
        self
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDeclarator {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Body>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leading_trivia: Vec<Trivia>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub ty: TypeSyntax,
    pub variables: Vec<VariableDeclarator>,
}

impl FieldDecl {
    pub fn new(ty: TypeSyntax, name: impl Into<String>) -> Self {
        FieldDecl {
            id: NodeId::UNASSIGNED,
            leading_trivia: Vec::new(),
            modifiers: Vec::new(),
            ty,
            variables: vec![VariableDeclarator {
                name: name.into(),
                initializer: None,
            }],
        }
    }

    pub fn with_modifiers<I, S>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers = modifiers.into_iter().map(Into::into).collect();
        self
    }

    /// Set the initializer of the last declared variable.
    pub fn initializer(mut self, body: Body) -> Self {
        if let Some(last) = self.variables.last_mut() {
            last.initializer = Some(body);
        }
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }
}

/// Any member that can appear in a compilation unit, namespace or type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decl", rename_all = "snake_case")]
pub enum MemberDecl {
    Namespace(NamespaceDecl),
    Type(TypeDecl),
    Delegate(DelegateDecl),
    Method(MethodDecl),
    Property(PropertyDecl),
    Constructor(ConstructorDecl),
    Field(FieldDecl),
}

impl MemberDecl {
    pub fn id(&self) -> NodeId {
        match self {
            MemberDecl::Namespace(d) => d.id,
            MemberDecl::Type(d) => d.id,
            MemberDecl::Delegate(d) => d.id,
            MemberDecl::Method(d) => d.id,
            MemberDecl::Property(d) => d.id,
            MemberDecl::Constructor(d) => d.id,
            MemberDecl::Field(d) => d.id,
        }
    }

    pub fn leading_trivia_mut(&mut self) -> &mut Vec<Trivia> {
        match self {
            MemberDecl::Namespace(d) => &mut d.leading_trivia,
            MemberDecl::Type(d) => &mut d.leading_trivia,
            MemberDecl::Delegate(d) => &mut d.leading_trivia,
            MemberDecl::Method(d) => &mut d.leading_trivia,
            MemberDecl::Property(d) => &mut d.leading_trivia,
            MemberDecl::Constructor(d) => &mut d.leading_trivia,
            MemberDecl::Field(d) => &mut d.leading_trivia,
        }
    }

    /// Display name; fields report their first variable.
    pub fn name(&self) -> &str {
        match self {
            MemberDecl::Namespace(d) => &d.name,
            MemberDecl::Type(d) => &d.name,
            MemberDecl::Delegate(d) => &d.name,
            MemberDecl::Method(d) => &d.name,
            MemberDecl::Property(d) => &d.name,
            MemberDecl::Constructor(d) => &d.name,
            MemberDecl::Field(d) => d.names().next().unwrap_or_default(),
        }
    }

    fn contains_node(&self, id: NodeId) -> bool {
        if self.id() == id {
            return true;
        }
        match self {
            MemberDecl::Namespace(ns) => {
                ns.usings.iter().any(|u| u.id == id)
                    || ns.members.iter().any(|m| m.contains_node(id))
            }
            MemberDecl::Type(ty) => ty.members.iter().any(|m| m.contains_node(id)),
            _ => false,
        }
    }
}

macro_rules! impl_into_member {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for MemberDecl {
            fn from(decl: $ty) -> Self {
                MemberDecl::$variant(decl)
            }
        })*
    };
}

impl_into_member!(
    NamespaceDecl => Namespace,
    TypeDecl => Type,
    DelegateDecl => Delegate,
    MethodDecl => Method,
    PropertyDecl => Property,
    ConstructorDecl => Constructor,
    FieldDecl => Field,
);

// ============================================================================
// Compilation unit
// ============================================================================

/// Root of a document's tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    #[serde(default)]
    pub usings: Vec<UsingDirective>,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub end_trivia: Vec<Trivia>,
}

impl CompilationUnit {
    pub fn new() -> Self {
        CompilationUnit::default()
    }

    pub fn using(mut self, name: impl Into<String>) -> Self {
        self.usings.push(UsingDirective::new(name));
        self
    }

    pub fn using_directive(mut self, directive: UsingDirective) -> Self {
        self.usings.push(directive);
        self
    }

    pub fn member(mut self, member: impl Into<MemberDecl>) -> Self {
        self.members.push(member.into());
        self
    }

    /// True if a declaration or using directive with this id is in the tree.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.usings.iter().any(|u| u.id == id) || self.members.iter().any(|m| m.contains_node(id))
    }

    /// Remove every declaration and using directive whose id is in `ids`.
    ///
    /// One pass over the tree. Removed nodes take their own trivia with them.
    pub fn remove_nodes(&self, ids: &HashSet<NodeId>) -> CompilationUnit {
        CompilationUnit {
            usings: retain_usings(&self.usings, ids),
            members: remove_members(&self.members, ids),
            end_trivia: self.end_trivia.clone(),
        }
    }

    /// Keep only the trivia for which `keep` returns true, everywhere in the tree.
    pub fn retain_trivia(&self, keep: &impl Fn(&Trivia) -> bool) -> CompilationUnit {
        let mut unit = self.clone();
        unit.end_trivia.retain(|t| keep(t));
        for using in &mut unit.usings {
            using.leading_trivia.retain(|t| keep(t));
        }
        for member in &mut unit.members {
            retain_member_trivia(member, keep);
        }
        unit
    }

    /// Rebuild every type declared directly in the root or in a namespace.
    ///
    /// Nested types are left untouched.
    pub fn map_top_level_types(&self, f: &mut impl FnMut(&TypeDecl) -> TypeDecl) -> CompilationUnit {
        CompilationUnit {
            usings: self.usings.clone(),
            members: map_types_in(&self.members, f),
            end_trivia: self.end_trivia.clone(),
        }
    }
}

fn retain_usings(usings: &[UsingDirective], ids: &HashSet<NodeId>) -> Vec<UsingDirective> {
    usings
        .iter()
        .filter(|u| !ids.contains(&u.id))
        .cloned()
        .collect()
}

fn remove_members(members: &[MemberDecl], ids: &HashSet<NodeId>) -> Vec<MemberDecl> {
    members
        .iter()
        .filter(|m| !ids.contains(&m.id()))
        .map(|m| match m {
            MemberDecl::Namespace(ns) => MemberDecl::Namespace(NamespaceDecl {
                usings: retain_usings(&ns.usings, ids),
                members: remove_members(&ns.members, ids),
                ..ns.clone()
            }),
            MemberDecl::Type(ty) => MemberDecl::Type(TypeDecl {
                members: remove_members(&ty.members, ids),
                ..ty.clone()
            }),
            other => other.clone(),
        })
        .collect()
}

fn retain_member_trivia(member: &mut MemberDecl, keep: &impl Fn(&Trivia) -> bool) {
    member.leading_trivia_mut().retain(|t| keep(t));
    match member {
        MemberDecl::Namespace(ns) => {
            ns.close_trivia.retain(|t| keep(t));
            for using in &mut ns.usings {
                using.leading_trivia.retain(|t| keep(t));
            }
            for inner in &mut ns.members {
                retain_member_trivia(inner, keep);
            }
        }
        MemberDecl::Type(ty) => {
            ty.close_trivia.retain(|t| keep(t));
            for inner in &mut ty.members {
                retain_member_trivia(inner, keep);
            }
        }
        _ => {}
    }
}

fn map_types_in(
    members: &[MemberDecl],
    f: &mut impl FnMut(&TypeDecl) -> TypeDecl,
) -> Vec<MemberDecl> {
    members
        .iter()
        .map(|m| match m {
            MemberDecl::Namespace(ns) => MemberDecl::Namespace(NamespaceDecl {
                members: map_types_in(&ns.members, f),
                ..ns.clone()
            }),
            MemberDecl::Type(ty) => MemberDecl::Type(f(ty)),
            other => other.clone(),
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CompilationUnit {
        let mut method = MethodDecl::new("Run", TypeSyntax::void());
        method.id = NodeId(3);
        let mut inner = TypeDecl::class("Inner");
        inner.id = NodeId(4);
        let mut outer = TypeDecl::class("Outer")
            .leading(Trivia::region("Types"))
            .member(method)
            .member(inner)
            .closing(Trivia::end_region());
        outer.id = NodeId(2);
        let mut ns = NamespaceDecl::new("Demo").member(outer);
        ns.id = NodeId(1);
        let mut using = UsingDirective::new("System");
        using.id = NodeId(5);
        CompilationUnit::new().using_directive(using).member(ns)
    }

    mod remove_nodes {
        use super::*;

        #[test]
        fn removes_nested_members_and_usings() {
            let unit = sample();
            let ids: HashSet<NodeId> = [NodeId(3), NodeId(5)].into_iter().collect();
            let pruned = unit.remove_nodes(&ids);
            assert!(!pruned.contains_node(NodeId(3)));
            assert!(!pruned.contains_node(NodeId(5)));
            assert!(pruned.contains_node(NodeId(4)));
            assert!(unit.contains_node(NodeId(3)), "original is untouched");
        }

        #[test]
        fn removing_a_container_removes_its_children() {
            let ids: HashSet<NodeId> = [NodeId(2)].into_iter().collect();
            let pruned = sample().remove_nodes(&ids);
            assert!(!pruned.contains_node(NodeId(4)));
            assert!(pruned.contains_node(NodeId(1)));
        }
    }

    mod trivia {
        use super::*;

        #[test]
        fn retain_trivia_strips_regions_everywhere() {
            let stripped = sample().retain_trivia(&|t: &Trivia| !t.is_region());
            let MemberDecl::Namespace(ns) = &stripped.members[0] else {
                panic!("expected namespace");
            };
            let MemberDecl::Type(ty) = &ns.members[0] else {
                panic!("expected type");
            };
            assert!(ty.leading_trivia.is_empty());
            assert!(ty.close_trivia.is_empty());
        }
    }

    mod map_types {
        use super::*;

        #[test]
        fn only_top_level_types_are_visited() {
            let mut seen = Vec::new();
            sample().map_top_level_types(&mut |ty: &TypeDecl| {
                seen.push(ty.name.clone());
                ty.clone()
            });
            assert_eq!(seen, vec!["Outer".to_string()]);
        }
    }

    #[test]
    fn extension_detection_requires_this_on_first_parameter() {
        let ext = MethodDecl::new("Twice", TypeSyntax::int())
            .with_modifiers(["public", "static"])
            .param(Parameter::this("x", TypeSyntax::int()));
        assert!(ext.is_extension());
        let plain = MethodDecl::new("Twice", TypeSyntax::int())
            .param(Parameter::new("x", TypeSyntax::int()));
        assert!(!plain.is_extension());
    }
}
