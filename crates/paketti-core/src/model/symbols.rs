//! Resolved symbol information attached to the syntax tree.
//!
//! A front-end binds every declared type and every body expression it can
//! resolve. The engine never resolves anything itself: it only reads what is
//! attached here.

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Assembly that owns the value-tuple type family.
pub const VALUE_TUPLE_ASSEMBLY: &str = "System.ValueTuple";

/// Assembly used for the base runtime helpers below.
pub const RUNTIME_ASSEMBLY: &str = "System.Runtime";

/// What kind of type a [`TypeSymbol`] resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeSymbolKind {
    /// A named class, struct, delegate or enum.
    Named,
    /// A value tuple; `type_arguments` are the element types.
    Tuple,
    /// An array; `type_arguments` holds exactly the element type.
    Array,
    /// A generic type parameter such as `T`.
    TypeParameter,
    /// The front-end could not resolve the type.
    Error,
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeSymbol {
    pub kind: TypeSymbolKind,
    /// Simple metadata name without arity (`List`, `Int32`, `T`).
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Owning assembly name. Empty for type parameters.
    #[serde(default)]
    pub assembly: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<TypeSymbol>,
}

impl TypeSymbol {
    pub fn named(
        assembly: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let namespace = namespace.into();
        TypeSymbol {
            kind: TypeSymbolKind::Named,
            name: name.into(),
            namespace: (!namespace.is_empty()).then_some(namespace),
            assembly: assembly.into(),
            type_arguments: Vec::new(),
        }
    }

    /// A named type from the `System` namespace of the base runtime.
    pub fn system(name: impl Into<String>) -> Self {
        TypeSymbol::named(RUNTIME_ASSEMBLY, "System", name)
    }

    pub fn tuple(elements: Vec<TypeSymbol>) -> Self {
        TypeSymbol {
            kind: TypeSymbolKind::Tuple,
            name: "ValueTuple".to_string(),
            namespace: Some("System".to_string()),
            assembly: VALUE_TUPLE_ASSEMBLY.to_string(),
            type_arguments: elements,
        }
    }

    pub fn array(element: TypeSymbol) -> Self {
        TypeSymbol {
            kind: TypeSymbolKind::Array,
            name: "Array".to_string(),
            namespace: Some("System".to_string()),
            assembly: RUNTIME_ASSEMBLY.to_string(),
            type_arguments: vec![element],
        }
    }

    pub fn type_parameter(name: impl Into<String>) -> Self {
        TypeSymbol {
            kind: TypeSymbolKind::TypeParameter,
            name: name.into(),
            namespace: None,
            assembly: String::new(),
            type_arguments: Vec::new(),
        }
    }

    pub fn error(name: impl Into<String>) -> Self {
        TypeSymbol {
            kind: TypeSymbolKind::Error,
            name: name.into(),
            namespace: None,
            assembly: String::new(),
            type_arguments: Vec::new(),
        }
    }

    /// Replace the generic arguments.
    pub fn with_args(mut self, args: Vec<TypeSymbol>) -> Self {
        self.type_arguments = args;
        self
    }

    /// True if this symbol or any nested argument failed to resolve.
    pub fn contains_error(&self) -> bool {
        self.kind == TypeSymbolKind::Error || self.type_arguments.iter().any(|a| a.contains_error())
    }

    /// Source-style display name, e.g. `List<Int32>` or `Int32[]`.
    pub fn display_name(&self) -> String {
        match self.kind {
            TypeSymbolKind::Array => match self.type_arguments.first() {
                Some(element) => format!("{}[]", element.display_name()),
                None => "[]".to_string(),
            },
            TypeSymbolKind::Tuple => format!("({})", self.joined_args()),
            _ if self.type_arguments.is_empty() => self.name.clone(),
            _ => format!("{}<{}>", self.name, self.joined_args()),
        }
    }

    fn joined_args(&self) -> String {
        self.type_arguments
            .iter()
            .map(TypeSymbol::display_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A member or type referenced from a body expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolRef {
    /// Member (or type) name.
    pub name: String,
    /// Name of the containing type, if the symbol is a member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    /// Namespace the symbol is declared in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Declaring node, when the declaration lives in the same project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<NodeId>,
}

impl SymbolRef {
    /// A reference to a member of `container`, bound later by the builder.
    pub fn member(container: impl Into<String>, name: impl Into<String>) -> Self {
        SymbolRef {
            name: name.into(),
            container: Some(container.into()),
            namespace: None,
            declaration: None,
        }
    }

    /// A reference to a sibling member or a top-level delegate.
    pub fn local(name: impl Into<String>) -> Self {
        SymbolRef {
            name: name.into(),
            container: None,
            namespace: None,
            declaration: None,
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}
