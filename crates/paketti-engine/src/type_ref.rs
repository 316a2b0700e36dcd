//! Value wrapper over resolved type symbols.
//!
//! Two [`TypeRef`]s are the same type when their full names match, so the
//! full name (assembly, namespace, name and type arguments) is computed once
//! at construction and used for equality, ordering and hashing.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use paketti_core::model::{TypeSymbol, TypeSymbolKind};

#[derive(Debug, Clone)]
pub struct TypeRef {
    kind: TypeSymbolKind,
    name: String,
    namespace: String,
    assembly: String,
    type_arguments: Vec<TypeRef>,
    full_name: String,
    open_name: String,
}

impl TypeRef {
    /// Wrap a resolved symbol.
    ///
    /// # Panics
    ///
    /// Panics if `symbol` or any of its type arguments failed to resolve.
    /// Callers filter those out first (see [`TypeRef::try_new`]).
    pub fn new(symbol: &TypeSymbol) -> Self {
        match Self::try_new(symbol) {
            Some(t) => t,
            None => panic!("unresolved type symbol `{}`", symbol.display_name()),
        }
    }

    /// `None` if the symbol or any type argument is an error symbol.
    pub fn try_new(symbol: &TypeSymbol) -> Option<Self> {
        if symbol.kind == TypeSymbolKind::Error {
            return None;
        }
        let type_arguments = symbol
            .type_arguments
            .iter()
            .map(Self::try_new)
            .collect::<Option<Vec<_>>>()?;
        let namespace = symbol.namespace.clone().unwrap_or_default();

        let (full_name, open_name) = match symbol.kind {
            TypeSymbolKind::TypeParameter => (symbol.name.clone(), symbol.name.clone()),
            TypeSymbolKind::Array => {
                let element = type_arguments.first();
                (
                    format!("{}[]", element.map(|e| e.full_name.as_str()).unwrap_or("?")),
                    format!("{}[]", element.map(|e| e.open_name.as_str()).unwrap_or("?")),
                )
            }
            _ => {
                let mut full = format!("[{}]{}", symbol.assembly, qualified(&namespace, &symbol.name));
                if !type_arguments.is_empty() {
                    let args: Vec<&str> = type_arguments.iter().map(|a| a.full_name.as_str()).collect();
                    full.push('<');
                    full.push_str(&args.join(","));
                    full.push('>');
                }
                let open = open_type_name(&namespace, &symbol.name, type_arguments.len());
                (full, open)
            }
        };

        Some(TypeRef {
            kind: symbol.kind,
            name: symbol.name.clone(),
            namespace,
            assembly: symbol.assembly.clone(),
            type_arguments,
            full_name,
            open_name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn assembly(&self) -> &str {
        &self.assembly
    }

    pub fn type_arguments(&self) -> &[TypeRef] {
        &self.type_arguments
    }

    /// Identity string, e.g. `[Foreign]Foreign.Lib.Box<[System.Runtime]System.Int32>`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Name with generic arguments erased and no assembly, e.g. `Foreign.Lib.Box<>`.
    pub fn open_name(&self) -> &str {
        &self.open_name
    }

    pub fn is_array(&self) -> bool {
        self.kind == TypeSymbolKind::Array
    }

    /// A constructed generic, i.e. a named type with type arguments.
    pub fn is_generic(&self) -> bool {
        self.kind == TypeSymbolKind::Named && !self.type_arguments.is_empty()
    }

    pub fn is_generic_parameter(&self) -> bool {
        self.kind == TypeSymbolKind::TypeParameter
    }

    pub fn is_tuple(&self) -> bool {
        self.kind == TypeSymbolKind::Tuple
    }
}

/// `Namespace.Name` with `<>` (one comma per extra parameter) for generics.
pub fn open_type_name(namespace: &str, name: &str, arity: usize) -> String {
    let mut out = qualified(namespace, name);
    if arity > 0 {
        out.push('<');
        out.push_str(&",".repeat(arity - 1));
        out.push('>');
    }
    out
}

fn qualified(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full_name.hash(state);
    }
}

impl PartialOrd for TypeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.full_name.cmp(&other.full_name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foreign(name: &str) -> TypeSymbol {
        TypeSymbol::named("Foreign", "Foreign.Lib", name)
    }

    #[test]
    fn names_of_a_plain_type() {
        let t = TypeRef::new(&foreign("Widget"));
        assert_eq!(t.full_name(), "[Foreign]Foreign.Lib.Widget");
        assert_eq!(t.open_name(), "Foreign.Lib.Widget");
        assert!(!t.is_generic());
    }

    #[test]
    fn generic_open_name_erases_arguments() {
        let t = TypeRef::new(
            &foreign("Pair").with_args(vec![TypeSymbol::system("Int32"), foreign("Widget")]),
        );
        assert_eq!(t.open_name(), "Foreign.Lib.Pair<,>");
        assert_eq!(
            t.full_name(),
            "[Foreign]Foreign.Lib.Pair<[System.Runtime]System.Int32,[Foreign]Foreign.Lib.Widget>"
        );
        assert!(t.is_generic());
        assert_eq!(t.type_arguments().len(), 2);
    }

    #[test]
    fn equality_follows_full_name() {
        let a = TypeRef::new(&foreign("Widget"));
        let b = TypeRef::new(&foreign("Widget"));
        let other_assembly = TypeRef::new(&TypeSymbol::named("Other", "Foreign.Lib", "Widget"));
        assert_eq!(a, b);
        assert_ne!(a, other_assembly);
        assert_eq!(a.open_name(), other_assembly.open_name());
    }

    #[test]
    fn arrays_tuples_and_parameters() {
        let array = TypeRef::new(&TypeSymbol::array(foreign("Widget")));
        assert!(array.is_array());
        assert_eq!(array.open_name(), "Foreign.Lib.Widget[]");

        let tuple = TypeRef::new(&TypeSymbol::tuple(vec![
            TypeSymbol::system("Int32"),
            TypeSymbol::system("String"),
        ]));
        assert!(tuple.is_tuple());
        assert!(!tuple.is_generic());
        assert_eq!(tuple.open_name(), "System.ValueTuple<,>");

        let param = TypeRef::new(&TypeSymbol::type_parameter("T"));
        assert!(param.is_generic_parameter());
        assert_eq!(param.full_name(), "T");
    }

    #[test]
    fn error_symbols_are_rejected() {
        assert!(TypeRef::try_new(&TypeSymbol::error("Missing")).is_none());
        let nested = foreign("Box").with_args(vec![TypeSymbol::error("Missing")]);
        assert!(TypeRef::try_new(&nested).is_none());
    }

    #[test]
    #[should_panic(expected = "unresolved type symbol")]
    fn new_panics_on_error_symbols() {
        let _ = TypeRef::new(&TypeSymbol::error("Missing"));
    }
}
