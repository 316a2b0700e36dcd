//! Canonical keys for sets of interweave dependencies.

use std::collections::BTreeSet;
use std::fmt;

use crate::interweave::InterweavePolicy;
use crate::type_ref::TypeRef;
use crate::walker::DependencySet;

/// Sorted, distinct open names of interweave types.
///
/// Two declarations depending on the same foreign types (regardless of
/// generic arguments or discovery order) get equal descriptions and so end up
/// in the same package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InterweaveDescriptions {
    names: Vec<String>,
}

impl InterweaveDescriptions {
    /// Describe the interweaves among `dependencies`.
    pub fn of(policy: &InterweavePolicy, dependencies: &DependencySet) -> Self {
        Self::from_types(policy.only_interweaves(dependencies))
    }

    pub fn from_types<'t>(types: impl IntoIterator<Item = &'t TypeRef>) -> Self {
        Self::from_names(types.into_iter().map(|t| t.open_name().to_string()))
    }

    pub fn from_names(names: impl IntoIterator<Item = String>) -> Self {
        let names: BTreeSet<String> = names.into_iter().collect();
        InterweaveDescriptions {
            names: names.into_iter().collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Comma-joined names; the package-key suffix.
    pub fn key(&self) -> String {
        self.names.join(",")
    }
}

impl fmt::Display for InterweaveDescriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paketti_core::model::TypeSymbol;

    #[test]
    fn generic_instantiations_collapse() {
        let policy = InterweavePolicy::default();
        let boxed = |arg: TypeSymbol| {
            TypeRef::new(&TypeSymbol::named("Foreign", "Foreign.Lib", "Box").with_args(vec![arg]))
        };
        let deps: DependencySet = [
            boxed(TypeSymbol::system("Int32")),
            boxed(TypeSymbol::system("String")),
            TypeRef::new(&TypeSymbol::system("Int32")),
        ]
        .into_iter()
        .collect();
        let descriptions = InterweaveDescriptions::of(&policy, &deps);
        assert_eq!(descriptions.key(), "Foreign.Lib.Box<>");
    }

    #[test]
    fn keys_are_sorted() {
        let a = InterweaveDescriptions::from_names(["Z.Last".to_string(), "A.First".to_string()]);
        let b = InterweaveDescriptions::from_names(["A.First".to_string(), "Z.Last".to_string()]);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "A.First,Z.Last");
    }
}
