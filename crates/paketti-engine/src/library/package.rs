//! Packages: keyed bundles of extracted source text.

use std::collections::BTreeSet;
use std::fmt;

use paketti_core::error::{PakettiError, PakettiResult};
use paketti_core::model::TypeKind;
use paketti_core::output::PackageInfo;

use super::descriptions::InterweaveDescriptions;

/// Separator placed between merged package contents.
pub const CONTENT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageKind {
    /// Extension methods grouped by the non-runtime types they use.
    ExtensionMethods,
    InterwovenExtensionMethods,
    InterwovenTypeMembers,
    MemberContainer,
}

impl PackageKind {
    /// Name used as the first word of a package key.
    pub fn key_name(&self) -> &'static str {
        match self {
            PackageKind::ExtensionMethods => "ExtensionMethods",
            PackageKind::InterwovenExtensionMethods => "InterwovenExtensionMethods",
            PackageKind::InterwovenTypeMembers => "InterwovenTypeMembers",
            PackageKind::MemberContainer => "MemberContainer",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageKind::ExtensionMethods => "extension_methods",
            PackageKind::InterwovenExtensionMethods => "interwoven_extension_methods",
            PackageKind::InterwovenTypeMembers => "interwoven_type_members",
            PackageKind::MemberContainer => "member_container",
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_name())
    }
}

/// What a member-container package remembers about its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDetails {
    pub kind: TypeKind,
    /// Namespace-qualified name.
    pub name: String,
    pub arity: usize,
    /// Declaration line, with any leading comments.
    pub declaration: String,
    /// Rendered using directives in scope at the declaration.
    pub usings: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    key: String,
    kind: PackageKind,
    content: String,
    descriptions: InterweaveDescriptions,
    owner: Option<String>,
    container: Option<ContainerDetails>,
}

impl Package {
    pub fn extension_methods(content: impl Into<String>, locals: InterweaveDescriptions) -> Self {
        let key = if locals.is_empty() {
            PackageKind::ExtensionMethods.to_string()
        } else {
            format!("{} {}", PackageKind::ExtensionMethods, locals.key())
        };
        Package::new(key, PackageKind::ExtensionMethods, content, locals, None, None)
    }

    pub fn interwoven_extension_methods(
        content: impl Into<String>,
        descriptions: InterweaveDescriptions,
    ) -> Self {
        let key = format!("{} {}", PackageKind::InterwovenExtensionMethods, descriptions.key());
        Package::new(
            key,
            PackageKind::InterwovenExtensionMethods,
            content,
            descriptions,
            None,
            None,
        )
    }

    pub fn interwoven_type_members(
        owner: impl Into<String>,
        content: impl Into<String>,
        descriptions: InterweaveDescriptions,
    ) -> Self {
        let owner = owner.into();
        let key = format!(
            "{} {} {}",
            PackageKind::InterwovenTypeMembers,
            owner,
            descriptions.key()
        );
        Package::new(
            key,
            PackageKind::InterwovenTypeMembers,
            content,
            descriptions,
            Some(owner),
            None,
        )
    }

    pub fn member_container(details: ContainerDetails, content: impl Into<String>) -> Self {
        let key = format!(
            "{} {} {}`{}",
            PackageKind::MemberContainer,
            capitalized(details.kind.keyword()),
            details.name,
            details.arity
        );
        let owner = Some(details.name.clone());
        Package::new(
            key,
            PackageKind::MemberContainer,
            content,
            InterweaveDescriptions::default(),
            owner,
            Some(details),
        )
    }

    fn new(
        key: String,
        kind: PackageKind,
        content: impl Into<String>,
        descriptions: InterweaveDescriptions,
        owner: Option<String>,
        container: Option<ContainerDetails>,
    ) -> Self {
        Package {
            key,
            kind,
            content: content.into().trim().to_string(),
            descriptions,
            owner,
            container,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn descriptions(&self) -> &InterweaveDescriptions {
        &self.descriptions
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn container(&self) -> Option<&ContainerDetails> {
        self.container.as_ref()
    }

    /// Combine two packages with the same key.
    ///
    /// Content is this package's followed by `other`'s. Containers also union
    /// their usings and keep the longer declaration.
    pub fn merge_with(&self, other: &Package) -> PakettiResult<Package> {
        if self.kind != other.kind {
            return Err(PakettiError::invariant(format!(
                "cannot merge package kinds {} and {}",
                self.kind, other.kind
            )));
        }
        if self.key != other.key {
            return Err(PakettiError::invariant(format!(
                "cannot merge package keys '{}' and '{}'",
                self.key, other.key
            )));
        }

        let content = match (self.content.is_empty(), other.content.is_empty()) {
            (_, true) => self.content.clone(),
            (true, false) => other.content.clone(),
            (false, false) => format!("{}{}{}", self.content, CONTENT_SEPARATOR, other.content),
        };

        let container = match (&self.container, &other.container) {
            (Some(mine), Some(theirs)) => {
                let mut merged = mine.clone();
                merged.usings.extend(theirs.usings.iter().cloned());
                if theirs.declaration.len() > mine.declaration.len() {
                    merged.declaration = theirs.declaration.clone();
                }
                Some(merged)
            }
            (mine, theirs) => mine.clone().or_else(|| theirs.clone()),
        };

        Ok(Package {
            key: self.key.clone(),
            kind: self.kind,
            content,
            descriptions: self.descriptions.clone(),
            owner: self.owner.clone(),
            container,
        })
    }

    pub fn to_info(&self) -> PackageInfo {
        PackageInfo {
            key: self.key.clone(),
            kind: self.kind.as_str().to_string(),
            owner: self.owner.clone(),
            dependencies: self.descriptions.names().to_vec(),
            usings: self
                .container
                .as_ref()
                .map(|c| c.usings.iter().cloned().collect())
                .unwrap_or_default(),
            declaration: self.container.as_ref().map(|c| c.declaration.clone()),
            content: self.content.clone(),
        }
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(names: &[&str]) -> InterweaveDescriptions {
        InterweaveDescriptions::from_names(names.iter().map(|n| n.to_string()))
    }

    fn container(declaration: &str, usings: &[&str]) -> ContainerDetails {
        ContainerDetails {
            kind: TypeKind::Class,
            name: "Demo.Foo".to_string(),
            arity: 0,
            declaration: declaration.to_string(),
            usings: usings.iter().map(|u| u.to_string()).collect(),
        }
    }

    mod keys {
        use super::*;

        #[test]
        fn keys_by_kind() {
            assert_eq!(
                Package::interwoven_extension_methods("", desc(&["Foreign.Lib.Widget"])).key(),
                "InterwovenExtensionMethods Foreign.Lib.Widget"
            );
            assert_eq!(
                Package::interwoven_type_members("Demo.Foo", "", desc(&["A.X", "B.Y"])).key(),
                "InterwovenTypeMembers Demo.Foo A.X,B.Y"
            );
            assert_eq!(
                Package::member_container(container("class Foo", &[]), "").key(),
                "MemberContainer Class Demo.Foo`0"
            );
            assert_eq!(
                Package::extension_methods("", desc(&["Demo.Foo"])).key(),
                "ExtensionMethods Demo.Foo"
            );
            assert_eq!(Package::extension_methods("", desc(&[])).key(), "ExtensionMethods");
        }

        #[test]
        fn content_is_trimmed() {
            let p = Package::interwoven_extension_methods("\n  int X();  \n", desc(&[]));
            assert_eq!(p.content(), "int X();");
        }
    }

    mod merge {
        use super::*;

        #[test]
        fn appends_content_with_a_blank_line() {
            let a = Package::interwoven_extension_methods("int A();", desc(&["W"]));
            let b = Package::interwoven_extension_methods("int B();", desc(&["W"]));
            let merged = a.merge_with(&b).unwrap();
            assert_eq!(merged.content(), "int A();\n\nint B();");
            assert_eq!(merged.key(), a.key());
        }

        #[test]
        fn containers_union_usings_and_keep_longer_declaration() {
            let a = Package::member_container(container("class Foo", &["using System;"]), "int X;");
            let b = Package::member_container(
                container("// The foo.\npublic partial class Foo", &["using System.Linq;"]),
                "int Y;",
            );
            let merged = a.merge_with(&b).unwrap();
            let details = merged.container().unwrap();
            assert_eq!(details.declaration, "// The foo.\npublic partial class Foo");
            assert_eq!(details.usings.len(), 2);
            assert_eq!(merged.content(), "int X;\n\nint Y;");
        }

        #[test]
        fn mismatched_kind_or_key_is_an_error() {
            let a = Package::interwoven_extension_methods("", desc(&["W"]));
            let b = Package::interwoven_type_members("Demo.Foo", "", desc(&["W"]));
            let c = Package::interwoven_extension_methods("", desc(&["V"]));
            assert!(matches!(a.merge_with(&b), Err(PakettiError::Invariant { .. })));
            assert!(matches!(a.merge_with(&c), Err(PakettiError::Invariant { .. })));
        }

        #[test]
        fn empty_content_does_not_add_separators() {
            let a = Package::member_container(container("class Foo", &[]), "");
            let b = Package::member_container(container("class Foo", &[]), "int Y;");
            assert_eq!(a.merge_with(&b).unwrap().content(), "int Y;");
        }
    }

    #[test]
    fn info_carries_container_details() {
        let p = Package::member_container(container("class Foo", &["using System;"]), "int X;");
        let info = p.to_info();
        assert_eq!(info.kind, "member_container");
        assert_eq!(info.owner.as_deref(), Some("Demo.Foo"));
        assert_eq!(info.usings, vec!["using System;"]);
        assert_eq!(info.declaration.as_deref(), Some("class Foo"));
    }
}
