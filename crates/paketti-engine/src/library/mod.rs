//! The package library built from a solution.
//!
//! A [`Library`] maps package keys to packages. Adding a package whose key is
//! already present merges the two (see [`Package::merge_with`]); keys keep the
//! order in which they were first added.

mod descriptions;
mod package;

use std::collections::HashMap;

use paketti_core::error::PakettiResult;
use paketti_core::output::{BuildSummary, PackageInfo};

pub use descriptions::InterweaveDescriptions;
pub use package::{ContainerDetails, Package, PackageKind, CONTENT_SEPARATOR};

#[derive(Debug, Clone, Default)]
pub struct Library {
    packages: Vec<Package>,
    index: HashMap<String, usize>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_or_merge(&mut self, package: Package) -> PakettiResult<()> {
        match self.index.get(package.key()) {
            Some(&slot) => {
                let merged = self.packages[slot].merge_with(&package)?;
                self.packages[slot] = merged;
            }
            None => {
                self.index.insert(package.key().to_string(), self.packages.len());
                self.packages.push(package);
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Package> {
        self.index.get(key).map(|&slot| &self.packages[slot])
    }

    /// Packages in first-insertion order.
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    pub fn of_kind(&self, kind: PackageKind) -> impl Iterator<Item = &Package> {
        self.packages.iter().filter(move |p| p.kind() == kind)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(Package::key)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn infos(&self) -> Vec<PackageInfo> {
        self.packages.iter().map(Package::to_info).collect()
    }

    pub fn summary(&self, projects: usize) -> BuildSummary {
        BuildSummary {
            projects,
            packages: self.len(),
            interwoven_extension_methods: self.of_kind(PackageKind::InterwovenExtensionMethods).count(),
            interwoven_type_members: self.of_kind(PackageKind::InterwovenTypeMembers).count(),
            member_containers: self.of_kind(PackageKind::MemberContainer).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paketti_core::error::PakettiError;

    fn desc(name: &str) -> InterweaveDescriptions {
        InterweaveDescriptions::from_names([name.to_string()])
    }

    #[test]
    fn same_key_merges_in_place() {
        let mut library = Library::new();
        library
            .add_or_merge(Package::interwoven_extension_methods("int A();", desc("W")))
            .unwrap();
        library
            .add_or_merge(Package::interwoven_extension_methods("int B();", desc("V")))
            .unwrap();
        library
            .add_or_merge(Package::interwoven_extension_methods("int C();", desc("W")))
            .unwrap();

        assert_eq!(library.len(), 2);
        let keys: Vec<&str> = library.keys().collect();
        assert_eq!(
            keys,
            vec!["InterwovenExtensionMethods W", "InterwovenExtensionMethods V"]
        );
        assert_eq!(
            library.get("InterwovenExtensionMethods W").unwrap().content(),
            "int A();\n\nint C();"
        );
    }

    #[test]
    fn summary_counts_by_kind() {
        let mut library = Library::new();
        library
            .add_or_merge(Package::interwoven_extension_methods("", desc("W")))
            .unwrap();
        library
            .add_or_merge(Package::interwoven_type_members("Demo.Foo", "", desc("W")))
            .unwrap();
        let summary = library.summary(1);
        assert_eq!(summary.packages, 2);
        assert_eq!(summary.interwoven_extension_methods, 1);
        assert_eq!(summary.interwoven_type_members, 1);
        assert_eq!(summary.member_containers, 0);
    }

    #[test]
    fn failed_merge_leaves_library_unchanged() {
        let mut library = Library::new();
        let first = Package::interwoven_extension_methods("int A();", desc("W"));
        library.add_or_merge(first.clone()).unwrap();
        // Constructors never give two kinds the same key.
        let other = Package::interwoven_type_members("X", "", desc("W"));
        assert!(matches!(first.merge_with(&other), Err(PakettiError::Invariant { .. })));
        assert_eq!(library.get(first.key()), Some(&first));
    }
}
