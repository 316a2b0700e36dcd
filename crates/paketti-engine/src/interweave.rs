//! Interweave classification.
//!
//! An interweave is a dependency on a type outside the trusted base runtime.
//! Arrays and generic parameters never are; their element and argument types
//! are classified separately. Tuples always are.

use std::collections::HashSet;

use paketti_core::config::InterweaveConfig;

use crate::type_ref::TypeRef;
use crate::walker::DependencySet;

#[derive(Debug, Clone)]
pub struct InterweavePolicy {
    /// Lowercased assembly names.
    trusted: HashSet<String>,
    /// Lowercased assembly names; wins over `trusted`.
    always_foreign: HashSet<String>,
    tuples_always_foreign: bool,
}

impl Default for InterweavePolicy {
    fn default() -> Self {
        InterweavePolicy::from_config(&InterweaveConfig::default())
    }
}

impl InterweavePolicy {
    pub fn from_config(config: &InterweaveConfig) -> Self {
        let lower = |names: &[String]| names.iter().map(|n| n.to_ascii_lowercase()).collect();
        InterweavePolicy {
            trusted: lower(&config.trusted_assemblies),
            always_foreign: lower(&config.always_foreign_assemblies),
            tuples_always_foreign: config.tuples_always_foreign,
        }
    }

    pub fn is_interweave(&self, ty: &TypeRef) -> bool {
        if ty.is_array() || ty.is_generic_parameter() {
            return false;
        }
        if ty.is_tuple() && self.tuples_always_foreign {
            return true;
        }
        let assembly = ty.assembly().to_ascii_lowercase();
        self.always_foreign.contains(&assembly) || !self.trusted.contains(&assembly)
    }

    pub fn only_interweaves<'d>(&self, deps: &'d DependencySet) -> Vec<&'d TypeRef> {
        deps.iter().filter(|t| self.is_interweave(t)).collect()
    }

    /// Dependencies from outside the trusted assemblies: the project's own
    /// types and foreign ones. Arrays and generic parameters are skipped.
    pub fn only_local<'d>(&self, deps: &'d DependencySet) -> Vec<&'d TypeRef> {
        deps.iter()
            .filter(|t| {
                !t.is_array()
                    && !t.is_generic_parameter()
                    && !self.trusted.contains(&t.assembly().to_ascii_lowercase())
            })
            .collect()
    }

    pub fn any_interweaves(&self, deps: &DependencySet) -> bool {
        deps.iter().any(|t| self.is_interweave(t))
    }
}
