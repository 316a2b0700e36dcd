//! Selection of the declarations each extraction pass moves.

use paketti_core::error::{PakettiError, PakettiResult};
use tracing::debug;

use crate::context::DeclInfo;
use crate::interweave::InterweavePolicy;
use crate::walker::{DependencySet, DependencyWalker};

/// A selected declaration and the dependencies that got it selected.
#[derive(Debug, Clone)]
pub struct Selected<'p> {
    pub info: DeclInfo<'p>,
    pub dependencies: DependencySet,
}

#[derive(Debug, Clone, Copy)]
pub struct ContentSelector<'a> {
    policy: &'a InterweavePolicy,
}

impl<'a> ContentSelector<'a> {
    pub fn new(policy: &'a InterweavePolicy) -> Self {
        ContentSelector { policy }
    }

    pub fn policy(&self) -> &'a InterweavePolicy {
        self.policy
    }

    /// Extension methods with at least one interweave dependency.
    pub fn interwoven_extension_methods<'p>(
        &self,
        walker: &mut DependencyWalker<'p>,
    ) -> Vec<Selected<'p>> {
        let context = walker.context();
        let selected: Vec<Selected<'p>> = context
            .extension_methods()
            .into_iter()
            .filter_map(|info| {
                let dependencies = walker.dependencies(&info.declaration);
                self.policy.any_interweaves(&dependencies).then(|| Selected {
                    info: info.clone(),
                    dependencies,
                })
            })
            .collect();
        debug!(count = selected.len(), "interwoven extension methods");
        selected
    }

    /// Non-extension type members that depend on an interweave other than
    /// their own containing type.
    ///
    /// Every selected member must sit inside a type.
    pub fn interwoven_type_members_except_extensions<'p>(
        &self,
        walker: &mut DependencyWalker<'p>,
    ) -> PakettiResult<Vec<Selected<'p>>> {
        let context = walker.context();
        let mut selected = Vec::new();
        let mut orphans = Vec::new();
        for info in context.type_members_excluding_extensions() {
            let dependencies = walker.dependencies(&info.declaration);
            let own = info.containing_type_open_name();
            let interwoven = dependencies.iter().any(|t| {
                self.policy.is_interweave(t) && own.as_deref() != Some(t.open_name())
            });
            if !interwoven {
                continue;
            }
            if info.containing_type.is_none() {
                orphans.push(info.qualified_name());
                continue;
            }
            selected.push(Selected {
                info: info.clone(),
                dependencies,
            });
        }
        if !orphans.is_empty() {
            return Err(PakettiError::invariant(format!(
                "Every type member should have a containing type. These did not: {}",
                orphans.join(", ")
            )));
        }
        debug!(count = selected.len(), "interwoven type members");
        Ok(selected)
    }

    /// Every top-level class and struct, regardless of dependencies.
    pub fn member_containers<'p>(&self, walker: &mut DependencyWalker<'p>) -> Vec<Selected<'p>> {
        walker
            .context()
            .top_level_types()
            .into_iter()
            .map(|info| Selected {
                info: info.clone(),
                dependencies: DependencySet::new(),
            })
            .collect()
    }
}
