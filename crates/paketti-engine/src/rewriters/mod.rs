//! Document rewriters and the extraction passes.
//!
//! A [`DocumentRewriter`] turns one document into a new version of itself.
//! The [`crate::transaction::SolutionRewriter`] applies it to every document
//! of a project in sequence, recompiling after each one when the rewriter
//! asks for it.
//!
//! The extraction passes work on whole projects instead: they select
//! declarations, render them into packages, then remove them (see
//! [`extract::remove_declarations`]).

mod ensure_partial;
pub mod extract;
mod remove_region;
mod remove_unused_usings;

use paketti_core::error::PakettiResult;
use paketti_core::model::Document;

use crate::context::DocumentContext;

pub use ensure_partial::EnsurePartial;
pub use extract::{
    remove_declarations, Extracted, ExtractInterwovenExtensionMethods,
    ExtractInterwovenTypeMembers, ExtractMemberContainers,
};
pub use remove_region::RemoveRegions;
pub use remove_unused_usings::RemoveUnusedUsings;

pub trait DocumentRewriter {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Whether the project must be recompiled after each rewritten document.
    fn requires_recompile(&self) -> bool;

    fn rewrite(&self, context: &DocumentContext<'_>) -> PakettiResult<Document>;
}
