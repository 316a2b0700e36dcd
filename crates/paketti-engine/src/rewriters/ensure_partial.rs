use paketti_core::error::PakettiResult;
use paketti_core::model::{Document, TypeDecl};

use super::DocumentRewriter;
use crate::context::DocumentContext;

const PARTIAL: &str = "partial";

/// Adds the `partial` modifier to every top-level class and struct lacking it.
///
/// Nested types are left as they are: they move together with their container.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnsurePartial;

impl DocumentRewriter for EnsurePartial {
    fn name(&self) -> &'static str {
        "ensure-partial"
    }

    fn requires_recompile(&self) -> bool {
        true
    }

    fn rewrite(&self, context: &DocumentContext<'_>) -> PakettiResult<Document> {
        let root = context.document.root.map_top_level_types(&mut |ty: &TypeDecl| {
            let mut ty = ty.clone();
            if !ty.is_partial() {
                // `partial` must come right before the type keyword.
                ty.modifiers.push(PARTIAL.to_string());
            }
            ty
        });
        Ok(context.document.with_root(root))
    }
}
