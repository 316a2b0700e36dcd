use paketti_core::error::PakettiResult;
use paketti_core::model::{Document, Trivia};

use super::DocumentRewriter;
use crate::context::DocumentContext;

/// Strips `#region` and `#endregion` directives, wherever they are attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveRegions;

impl DocumentRewriter for RemoveRegions {
    fn name(&self) -> &'static str {
        "remove-regions"
    }

    fn requires_recompile(&self) -> bool {
        false
    }

    fn rewrite(&self, context: &DocumentContext<'_>) -> PakettiResult<Document> {
        let root = context
            .document
            .root
            .retain_trivia(&|trivia: &Trivia| !trivia.is_region());
        Ok(context.document.with_root(root))
    }
}
