use std::collections::HashSet;

use paketti_core::diagnostics::{DiagnosticProvider, DUPLICATE_USING, UNNECESSARY_USING};
use paketti_core::error::PakettiResult;
use paketti_core::model::{Document, NodeId};
use tracing::trace;

use super::DocumentRewriter;
use crate::context::DocumentContext;

/// Removes using directives the diagnostics provider flags as duplicate or
/// unnecessary.
pub struct RemoveUnusedUsings<'a> {
    diagnostics: &'a dyn DiagnosticProvider,
}

impl<'a> RemoveUnusedUsings<'a> {
    pub fn new(diagnostics: &'a dyn DiagnosticProvider) -> Self {
        RemoveUnusedUsings { diagnostics }
    }
}

impl DocumentRewriter for RemoveUnusedUsings<'_> {
    fn name(&self) -> &'static str {
        "remove-unused-usings"
    }

    fn requires_recompile(&self) -> bool {
        false
    }

    fn rewrite(&self, context: &DocumentContext<'_>) -> PakettiResult<Document> {
        let unused: HashSet<NodeId> = self
            .diagnostics
            .diagnostics(context.project, context.document)
            .into_iter()
            .filter(|d| d.id == DUPLICATE_USING || d.id == UNNECESSARY_USING)
            .filter_map(|d| d.node)
            .collect();
        if unused.is_empty() {
            return Ok(context.document.clone());
        }
        trace!(document = %context.document.name, count = unused.len(), "removing usings");
        let root = context.document.root.remove_nodes(&unused);
        Ok(context.document.with_root(root))
    }
}
