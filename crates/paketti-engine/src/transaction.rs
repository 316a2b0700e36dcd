//! Transactional application of document rewriters.
//!
//! The flow for one call is:
//!
//! 1. Snapshot the workspace's current solution.
//! 2. Require every target project to compile before anything is touched.
//! 3. For each rewriter in order, for each rewritable document of each target
//!    project: rebuild the document context from the latest project, rewrite,
//!    fold the result into the solution, and recompile the project if the
//!    rewriter asks for it.
//! 4. Hand the complete new solution to the workspace in a single commit.
//!
//! Any failure before step 4 leaves the workspace exactly as it was.

use paketti_core::compile::Compiler;
use paketti_core::error::{PakettiError, PakettiResult};
use paketti_core::model::{DocumentId, Project, ProjectId, Solution};
use paketti_core::workspace::Workspace;
use tracing::{debug, info, info_span, warn};

use crate::context::DocumentContext;
use crate::rewriters::DocumentRewriter;

pub struct SolutionRewriter<'a> {
    compiler: &'a dyn Compiler,
}

impl<'a> SolutionRewriter<'a> {
    pub fn new(compiler: &'a dyn Compiler) -> Self {
        SolutionRewriter { compiler }
    }

    /// Apply `rewriters` to every project and commit.
    pub fn rewrite_solution(
        &self,
        workspace: &mut dyn Workspace,
        rewriters: &[&dyn DocumentRewriter],
    ) -> PakettiResult<Solution> {
        let solution = workspace.current_solution();
        let targets = solution.project_ids();
        self.apply_and_commit(workspace, solution, &targets, rewriters)
    }

    /// Apply `rewriters` to one project and commit.
    pub fn rewrite_project(
        &self,
        workspace: &mut dyn Workspace,
        project: ProjectId,
        rewriters: &[&dyn DocumentRewriter],
    ) -> PakettiResult<Solution> {
        let solution = workspace.current_solution();
        if solution.project(project).is_none() {
            return Err(PakettiError::invalid_args(format!(
                "no project with id {} in the workspace",
                project
            )));
        }
        self.apply_and_commit(workspace, solution, &[project], rewriters)
    }

    /// Compile `project`, mapping a failure to the error for `stage`.
    pub fn ensure_compiles(&self, project: &Project, stage: &str) -> PakettiResult<()> {
        self.compiler.compile(project).map_err(|failure| {
            warn!(project = %project.name, stage, "project no longer compiles");
            PakettiError::CompileFailed {
                project: project.name.clone(),
                stage: stage.to_string(),
                diagnostics: failure.text,
            }
        })
    }

    fn apply_and_commit(
        &self,
        workspace: &mut dyn Workspace,
        solution: Solution,
        targets: &[ProjectId],
        rewriters: &[&dyn DocumentRewriter],
    ) -> PakettiResult<Solution> {
        for id in targets {
            let Some(project) = solution.project(*id) else {
                continue;
            };
            self.compiler.compile(project).map_err(|failure| {
                warn!(project = %project.name, "project does not compile before rewriting");
                PakettiError::PreconditionFailed {
                    project: project.name.clone(),
                    diagnostics: failure.text,
                }
            })?;
        }

        let mut solution = solution;
        for rewriter in rewriters {
            let _span = info_span!("rewriter", name = rewriter.name()).entered();
            for id in targets {
                solution = self.rewrite_project_documents(solution, *id, *rewriter)?;
            }
        }

        workspace.try_apply_changes(solution.clone())?;
        info!(projects = targets.len(), rewriters = rewriters.len(), "rewrite committed");
        Ok(solution)
    }

    fn rewrite_project_documents(
        &self,
        solution: Solution,
        id: ProjectId,
        rewriter: &dyn DocumentRewriter,
    ) -> PakettiResult<Solution> {
        let Some(project) = solution.project(id) else {
            return Ok(solution);
        };
        let documents: Vec<DocumentId> = project
            .documents
            .iter()
            .filter(|d| d.is_rewritable())
            .map(|d| d.id)
            .collect();

        let mut project = project.clone();
        for document_id in documents {
            let Some(document) = project.document(document_id) else {
                continue;
            };
            let context = DocumentContext::new(&project, document);
            let rewritten =
                rewriter
                    .rewrite(&context)
                    .map_err(|e| PakettiError::RewriteFailed {
                        rewriter: rewriter.name().to_string(),
                        document: document.name.clone(),
                        message: e.to_string(),
                    })?;
            if rewritten == *document {
                continue;
            }
            debug!(document = %document.name, "document rewritten");
            project = project.with_document(rewritten);
            if rewriter.requires_recompile() {
                self.ensure_compiles(&project, rewriter.name())?;
            }
        }
        Ok(solution.with_project(project))
    }
}
