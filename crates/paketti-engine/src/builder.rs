//! Library builders: the full extraction pipeline.
//!
//! For one project the pipeline is:
//!
//! 1. make every top-level class and struct `partial`;
//! 2. strip region directives;
//! 3. drop unused usings;
//! 4. extract interwoven extension methods;
//! 5. extract interwoven type members;
//! 6. extract what is left of every class and struct as member containers;
//! 7. drop the usings that became unused.
//!
//! Every step must leave the project compiling. Each step commits to the
//! workspace it was given, so the solution builder always works on a detached
//! copy and never touches the workspace the solution was loaded from.

use std::path::Path;

use paketti_core::compile::Compiler;
use paketti_core::diagnostics::DiagnosticProvider;
use paketti_core::error::{PakettiError, PakettiResult};
use paketti_core::format::Formatter;
use paketti_core::model::{Project, ProjectId, Solution};
use paketti_core::workspace::{AdhocWorkspace, FileWorkspace, Workspace};
use tracing::{info, info_span};

use crate::context::ProjectContext;
use crate::interweave::InterweavePolicy;
use crate::library::Library;
use crate::rewriters::{
    EnsurePartial, Extracted, ExtractInterwovenExtensionMethods, ExtractInterwovenTypeMembers,
    ExtractMemberContainers, RemoveRegions, RemoveUnusedUsings,
};
use crate::selector::ContentSelector;
use crate::transaction::SolutionRewriter;
use crate::walker::DependencyWalker;

/// Callback run with the fully stripped project.
pub type AfterRewrites<'a> = Box<dyn FnMut(&Project) + 'a>;

/// The services every build step needs.
#[derive(Clone, Copy)]
pub struct BuildServices<'a> {
    pub compiler: &'a dyn Compiler,
    pub formatter: &'a dyn Formatter,
    pub diagnostics: &'a dyn DiagnosticProvider,
    pub policy: &'a InterweavePolicy,
}

// ============================================================================
// Project builder
// ============================================================================

pub struct ProjectToLibraryBuilder<'a> {
    services: BuildServices<'a>,
    after_rewrites: Option<AfterRewrites<'a>>,
}

impl<'a> ProjectToLibraryBuilder<'a> {
    pub fn new(services: BuildServices<'a>) -> Self {
        ProjectToLibraryBuilder {
            services,
            after_rewrites: None,
        }
    }

    /// Register a callback to inspect the stripped project.
    pub fn after_rewrites(mut self, hook: impl FnMut(&Project) + 'a) -> Self {
        self.after_rewrites = Some(Box::new(hook));
        self
    }

    /// Run the pipeline on `project` in `workspace`, adding packages to `library`.
    ///
    /// Returns the stripped project, which is also committed to `workspace`.
    pub fn build(
        &mut self,
        workspace: &mut dyn Workspace,
        project: ProjectId,
        library: &mut Library,
    ) -> PakettiResult<Project> {
        let rewriter = SolutionRewriter::new(self.services.compiler);
        let unused_usings = RemoveUnusedUsings::new(self.services.diagnostics);

        let name = current_project(workspace, project)?.name;
        let _span = info_span!("build_project", project = %name).entered();

        rewriter.rewrite_project(workspace, project, &[&EnsurePartial])?;
        rewriter.rewrite_project(workspace, project, &[&RemoveRegions])?;
        rewriter.rewrite_project(workspace, project, &[&unused_usings])?;

        let selector = ContentSelector::new(self.services.policy);
        let formatter = self.services.formatter;

        self.extract(workspace, project, library, "extract interwoven extension methods", |walker| {
            ExtractInterwovenExtensionMethods::new(selector, formatter).extract(walker)
        })?;
        self.extract(workspace, project, library, "extract interwoven type members", |walker| {
            ExtractInterwovenTypeMembers::new(selector, formatter).extract(walker)
        })?;
        self.extract(workspace, project, library, "extract member containers", |walker| {
            ExtractMemberContainers::new(selector, formatter).extract(walker)
        })?;

        rewriter.rewrite_project(workspace, project, &[&unused_usings])?;

        let stripped = current_project(workspace, project)?;
        if let Some(hook) = self.after_rewrites.as_mut() {
            hook(&stripped);
        }
        info!(packages = library.len(), "project packed");
        Ok(stripped)
    }

    fn extract(
        &self,
        workspace: &mut dyn Workspace,
        project: ProjectId,
        library: &mut Library,
        stage: &str,
        pass: impl FnOnce(&mut DependencyWalker<'_>) -> PakettiResult<Extracted>,
    ) -> PakettiResult<()> {
        let solution = workspace.current_solution();
        let current = solution
            .project(project)
            .ok_or_else(|| missing_project(project))?;
        let context = ProjectContext::new(current);
        let mut walker = DependencyWalker::new(&context);
        let extracted = pass(&mut walker)?;

        SolutionRewriter::new(self.services.compiler).ensure_compiles(&extracted.project, stage)?;
        let count = extracted.removed_count();
        workspace.try_apply_changes(solution.with_project(extracted.project))?;
        for package in extracted.packages {
            library.add_or_merge(package)?;
        }
        info!(stage, extracted = count, "extraction committed");
        Ok(())
    }
}

fn current_project(workspace: &dyn Workspace, id: ProjectId) -> PakettiResult<Project> {
    workspace
        .current_solution()
        .project(id)
        .cloned()
        .ok_or_else(|| missing_project(id))
}

fn missing_project(id: ProjectId) -> PakettiError {
    PakettiError::invalid_args(format!("no project with id {} in the workspace", id))
}

// ============================================================================
// Solution builder
// ============================================================================

/// What a solution build produced.
#[derive(Debug, Clone)]
pub struct LibraryBuild {
    pub library: Library,
    /// The solution with every extracted declaration removed.
    pub stripped: Solution,
    /// Content hash of the solution before any rewrite.
    pub snapshot_id: String,
}

pub struct SolutionToLibraryBuilder<'a> {
    project_builder: ProjectToLibraryBuilder<'a>,
}

impl<'a> SolutionToLibraryBuilder<'a> {
    pub fn new(services: BuildServices<'a>) -> Self {
        SolutionToLibraryBuilder {
            project_builder: ProjectToLibraryBuilder::new(services),
        }
    }

    /// Register a callback run once per project with its stripped form.
    pub fn after_rewrites(mut self, hook: impl FnMut(&Project) + 'a) -> Self {
        self.project_builder = self.project_builder.after_rewrites(hook);
        self
    }

    /// Load the solution file at `path` and build its library.
    pub fn build(&mut self, path: &Path) -> PakettiResult<LibraryBuild> {
        let workspace = FileWorkspace::open(path)?;
        self.build_workspace(&workspace)
    }

    /// Build from a workspace without modifying it.
    pub fn build_workspace(&mut self, workspace: &dyn Workspace) -> PakettiResult<LibraryBuild> {
        let original = workspace.current_solution();
        let snapshot_id = original.snapshot_id()?;
        let projects = original.project_ids();
        if projects.is_empty() {
            return Err(PakettiError::invalid_args("the solution has no projects"));
        }

        let mut scratch = AdhocWorkspace::clone_of(workspace);
        let mut library = Library::new();
        for project in projects {
            self.project_builder.build(&mut scratch, project, &mut library)?;
        }
        info!(packages = library.len(), snapshot = %snapshot_id, "library built");
        Ok(LibraryBuild {
            library,
            stripped: scratch.current_solution(),
            snapshot_id,
        })
    }
}
