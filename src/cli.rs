//! CLI front door.
//!
//! Each `run_*` function performs one command and returns its JSON response
//! value; `main.rs` parses arguments, calls these and emits the result.
//!
//! ## Configuration
//!
//! An explicit `--config` file wins. Otherwise `paketti.toml` is looked up next
//! to the solution file, and defaults apply when there is none.
//!
//! ## Error Handling
//!
//! All functions return `Result<T, PakettiError>`. The error carries the stable
//! exit code used for the process status.

use std::io::{self, Write};
use std::path::Path;

use paketti_core::compile::{Compiler, StructuralCompiler};
use paketti_core::config::{CompilerMode, Config};
use paketti_core::diagnostics::UsingAnalyzer;
use paketti_core::error::{PakettiError, PakettiResult};
use paketti_core::format::{Formatter, SourceFormatter};
use paketti_core::model::Project;
use paketti_core::output::{BuildResponse, CheckResponse, ExtensionsResponse};
use paketti_core::sandbox::CommandCompiler;
use paketti_core::workspace::{save_solution, FileWorkspace, Workspace};
use paketti_engine::{
    BuildServices, InterweavePolicy, Library, ProjectAnalyzer, SolutionToLibraryBuilder,
};
use tracing::info;

/// Load the configuration for a solution.
pub fn load_config(explicit: Option<&Path>, solution: &Path) -> PakettiResult<Config> {
    match explicit {
        Some(path) => Config::load(path),
        None => {
            let dir = solution
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            Config::discover(dir)
        }
    }
}

/// The compiler oracle selected by the configuration.
pub fn make_compiler(config: &Config) -> Box<dyn Compiler> {
    match config.compiler.mode {
        CompilerMode::Structural => Box::new(StructuralCompiler),
        CompilerMode::Command => Box::new(
            CommandCompiler::new(config.compiler.sandbox())
                .with_formatter(Box::new(SourceFormatter::new(config.format.indent.clone()))),
        ),
    }
}

/// Build the package library of a solution.
///
/// The solution file itself is never modified. With `output`, the stripped
/// solution is written there as a new snapshot. With `show_tree`, every
/// stripped project is printed to stderr.
pub fn run_build(
    solution: &Path,
    config: &Config,
    output: Option<&Path>,
    show_tree: bool,
) -> PakettiResult<BuildResponse> {
    let workspace = FileWorkspace::open(solution)?;
    let policy = InterweavePolicy::from_config(&config.interweave);
    let formatter = SourceFormatter::new(config.format.indent.clone());
    let compiler = make_compiler(config);
    let services = BuildServices {
        compiler: compiler.as_ref(),
        formatter: &formatter,
        diagnostics: &UsingAnalyzer,
        policy: &policy,
    };

    let mut builder = SolutionToLibraryBuilder::new(services);
    if show_tree {
        builder = builder.after_rewrites(|project| print_tree(project, &formatter));
    }
    let build = builder.build_workspace(&workspace)?;

    let mut response = BuildResponse::new(
        solution.display().to_string(),
        build.snapshot_id,
        build.library.summary(build.stripped.projects.len()),
        build.library.infos(),
    );
    if let Some(path) = output {
        save_solution(path, &build.stripped)?;
        info!(path = %path.display(), "stripped solution written");
        response.stripped_solution = Some(path.display().to_string());
    }
    Ok(response)
}

/// Group the extension methods of every project by their non-runtime dependencies.
pub fn run_extensions(solution: &Path, config: &Config) -> PakettiResult<ExtensionsResponse> {
    let workspace = FileWorkspace::open(solution)?;
    let policy = InterweavePolicy::from_config(&config.interweave);
    let formatter = SourceFormatter::new(config.format.indent.clone());
    let analyzer = ProjectAnalyzer::new(&policy, &formatter);

    let mut library = Library::new();
    for project in &workspace.current_solution().projects {
        for package in analyzer.pack_extension_methods(project)?.packages() {
            library.add_or_merge(package.clone())?;
        }
    }
    Ok(ExtensionsResponse::new(
        solution.display().to_string(),
        library.infos(),
    ))
}

/// Check that every project compiles as it is.
pub fn run_check(solution: &Path, config: &Config) -> PakettiResult<CheckResponse> {
    let workspace = FileWorkspace::open(solution)?;
    let current = workspace.current_solution();
    let compiler = make_compiler(config);
    for project in &current.projects {
        compiler
            .compile(project)
            .map_err(|failure| PakettiError::PreconditionFailed {
                project: project.name.clone(),
                diagnostics: failure.text,
            })?;
    }
    Ok(CheckResponse::new(
        solution.display().to_string(),
        current.snapshot_id()?,
        current.projects.iter().map(|p| p.name.clone()).collect(),
    ))
}

fn print_tree(project: &Project, formatter: &dyn Formatter) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "== {} ==", project.name);
    for document in &project.documents {
        let _ = writeln!(stderr, "-- {}", document.name);
        let _ = writeln!(stderr, "{}", formatter.format_unit(&document.root));
    }
}
