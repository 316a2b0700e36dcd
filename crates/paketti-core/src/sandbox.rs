//! Sandboxed external compiler.
//!
//! [`CommandCompiler`] materializes a project into a temporary directory and
//! runs a configured build command there:
//! 1. Render every document with the configured [`Formatter`]
//! 2. Write the files plus a project manifest into a fresh temp dir
//! 3. Run the command (with `{dir}` replaced by the sandbox path) under a timeout
//! 4. Exit status 0 means the project compiles

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::compile::{CompileFailure, Compiler};
use crate::format::{Formatter, SourceFormatter};
use crate::model::Project;

/// Placeholder substituted with the sandbox directory in command arguments.
pub const DIR_PLACEHOLDER: &str = "{dir}";

// ============================================================================
// Sandbox Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Command and arguments; must not be empty.
    pub command: Vec<String>,
    /// Kill the command after this long.
    pub timeout: Duration,
    /// Leave the temp dir on disk when the compile fails.
    pub keep_on_failure: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        SandboxConfig {
            command: vec![
                "dotnet".to_string(),
                "build".to_string(),
                DIR_PLACEHOLDER.to_string(),
            ],
            timeout: Duration::from_secs(300),
            keep_on_failure: false,
        }
    }
}

impl SandboxConfig {
    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Result of one sandboxed command run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
    pub timed_out: bool,
}

impl CommandOutcome {
    /// stdout and stderr joined, trimmed.
    pub fn combined_output(&self) -> String {
        let mut out = self.stdout.trim_end().to_string();
        if !self.stderr.trim().is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(self.stderr.trim_end());
        }
        out
    }
}

// ============================================================================
// Command compiler
// ============================================================================

pub struct CommandCompiler {
    config: SandboxConfig,
    formatter: Box<dyn Formatter>,
}

impl CommandCompiler {
    pub fn new(config: SandboxConfig) -> Self {
        CommandCompiler {
            config,
            formatter: Box::new(SourceFormatter::default()),
        }
    }

    pub fn with_formatter(mut self, formatter: Box<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Write the project's documents under `dir`.
    ///
    /// Document paths are kept relative; absolute or parent-escaping paths
    /// are flattened to their file name.
    pub fn materialize(&self, project: &Project, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(project.documents.len() + 1);
        for document in &project.documents {
            let relative = document.path.as_deref().unwrap_or(&document.name);
            let target = dir.join(safe_relative(relative, &document.name));
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, self.formatter.format_unit(&document.root))?;
            written.push(target);
        }
        let manifest = dir.join(format!("{}.csproj", project.name));
        fs::write(&manifest, project_manifest(project))?;
        written.push(manifest);
        Ok(written)
    }

    /// Run the configured command inside `dir`.
    pub fn run_command(&self, dir: &Path) -> io::Result<CommandOutcome> {
        let command: Vec<String> = self
            .config
            .command
            .iter()
            .map(|arg| arg.replace(DIR_PLACEHOLDER, &dir.to_string_lossy()))
            .collect();
        let Some((program, args)) = command.split_first() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "Empty command"));
        };

        let start = Instant::now();
        let mut child = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env("PAKETTI_SANDBOX", "1")
            .spawn()?;

        // Readers run during the wait so a chatty build can't fill the pipe and stall.
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        // OS-level wait, no polling
        match child.wait_timeout(self.config.timeout)? {
            Some(status) => Ok(CommandOutcome {
                success: status.success(),
                exit_code: status.code(),
                stdout: join_reader(stdout),
                stderr: join_reader(stderr),
                duration: start.elapsed(),
                timed_out: false,
            }),
            None => {
                let _ = child.kill();
                let _ = child.wait();
                let duration = start.elapsed();
                warn!(?duration, ?command, "compile command timed out");
                Ok(CommandOutcome {
                    success: false,
                    exit_code: None,
                    stdout: String::new(),
                    stderr: format!(
                        "Command timed out after {:?} (limit: {:?})",
                        duration, self.config.timeout
                    ),
                    duration,
                    timed_out: true,
                })
            }
        }
    }
}

impl Compiler for CommandCompiler {
    fn compile(&self, project: &Project) -> Result<(), CompileFailure> {
        let sandbox = TempDir::with_prefix("paketti-")
            .map_err(|e| CompileFailure::from_output(format!("failed to create sandbox: {}", e)))?;
        self.materialize(project, sandbox.path())
            .map_err(|e| CompileFailure::from_output(format!("failed to write sandbox: {}", e)))?;

        let outcome = self
            .run_command(sandbox.path())
            .map_err(|e| CompileFailure::from_output(format!("failed to run compiler: {}", e)))?;
        debug!(
            project = %project.name,
            success = outcome.success,
            exit_code = ?outcome.exit_code,
            "sandbox compile finished"
        );

        if outcome.success {
            return Ok(());
        }
        if self.config.keep_on_failure {
            let kept = sandbox.keep();
            warn!(path = %kept.display(), "keeping sandbox after failed compile");
        }
        Err(CompileFailure::from_output(outcome.combined_output()))
    }
}

fn spawn_reader<R: Read + Send + 'static>(stream: Option<R>) -> Option<JoinHandle<String>> {
    stream.map(|mut s| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            s.read_to_end(&mut buf).ok();
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn join_reader(reader: Option<JoinHandle<String>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn safe_relative(path: &str, fallback: &str) -> PathBuf {
    let candidate = Path::new(path);
    let escapes = candidate.is_absolute()
        || candidate
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir));
    if escapes {
        PathBuf::from(candidate.file_name().map_or_else(
            || fallback.to_string(),
            |n| n.to_string_lossy().into_owned(),
        ))
    } else {
        candidate.to_path_buf()
    }
}

fn project_manifest(project: &Project) -> String {
    format!(
        "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n    <OutputType>Library</OutputType>\n    <AssemblyName>{}</AssemblyName>\n    <TargetFramework>netstandard2.0</TargetFramework>\n  </PropertyGroup>\n</Project>\n",
        project.assembly_name
    )
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

// ============================================================================
// Tests
// ============================================================================
