//! Workspaces: the owner of the live solution snapshot.
//!
//! A workspace hands out its current solution and accepts a complete new
//! solution through [`Workspace::try_apply_changes`]. Applying either commits
//! the whole solution or fails leaving the workspace untouched.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{PakettiError, PakettiResult};
use crate::model::{ProjectId, Solution};

/// File extension a solution path must carry (compared case-insensitively).
pub const SOLUTION_EXTENSION: &str = "sln";

pub trait Workspace {
    /// A snapshot of the current solution.
    fn current_solution(&self) -> Solution;

    /// Replace the current solution with `solution`, atomically.
    fn try_apply_changes(&mut self, solution: Solution) -> PakettiResult<()>;
}

/// Project ids must be unchanged by a change set.
fn check_same_projects(current: &Solution, next: &Solution) -> PakettiResult<()> {
    let before: BTreeSet<ProjectId> = current.project_ids().into_iter().collect();
    let after: BTreeSet<ProjectId> = next.project_ids().into_iter().collect();
    if before != after {
        return Err(PakettiError::commit_rejected(format!(
            "change set adds or removes projects (had {:?}, got {:?})",
            before, after
        )));
    }
    Ok(())
}

// ============================================================================
// Ad-hoc workspace
// ============================================================================

/// In-memory workspace.
#[derive(Debug, Clone, Default)]
pub struct AdhocWorkspace {
    solution: Solution,
}

impl AdhocWorkspace {
    pub fn from_solution(solution: Solution) -> Self {
        AdhocWorkspace { solution }
    }

    /// Detached copy of another workspace's current solution.
    pub fn clone_of(workspace: &dyn Workspace) -> Self {
        AdhocWorkspace::from_solution(workspace.current_solution())
    }
}

impl Workspace for AdhocWorkspace {
    fn current_solution(&self) -> Solution {
        self.solution.clone()
    }

    fn try_apply_changes(&mut self, solution: Solution) -> PakettiResult<()> {
        check_same_projects(&self.solution, &solution)?;
        self.solution = solution;
        Ok(())
    }
}

// ============================================================================
// File workspace
// ============================================================================

/// Workspace backed by a `.sln` file holding the JSON solution snapshot.
#[derive(Debug, Clone)]
pub struct FileWorkspace {
    path: PathBuf,
    solution: Solution,
    /// Snapshot id of what is on disk as far as this workspace knows.
    base_snapshot: String,
}

impl FileWorkspace {
    /// Open and load a solution file.
    ///
    /// Fails for paths without the `.sln` extension and for missing files.
    pub fn open(path: impl AsRef<Path>) -> PakettiResult<Self> {
        let path = path.as_ref().to_path_buf();
        validate_solution_path(&path)?;
        let text = fs::read_to_string(&path)?;
        let solution: Solution = serde_json::from_str(&text)?;
        let base_snapshot = solution.snapshot_id()?;
        info!(
            path = %path.display(),
            projects = solution.projects.len(),
            snapshot = %base_snapshot,
            "loaded solution"
        );
        Ok(FileWorkspace {
            path,
            solution,
            base_snapshot,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file must still hold the snapshot this workspace was based on.
    fn check_not_stale(&self) -> PakettiResult<()> {
        let on_disk = fs::read_to_string(&self.path)
            .map_err(|e| PakettiError::commit_rejected(format!("{}: {}", self.path.display(), e)))?;
        let current = serde_json::from_str::<Solution>(&on_disk)
            .ok()
            .and_then(|s| s.snapshot_id().ok());
        if current.as_deref() != Some(self.base_snapshot.as_str()) {
            return Err(PakettiError::commit_rejected(format!(
                "{} changed on disk since it was loaded",
                self.path.display()
            )));
        }
        Ok(())
    }

    fn write_atomically(&self, solution: &Solution) -> std::io::Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        let json = serde_json::to_string_pretty(solution)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl Workspace for FileWorkspace {
    fn current_solution(&self) -> Solution {
        self.solution.clone()
    }

    fn try_apply_changes(&mut self, solution: Solution) -> PakettiResult<()> {
        check_same_projects(&self.solution, &solution)?;
        self.check_not_stale()?;
        let next_snapshot = solution.snapshot_id()?;
        self.write_atomically(&solution)
            .map_err(|e| PakettiError::commit_rejected(format!("{}: {}", self.path.display(), e)))?;
        debug!(path = %self.path.display(), snapshot = %next_snapshot, "solution written");
        self.solution = solution;
        self.base_snapshot = next_snapshot;
        Ok(())
    }
}

/// Check the extension, then existence.
pub fn validate_solution_path(path: &Path) -> PakettiResult<()> {
    let has_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SOLUTION_EXTENSION));
    if !has_extension {
        return Err(PakettiError::InvalidSolutionPath {
            path: path.to_path_buf(),
        });
    }
    if !path.is_file() {
        return Err(PakettiError::SolutionNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Write a solution to `path` as a new `.sln` snapshot file.
pub fn save_solution(path: &Path, solution: &Solution) -> PakettiResult<()> {
    let json = serde_json::to_string_pretty(solution)?;
    fs::write(path, format!("{}\n", json))?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompilationUnit, ProjectBuilder, TypeDecl};
    use tempfile::TempDir;

    fn solution() -> Solution {
        Solution::new(vec![ProjectBuilder::new("Demo", "Demo")
            .document("A.cs", CompilationUnit::new().member(TypeDecl::class("A")))
            .build()])
    }

    mod open {
        use super::*;

        #[test]
        fn rejects_wrong_extension() {
            let err = FileWorkspace::open("demo.txt").unwrap_err();
            assert!(matches!(err, PakettiError::InvalidSolutionPath { .. }));
        }

        #[test]
        fn rejects_missing_file() {
            let dir = TempDir::new().unwrap();
            let err = FileWorkspace::open(dir.path().join("missing.sln")).unwrap_err();
            assert!(matches!(err, PakettiError::SolutionNotFound { .. }));
        }

        #[test]
        fn extension_check_is_case_insensitive() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("Demo.SLN");
            save_solution(&path, &solution()).unwrap();
            let ws = FileWorkspace::open(&path).unwrap();
            assert_eq!(ws.current_solution(), solution());
        }
    }

    mod apply {
        use super::*;

        #[test]
        fn file_workspace_persists_changes() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("Demo.sln");
            save_solution(&path, &solution()).unwrap();

            let mut ws = FileWorkspace::open(&path).unwrap();
            let mut next = ws.current_solution();
            next.projects[0].name = "Renamed".into();
            ws.try_apply_changes(next.clone()).unwrap();

            let reloaded = FileWorkspace::open(&path).unwrap();
            assert_eq!(reloaded.current_solution(), next);
        }

        #[test]
        fn stale_base_is_rejected() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("Demo.sln");
            save_solution(&path, &solution()).unwrap();

            let mut ws = FileWorkspace::open(&path).unwrap();
            let mut concurrent = solution();
            concurrent.projects[0].name = "Elsewhere".into();
            save_solution(&path, &concurrent).unwrap();

            let err = ws.try_apply_changes(solution()).unwrap_err();
            assert!(matches!(err, PakettiError::CommitRejected { .. }));
            assert!(err.to_string().contains("changed on disk"));
            assert_eq!(FileWorkspace::open(&path).unwrap().current_solution(), concurrent);
        }

        #[test]
        fn changing_the_project_set_is_rejected() {
            let mut ws = AdhocWorkspace::from_solution(solution());
            let err = ws.try_apply_changes(Solution::default()).unwrap_err();
            assert!(matches!(err, PakettiError::CommitRejected { .. }));
            assert_eq!(ws.current_solution(), solution(), "no partial effect");
        }

        #[test]
        fn clone_of_is_detached() {
            let original = AdhocWorkspace::from_solution(solution());
            let mut copy = AdhocWorkspace::clone_of(&original);
            let mut next = copy.current_solution();
            next.projects[0].documents.clear();
            copy.try_apply_changes(next).unwrap();
            assert_eq!(original.current_solution().projects[0].documents.len(), 1);
        }
    }
}
