//! Workspace doubles.

#![allow(dead_code)]

use paketti::error::{PakettiError, PakettiResult};
use paketti::model::Solution;
use paketti::workspace::Workspace;

/// A workspace that refuses every change set.
pub struct RejectingWorkspace {
    solution: Solution,
    pub attempts: usize,
}

impl RejectingWorkspace {
    pub fn new(solution: Solution) -> Self {
        RejectingWorkspace {
            solution,
            attempts: 0,
        }
    }
}

impl Workspace for RejectingWorkspace {
    fn current_solution(&self) -> Solution {
        self.solution.clone()
    }

    fn try_apply_changes(&mut self, _solution: Solution) -> PakettiResult<()> {
        self.attempts += 1;
        Err(PakettiError::commit_rejected("read-only workspace"))
    }
}
