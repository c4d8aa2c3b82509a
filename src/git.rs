use std::process::Command;

use log::debug;

use crate::error::{GlciError, Result};

/// Source of the branch name used when no explicit ref is given.
pub trait CurrentBranch {
    fn current_branch(&self) -> Result<String>;
}

/// The git checkout in the process working directory.
pub struct GitRepo;

impl CurrentBranch for GitRepo {
    fn current_branch(&self) -> Result<String> {
        let output = Command::new("git")
            .args(["rev-parse", "--abbrev-ref", "HEAD"])
            .output()
            .map_err(|e| GlciError::Git(format!("Failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GlciError::Git(stderr.trim().to_string()));
        }

        let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
        // Detached HEAD has no branch to filter pipelines by
        if branch.is_empty() || branch == "HEAD" {
            return Err(GlciError::Git("Not on a branch (detached HEAD)".into()));
        }

        debug!("Current branch: {branch}");
        Ok(branch)
    }
}
