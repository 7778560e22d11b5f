//! Version-control operations
//!
//! Git is driven as an external tool through the command runner. Updates
//! are idempotent: the repository's current exact tag or commit is probed
//! speculatively first, and no mutating command runs when the checkout is
//! already at the target revision.

use std::fmt;
use std::path::Path;

use crate::config::defaults;
use crate::error::GitError;
use crate::infra::process::{probe, run_checked, CommandRunner, CommandSpec};

/// A checkout target: exact tag, floating branch, or pinned commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitRef {
    /// Release tag (e.g. "v5.3.0")
    Tag(String),
    /// Branch name (e.g. "master")
    Branch(String),
    /// Commit hash, full or abbreviated
    Rev(String),
}

impl GitRef {
    /// The raw ref string
    pub fn as_str(&self) -> &str {
        match self {
            Self::Tag(s) | Self::Branch(s) | Self::Rev(s) => s,
        }
    }
}

impl fmt::Display for GitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(s) => write!(f, "tag '{s}'"),
            Self::Branch(s) => write!(f, "branch '{s}'"),
            Self::Rev(s) => write!(f, "rev '{s}'"),
        }
    }
}

/// Clone the repository unless a checkout already exists at `src`.
///
/// A directory containing a `.git` marker counts as checked out and the
/// call is a no-op; otherwise the repository is cloned and pinned to the
/// target ref via [`update`].
pub fn checkout(
    runner: &dyn CommandRunner,
    url: &str,
    target: &GitRef,
    src: &Path,
) -> Result<(), GitError> {
    if src.join(".git").exists() {
        tracing::debug!(path = %src.display(), "already checked out");
        return Ok(());
    }
    let clone = CommandSpec::new("git")
        .arg("clone")
        .arg(url)
        .arg(src.display().to_string());
    run_checked(runner, &clone)?;
    update(runner, target, src)
}

/// Bring an existing checkout to the target ref.
///
/// Re-invoking when the checkout is already at an exact target tag or
/// commit runs no mutating command. Branch targets always fetch and
/// fast-forward, since branches float.
pub fn update(runner: &dyn CommandRunner, target: &GitRef, src: &Path) -> Result<(), GitError> {
    if already_at_target(runner, target, src) {
        tracing::info!(path = %src.display(), "already at {target}, skipping update");
        return Ok(());
    }

    let fetch = CommandSpec::new("git")
        .args(["fetch", "--tags", "origin"])
        .current_dir(src);
    run_checked(runner, &fetch)?;

    match target {
        GitRef::Tag(name) => {
            let checkout = CommandSpec::new("git")
                .args(["checkout", name.as_str()])
                .current_dir(src);
            run_checked(runner, &checkout)?;
        }
        GitRef::Rev(rev) => {
            let checkout = CommandSpec::new("git")
                .args(["checkout", rev.as_str()])
                .current_dir(src);
            run_checked(runner, &checkout)?;
        }
        GitRef::Branch(requested) => {
            let branch = resolve_branch(runner, src, requested)?;
            let checkout = CommandSpec::new("git")
                .args(["checkout", branch.as_str()])
                .current_dir(src);
            run_checked(runner, &checkout)?;
            let pull = CommandSpec::new("git")
                .args(["pull", "--ff-only", "origin", branch.as_str()])
                .current_dir(src);
            run_checked(runner, &pull)?;
        }
    }
    Ok(())
}

/// Speculative idempotency check: is the checkout already at the target?
fn already_at_target(runner: &dyn CommandRunner, target: &GitRef, src: &Path) -> bool {
    match target {
        GitRef::Tag(name) => {
            let describe = CommandSpec::new("git")
                .args(["describe", "--tags", "--exact-match"])
                .current_dir(src);
            probe(runner, &describe).as_deref() == Some(name.as_str())
        }
        GitRef::Rev(rev) => {
            let head = CommandSpec::new("git")
                .args(["rev-parse", "HEAD"])
                .current_dir(src);
            // Abbreviated pins match by prefix
            probe(runner, &head)
                .map(|current| current.to_lowercase().starts_with(&rev.to_lowercase()))
                .unwrap_or(false)
        }
        GitRef::Branch(_) => false,
    }
}

/// Resolve the branch to check out, falling back from the default main
/// branch to the development branch when the remote lacks the former.
fn resolve_branch(
    runner: &dyn CommandRunner,
    src: &Path,
    requested: &str,
) -> Result<String, GitError> {
    if branch_exists(runner, src, requested) {
        return Ok(requested.to_string());
    }
    if requested == defaults::DEFAULT_MAIN_BRANCH
        && branch_exists(runner, src, defaults::FALLBACK_BRANCH)
    {
        tracing::warn!(
            "branch '{requested}' not found, falling back to '{}'",
            defaults::FALLBACK_BRANCH
        );
        return Ok(defaults::FALLBACK_BRANCH.to_string());
    }
    Err(GitError::RefNotFound {
        path: src.to_path_buf(),
        reference: requested.to_string(),
    })
}

fn branch_exists(runner: &dyn CommandRunner, src: &Path, branch: &str) -> bool {
    let verify = CommandSpec::new("git")
        .args(["rev-parse", "--verify", "--quiet"])
        .arg(format!("origin/{branch}"))
        .current_dir(src);
    probe(runner, &verify).is_some()
}
