/// Repository discovery for git-aware listings.
///
/// A listing probes for a repository once, up front, then reuses the result
/// for every entry. [`FsGitStatus`] discovers repositories straight from the
/// working tree, so entries classify as git-tracked without talking to a git
/// binary or library.

use std::path::{Path, PathBuf};

use compact_str::CompactString;

use crate::services::GitStatusSource;

/// Result of the per-listing repository probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoContext {
    pub root: PathBuf,
    pub head_name: CompactString,
}

/// Locate the repository containing `dir`.
///
/// Returns `Some` only when a root is found and its HEAD carries a usable
/// name; a repository with an unreadable or empty HEAD lists as plain
/// entries.
pub fn probe_repository(source: &dyn GitStatusSource, dir: &Path) -> Option<RepoContext> {
    let root = source.repository_root(dir)?;
    let Some(head_name) = source.head_name(&root).filter(|name| !name.is_empty()) else {
        tracing::debug!("repository at {} has no usable HEAD", root.display());
        return None;
    };
    Some(RepoContext {
        root,
        head_name: CompactString::new(head_name),
    })
}

/// On-disk repository discovery: walks ancestors for a `.git` directory,
/// following worktree pointer files, and reads HEAD directly.
pub struct FsGitStatus;

impl GitStatusSource for FsGitStatus {
    fn repository_root(&self, dir: &Path) -> Option<PathBuf> {
        dir.ancestors()
            .find(|candidate| git_dir(candidate).is_some())
            .map(Path::to_path_buf)
    }

    fn head_name(&self, root: &Path) -> Option<String> {
        let git_dir = git_dir(root)?;
        let head = std::fs::read_to_string(git_dir.join("HEAD")).ok()?;
        let head = head.trim();
        let name = if let Some(reference) = head.strip_prefix("ref:") {
            let reference = reference.trim();
            // Keep nested branch names intact, e.g. "feature/streams".
            reference
                .strip_prefix("refs/heads/")
                .unwrap_or(reference)
                .to_owned()
        } else {
            // Detached HEAD holds a raw commit hash; show it short.
            head.chars().take(7).collect()
        };
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

/// The metadata directory behind `root`, if `root` is a repository.
///
/// Worktrees replace the `.git` directory with a `gitdir: <path>` pointer
/// file; a pointer that does not parse means no repository.
fn git_dir(root: &Path) -> Option<PathBuf> {
    let dot_git = root.join(".git");
    if dot_git.is_dir() {
        return Some(dot_git);
    }
    let pointer = std::fs::read_to_string(&dot_git).ok()?;
    let target = pointer.strip_prefix("gitdir:")?.trim();
    if target.is_empty() {
        return None;
    }
    let target = Path::new(target);
    if target.is_absolute() {
        Some(target.to_path_buf())
    } else {
        Some(root.join(target))
    }
}
