//! Confinement of tool paths to the workspace root.

use crate::ToolContext;
use keeper_rs_protocol::ToolError;
use std::path::{Component, Path, PathBuf};

/// Whether the resolved path has to exist already.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Target {
    MustExist,
    /// Write targets; only the nearest existing ancestor is checked.
    MayBeCreated,
}

/// Join a workspace-relative path onto the root and check it stays inside.
///
/// Lexical `..` that climbs above the root is rejected before touching the
/// filesystem; symlinks are caught afterwards by comparing canonical paths.
pub(super) fn resolve(ctx: &ToolContext, input: &str, target: Target) -> Result<PathBuf, ToolError> {
    if input.trim().is_empty() {
        return Err(invalid("path cannot be empty"));
    }
    let root = &ctx.services.workspace_root;
    let joined = join_lexically(root, Path::new(input))?;
    check_containment(root, &joined, target)?;
    Ok(joined)
}

/// `path` relative to `root` when it lives there, otherwise as given.
pub(super) fn display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

fn join_lexically(root: &Path, relative: &Path) -> Result<PathBuf, ToolError> {
    let mut depth = 0usize;
    let mut joined = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => {
                joined.push(part);
                depth += 1;
            }
            Component::ParentDir if depth > 0 => {
                joined.pop();
                depth -= 1;
            }
            Component::ParentDir => return Err(invalid("path escapes workspace root")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("path must be relative to workspace root"));
            }
        }
    }
    Ok(joined)
}

fn check_containment(root: &Path, path: &Path, target: Target) -> Result<(), ToolError> {
    let root = canonical(root, "workspace root")?;
    let anchor = match target {
        Target::MustExist => path,
        Target::MayBeCreated => path
            .ancestors()
            .find(|ancestor| ancestor.exists())
            .ok_or_else(|| ToolError::ExecutionFailed("path has no existing parent".to_string()))?,
    };
    if !canonical(anchor, "path")?.starts_with(&root) {
        return Err(ToolError::PermissionDenied(
            "path is outside workspace root".to_string(),
        ));
    }
    Ok(())
}

fn canonical(path: &Path, what: &str) -> Result<PathBuf, ToolError> {
    path.canonicalize().map_err(|err| {
        ToolError::ExecutionFailed(format!("failed to resolve {what} {}: {err}", path.display()))
    })
}

fn invalid(message: &str) -> ToolError {
    ToolError::InvalidArguments(message.to_string())
}
