//! Workspace path confinement for the file tools.

use std::path::{Component, Path, PathBuf};

/// Resolve `name` against the workspace root, rejecting anything that
/// would land outside it. The leaf may not exist yet, so the lexical
/// check is followed by canonicalizing the deepest existing ancestor,
/// which catches symlinks inside the workspace pointing out of it.
pub(crate) fn resolve_in_workspace(workspace: &Path, name: &str) -> Result<PathBuf, String> {
    let root = workspace
        .canonicalize()
        .map_err(|e| format!("workspace directory is not accessible: {e}"))?;

    let candidate = Path::new(name);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };

    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !resolved.pop() {
                    return Err(format!("path '{name}' escapes the workspace"));
                }
            }
            other => resolved.push(other.as_os_str()),
        }
    }

    if !resolved.starts_with(&root) {
        return Err(format!("path '{name}' is outside the workspace"));
    }

    // The lexical check cannot see through symlinks already on disk, so
    // follow the existing part of the path and re-check where it leads.
    let mut ancestor = resolved.as_path();
    while !ancestor.exists() {
        ancestor = ancestor
            .parent()
            .ok_or_else(|| format!("path '{name}' is outside the workspace"))?;
    }
    let real = ancestor
        .canonicalize()
        .map_err(|e| format!("path '{name}' is not accessible: {e}"))?;
    if !real.starts_with(&root) {
        return Err(format!("path '{name}' is outside the workspace"));
    }

    Ok(resolved)
}
