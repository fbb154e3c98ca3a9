//! Path canonicalization shared by every engine that accepts a `path`
//! parameter (§3 invariants): `.` and `..` components are always removed
//! before the path touches the filesystem; symbolic links are resolved only
//! for `list_directory`, which is allowed to require the target already
//! exist. The other operations normalize lexically so a not-yet-created
//! `create_file` target doesn't fail just because it can't be `canonicalize`d.

use std::path::{Component, Path, PathBuf};

/// Removes `.` and `..` components without touching the filesystem. A
/// leading `..` past the root is simply dropped, matching the library's
/// typical leniency for caller-supplied relative paths.
pub fn normalize_lexical(path: &str) -> PathBuf {
    let mut out = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::ParentDir => {
                if !matches!(out.components().next_back(), None | Some(Component::RootDir)) {
                    out.pop();
                }
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Resolves symlinks and normalizes `path`, for operations that require the
/// target to already exist (`list_directory`). Falls back to lexical
/// normalization if the path does not exist yet or resolution otherwise
/// fails — callers still run their own existence checks and surface
/// `PATH_NOT_FOUND` themselves.
pub fn normalize_resolving(path: &str) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| normalize_lexical(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_dot_and_curdir_components() {
        assert_eq!(normalize_lexical("/a/./b"), PathBuf::from("/a/b"));
    }

    #[test]
    fn resolves_parent_dir_components() {
        assert_eq!(normalize_lexical("/a/b/../c"), PathBuf::from("/a/c"));
    }

    #[test]
    fn does_not_escape_root() {
        assert_eq!(normalize_lexical("/../../etc"), PathBuf::from("/etc"));
    }

    #[test]
    fn relative_parent_dir_pops_within_relative_path() {
        assert_eq!(normalize_lexical("a/b/../../c"), PathBuf::from("c"));
    }
}
