//! Search Engine: regex search over a single file or a directory tree,
//! bounded to a fixed recursion depth and skipping files that heuristically
//! look binary.

use std::path::{Path, PathBuf};

use envelope::{GrepMatch, GrepResult};
use regex::RegexBuilder;
use tokio::fs;
use tokio::io::AsyncReadExt;

use crate::error::{OpsError, OpsResult};
use crate::pathutil::normalize_lexical;

/// Maximum directory recursion depth below the search root. The root's
/// immediate children are depth 0; beyond [`MAX_SEARCH_DEPTH`] the subtree
/// is skipped rather than erroring.
pub const MAX_SEARCH_DEPTH: usize = 10;

/// Bytes sampled from the front of each file to decide if it's binary.
const BINARY_SAMPLE_BYTES: usize = 512;

/// Fraction of zero bytes in the sample above which a file is treated as
/// binary and skipped rather than searched.
const BINARY_ZERO_BYTE_THRESHOLD: f64 = 0.01;

async fn looks_binary(path: &Path) -> OpsResult<bool> {
    let mut file = fs::File::open(path).await?;
    let mut buf = vec![0u8; BINARY_SAMPLE_BYTES];
    let read = file.read(&mut buf).await?;
    if read == 0 {
        return Ok(false);
    }
    let zero_count = buf[..read].iter().filter(|b| **b == 0).count();
    Ok(zero_count as f64 / read as f64 >= BINARY_ZERO_BYTE_THRESHOLD)
}

/// Collects regular files under `dir`'s immediate children (`max_depth ==
/// 0`) or walked depth-first up to `max_depth` additional levels.
async fn collect_files(root: &Path, max_depth: usize) -> OpsResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![(root.to_path_buf(), 0usize)];
    while let Some((dir, depth)) = stack.pop() {
        let mut read_dir = fs::read_dir(&dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            let metadata = entry.metadata().await?;
            if metadata.is_dir() {
                if depth < max_depth {
                    stack.push((path, depth + 1));
                } else {
                    tracing::debug!(path = %path.display(), "grep: max recursion depth reached, skipping subtree");
                }
            } else if metadata.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn matches_in_file(path: &Path, content: &str, regex: &regex::Regex) -> Vec<GrepMatch> {
    let mut matches = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        for found in regex.find_iter(line) {
            matches.push(GrepMatch {
                path: path.to_string_lossy().to_string(),
                line_number: idx + 1,
                line: line.to_string(),
                match_start: found.start(),
                match_end: found.end(),
                matched_text: found.as_str().to_string(),
            });
        }
    }
    matches
}

/// Searches `target` for `pattern`. If `target` is a regular file, only
/// that file is searched regardless of `recursive`. If it is a directory,
/// `recursive == false` searches its immediate regular-file children only
/// (depth 0); `recursive == true` walks the tree up to `max_depth`
/// additional levels (the operations service wires this to
/// [`MAX_SEARCH_DEPTH`] by default, overridable via `OPS_SEARCH_MAX_DEPTH`).
pub async fn grep(
    target: &str,
    pattern: &str,
    case_sensitive: bool,
    recursive: bool,
    max_depth: usize,
) -> OpsResult<GrepResult> {
    let normalized = normalize_lexical(target);
    let path = normalized.as_path();
    let metadata = fs::metadata(path)
        .await
        .map_err(|_| OpsError::PathNotFound(target.to_string()))?;

    let regex = RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()?;

    let mut matches = Vec::new();
    let mut files_searched = 0usize;
    let mut files_skipped_binary = 0usize;

    let files = if metadata.is_file() {
        vec![path.to_path_buf()]
    } else if metadata.is_dir() {
        let max_depth = if recursive { max_depth } else { 0 };
        collect_files(path, max_depth).await?
    } else {
        return Err(OpsError::NotAFile(target.to_string()));
    };

    for file_path in files {
        if looks_binary(&file_path).await? {
            files_skipped_binary += 1;
            continue;
        }
        files_searched += 1;
        let raw = match fs::read(&file_path).await {
            Ok(raw) => raw,
            Err(_) => continue,
        };
        let content = String::from_utf8_lossy(&raw);
        matches.extend(matches_in_file(&file_path, &content, &regex));
    }

    Ok(GrepResult {
        pattern: pattern.to_string(),
        path: target.to_string(),
        recursive,
        total_matches: matches.len(),
        matches,
        files_searched,
        files_skipped_binary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::fs;

    #[tokio::test]
    async fn finds_matches_and_reports_line_numbers_and_offsets() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha\nbeta\nALPHA\n").await.unwrap();

        let result = grep(dir.path().to_str().unwrap(), "alpha", true, false, MAX_SEARCH_DEPTH).await.unwrap();
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].line_number, 1);
        assert_eq!(result.matches[0].match_start, 0);
        assert_eq!(result.matches[0].match_end, 5);
        assert_eq!(result.matches[0].matched_text, "alpha");

        let insensitive = grep(dir.path().to_str().unwrap(), "alpha", false, false, MAX_SEARCH_DEPTH).await.unwrap();
        assert_eq!(insensitive.matches.len(), 2);
    }

    #[tokio::test]
    async fn targeting_a_single_file_searches_only_that_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "needle\n").await.unwrap();
        fs::write(dir.path().join("b.txt"), "needle\n").await.unwrap();

        let result = grep(
            dir.path().join("a.txt").to_str().unwrap(),
            "needle",
            true,
            false,
            MAX_SEARCH_DEPTH,
        )
        .await
        .unwrap();
        assert_eq!(result.files_searched, 1);
        assert_eq!(result.matches.len(), 1);
    }

    #[tokio::test]
    async fn non_recursive_search_ignores_nested_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).await.unwrap();
        fs::write(dir.path().join("nested/inner.txt"), "needle").await.unwrap();
        fs::write(dir.path().join("top.txt"), "needle").await.unwrap();

        let flat = grep(dir.path().to_str().unwrap(), "needle", true, false, MAX_SEARCH_DEPTH).await.unwrap();
        assert_eq!(flat.matches.len(), 1);

        let deep = grep(dir.path().to_str().unwrap(), "needle", true, true, MAX_SEARCH_DEPTH).await.unwrap();
        assert_eq!(deep.matches.len(), 2);
    }

    #[tokio::test]
    async fn skips_files_that_look_binary() {
        let dir = tempdir().unwrap();
        let mut binary = vec![0u8; 600];
        binary[100] = b'a';
        fs::write(dir.path().join("blob.bin"), &binary).await.unwrap();
        fs::write(dir.path().join("plain.txt"), "a pattern here").await.unwrap();

        let result = grep(dir.path().to_str().unwrap(), "a", true, false, MAX_SEARCH_DEPTH).await.unwrap();
        assert_eq!(result.files_skipped_binary, 1);
        assert_eq!(result.files_searched, 1);
    }

    #[tokio::test]
    async fn invalid_pattern_is_rejected() {
        let dir = tempdir().unwrap();
        let err = grep(dir.path().to_str().unwrap(), "(unclosed", true, true, MAX_SEARCH_DEPTH).await.unwrap_err();
        assert!(matches!(err, OpsError::InvalidPattern(_)));
    }

    #[tokio::test]
    async fn respects_max_recursion_depth() {
        let dir = tempdir().unwrap();
        let mut current = dir.path().to_path_buf();
        for i in 0..(MAX_SEARCH_DEPTH + 3) {
            current = current.join(format!("d{i}"));
            fs::create_dir(&current).await.unwrap();
        }
        fs::write(current.join("deep.txt"), "needle").await.unwrap();

        let result = grep(dir.path().to_str().unwrap(), "needle", true, true, MAX_SEARCH_DEPTH).await.unwrap();
        assert!(result.matches.is_empty());
    }

    #[tokio::test]
    async fn max_depth_is_caller_configurable() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).await.unwrap();
        fs::write(dir.path().join("nested/inner.txt"), "needle").await.unwrap();

        let result = grep(dir.path().to_str().unwrap(), "needle", true, true, 0).await.unwrap();
        assert!(result.matches.is_empty());
    }
}
