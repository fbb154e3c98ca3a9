//! File Engine: `list_directory`, `read_file` (whole or as a 1024-character
//! window), `create_file`, `edit_file`, `append_file`.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use chrono::{DateTime, Utc};
use envelope::{CreateEditAppendResult, FileDescriptor, FileKind, ListDirectoryResult, ReadFileResult, WriteKind};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{OpsError, OpsResult};
use crate::pathutil::{normalize_lexical, normalize_resolving};

/// Characters per `read_file` chunk window (see §4.2 / SPEC_FULL §D).
pub const READ_CHUNK_SIZE: usize = 1024;

fn permissions_string(mode: u32, is_dir: bool) -> String {
    let kind = if is_dir { 'd' } else { '-' };
    let bit = |shift: u32, ch: char| if mode & (1 << shift) != 0 { ch } else { '-' };
    format!(
        "{kind}{}{}{}{}{}{}{}{}{}",
        bit(8, 'r'),
        bit(7, 'w'),
        bit(6, 'x'),
        bit(5, 'r'),
        bit(4, 'w'),
        bit(3, 'x'),
        bit(2, 'r'),
        bit(1, 'w'),
        bit(0, 'x'),
    )
}

async fn describe_entry(path: &Path) -> OpsResult<FileDescriptor> {
    let metadata = fs::metadata(path).await?;
    let kind = if metadata.is_dir() {
        FileKind::Directory
    } else if metadata.file_type().is_symlink() {
        FileKind::Symlink
    } else if metadata.is_file() {
        FileKind::File
    } else {
        FileKind::Other
    };
    let modified: Option<DateTime<Utc>> = metadata.modified().ok().map(DateTime::<Utc>::from);
    Ok(FileDescriptor {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string()),
        path: path.to_string_lossy().to_string(),
        kind,
        size: metadata.len(),
        modified,
        permissions: permissions_string(metadata.permissions().mode(), metadata.is_dir()),
    })
}

/// `path` must exist and be a directory. Non-recursive by default; when
/// `recursive` is set, entries from nested directories are included with
/// their full relative path, walked depth-first with no bound (directory
/// listing, unlike `grep`, has no adversarial-input concern requiring a
/// depth cap).
pub async fn list_directory(path: &str, recursive: bool) -> OpsResult<ListDirectoryResult> {
    let root = normalize_resolving(path);
    let root = root.as_path();
    let metadata = fs::metadata(root)
        .await
        .map_err(|_| OpsError::PathNotFound(path.to_string()))?;
    if !metadata.is_dir() {
        return Err(OpsError::NotADirectory(path.to_string()));
    }

    let mut entries = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let mut read_dir = fs::read_dir(&dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let entry_path = entry.path();
            let descriptor = describe_entry(&entry_path).await?;
            if recursive && descriptor.kind == FileKind::Directory {
                stack.push(entry_path.clone());
            }
            entries.push(descriptor);
        }
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    let total_count = entries.len();
    Ok(ListDirectoryResult {
        path: path.to_string(),
        files: entries,
        total_count,
    })
}

/// Reads the whole file when `chunk_index` is `None`; otherwise returns the
/// `chunk_index`-th window of [`READ_CHUNK_SIZE`] characters. `size` in the
/// result is always the character count of `content` — a multi-byte UTF-8
/// file's `size` is therefore not its byte length.
pub async fn read_file(path: &str, chunk_index: Option<usize>) -> OpsResult<ReadFileResult> {
    let normalized = normalize_lexical(path);
    let file_path = normalized.as_path();
    let metadata = fs::metadata(file_path)
        .await
        .map_err(|_| OpsError::PathNotFound(path.to_string()))?;
    if metadata.is_dir() {
        return Err(OpsError::NotAFile(path.to_string()));
    }

    let raw = fs::read(file_path).await?;
    let full = String::from_utf8_lossy(&raw).into_owned();
    let chars: Vec<char> = full.chars().collect();
    let total_chars = chars.len();

    match chunk_index {
        None => Ok(ReadFileResult {
            path: path.to_string(),
            content: full,
            size: total_chars,
            encoding: "utf-8",
            truncated: false,
            offset: 0,
            total_chunks: None,
            chunk_index: None,
        }),
        Some(index) => {
            let total_chunks = total_chars.div_ceil(READ_CHUNK_SIZE).max(1);
            let start = index.saturating_mul(READ_CHUNK_SIZE).min(total_chars);
            let end = (start + READ_CHUNK_SIZE).min(total_chars);
            let window: String = chars[start..end].iter().collect();
            Ok(ReadFileResult {
                path: path.to_string(),
                size: window.chars().count(),
                content: window,
                encoding: "utf-8",
                truncated: end < total_chars,
                offset: start,
                total_chunks: Some(total_chunks),
                chunk_index: Some(index),
            })
        }
    }
}

/// Fails with [`OpsError::FileExists`] if the path already exists.
pub async fn create_file(path: &str, content: &str) -> OpsResult<CreateEditAppendResult> {
    let normalized = normalize_lexical(path);
    let file_path = normalized.as_path();
    if fs::metadata(file_path).await.is_ok() {
        return Err(OpsError::FileExists(path.to_string()));
    }
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(file_path, content).await?;
    Ok(CreateEditAppendResult {
        path: path.to_string(),
        operation: WriteKind::Create,
        success: true,
        message: format!("created {path}"),
        bytes_written: content.len(),
    })
}

/// Overwrites an existing file. Fails with [`OpsError::PathNotFound`] if it
/// does not exist yet — use `create_file` for that.
pub async fn edit_file(path: &str, content: &str) -> OpsResult<CreateEditAppendResult> {
    let normalized = normalize_lexical(path);
    let file_path = normalized.as_path();
    let metadata = fs::metadata(file_path)
        .await
        .map_err(|_| OpsError::PathNotFound(path.to_string()))?;
    if metadata.is_dir() {
        return Err(OpsError::NotAFile(path.to_string()));
    }
    fs::write(file_path, content).await?;
    Ok(CreateEditAppendResult {
        path: path.to_string(),
        operation: WriteKind::Edit,
        success: true,
        message: format!("edited {path}"),
        bytes_written: content.len(),
    })
}

/// Appends to an existing file. Fails with [`OpsError::PathNotFound`] if it
/// does not exist.
pub async fn append_file(path: &str, content: &str) -> OpsResult<CreateEditAppendResult> {
    let normalized = normalize_lexical(path);
    let file_path = normalized.as_path();
    let metadata = fs::metadata(file_path)
        .await
        .map_err(|_| OpsError::PathNotFound(path.to_string()))?;
    if metadata.is_dir() {
        return Err(OpsError::NotAFile(path.to_string()));
    }
    let mut file = fs::OpenOptions::new().append(true).open(file_path).await?;
    file.write_all(content.as_bytes()).await?;
    Ok(CreateEditAppendResult {
        path: path.to_string(),
        operation: WriteKind::Append,
        success: true,
        message: format!("appended to {path}"),
        bytes_written: content.len(),
    })
}
