//! Local file management for installed game content.
//!
//! This module provides the file operations the desktop client relies on to
//! manage downloaded games and mods on disk: listing folders, walking a tree,
//! copying, writing, reading and deleting files.
//!
//! Listing operations treat a missing directory as empty. Copy and write create
//! the missing parent directories of their destination.

use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, info};
use tokio::fs;

/// Returns the directory the client runs from.
pub fn app_dir() -> Result<PathBuf, anyhow::Error> {
    std::env::current_dir().context("failed to get current directory")
}

/// Lists the names of the direct subdirectories of `path`, sorted.
///
/// Returns an empty list if `path` does not exist. Entries that cannot be
/// inspected or whose name is not valid UTF-8 are skipped.
pub async fn scan_directory(path: &Path) -> Result<Vec<String>, anyhow::Error> {
    if !exists(path).await {
        debug!("{} does not exist, nothing to scan", path.display());
        return Ok(vec![]);
    }

    let mut entries = fs::read_dir(path)
        .await
        .with_context(|| format!("failed to read directory {}", path.display()))?;

    let mut folders = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let Ok(file_type) = entry.file_type().await else {
            continue;
        };
        if !file_type.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            folders.push(name.to_owned());
        }
    }
    folders.sort();

    debug!("{} folders in {}", folders.len(), path.display());

    Ok(folders)
}

/// Lists every file below `path`, recursively, sorted.
///
/// Returns an empty list if `path` does not exist.
pub async fn list_files(path: &Path) -> Result<Vec<PathBuf>, anyhow::Error> {
    let mut files = Vec::new();
    if !exists(path).await {
        return Ok(files);
    }

    let mut pending = vec![path.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir)
            .await
            .with_context(|| format!("failed to read directory {}", dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let entry_path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(entry_path);
            } else {
                files.push(entry_path);
            }
        }
    }
    files.sort();

    debug!("{} files below {}", files.len(), path.display());

    Ok(files)
}

/// Creates `path` and all of its missing parents.
pub async fn create_directory(path: &Path) -> Result<(), anyhow::Error> {
    fs::create_dir_all(path)
        .await
        .with_context(|| format!("failed to create directory {}", path.display()))?;

    info!("created directory {}", path.display());

    Ok(())
}

/// Returns whether `path` exists. Unreadable paths count as missing.
pub async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// Copies `from` to `to`, creating the parent directories of `to`.
pub async fn copy_file(from: &Path, to: &Path) -> Result<(), anyhow::Error> {
    create_parent(to).await?;
    fs::copy(from, to).await.with_context(|| {
        format!("failed to copy {} to {}", from.display(), to.display())
    })?;

    info!("copied {} to {}", from.display(), to.display());

    Ok(())
}

/// Writes `content` to `path`, creating its parent directories.
pub async fn write_file(path: &Path, content: &str) -> Result<(), anyhow::Error> {
    create_parent(path).await?;
    fs::write(path, content)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!("wrote {}", path.display());

    Ok(())
}

/// Deletes the file at `path`.
pub async fn delete_file(path: &Path) -> Result<(), anyhow::Error> {
    fs::remove_file(path)
        .await
        .with_context(|| format!("failed to delete {}", path.display()))?;

    info!("deleted {}", path.display());

    Ok(())
}

/// Reads the file at `path` as UTF-8 text.
pub async fn read_file(path: &Path) -> Result<String, anyhow::Error> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

async fn create_parent(path: &Path) -> Result<(), anyhow::Error> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create parent directory {}", parent.display())),
        _ => Ok(()),
    }
}
