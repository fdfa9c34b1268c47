//! Async filesystem primitives for the build.
//!
//! Two operations here are deliberately lenient: removing an output tree
//! that does not exist and copying from a source that does not exist are
//! both no-ops, matching what a fresh checkout or an optional static
//! directory looks like. Everything else surfaces the I/O error.

use std::{io, path::Path};

use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Remove a directory tree. A missing path is not an error.
pub async fn remove_tree(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "removed tree");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Write a file, creating any missing parent directories first.
pub async fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, contents).await?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

/// Copy a file or a whole directory tree. A missing `src` is not an error.
///
/// Directory trees are walked top-down and copied file by file, hidden
/// files included. Symlinks are not followed.
pub async fn copy_tree(src: &Path, dest: &Path) -> io::Result<()> {
    let metadata = match fs::metadata(src).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(src = %src.display(), "copy source missing, nothing to copy");
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    if metadata.is_file() {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(src, dest).await?;
        debug!(src = %src.display(), dest = %dest.display(), "copied file");
        return Ok(());
    }

    for entry in WalkDir::new(src) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry.path().strip_prefix(src).map_err(io::Error::other)?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).await?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::copy(entry.path(), &target).await?;
        }
    }

    debug!(src = %src.display(), dest = %dest.display(), "copied tree");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remove_missing_tree_is_ok() {
        let dir = tempfile::TempDir::new().unwrap();
        remove_tree(&dir.path().join("nope")).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_tree() {
        let dir = tempfile::TempDir::new().unwrap();
        let tree = dir.path().join("out");
        std::fs::create_dir_all(tree.join("nested")).unwrap();
        std::fs::write(tree.join("nested/file.txt"), "x").unwrap();

        remove_tree(&tree).await.unwrap();
        assert!(!tree.exists());
    }

    #[tokio::test]
    async fn test_write_file_creates_parents() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a/b/c.html");

        write_file(&path, b"<html>").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"<html>");
    }

    #[tokio::test]
    async fn test_copy_missing_src_is_ok() {
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("out");

        copy_tree(&dir.path().join("nope"), &dest).await.unwrap();
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_copy_single_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let src = dir.path().join("robots.txt");
        std::fs::write(&src, "User-agent: *").unwrap();

        let dest = dir.path().join("out/robots.txt");
        copy_tree(&src, &dest).await.unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "User-agent: *");
    }

    #[tokio::test]
    async fn test_copy_tree_includes_hidden_and_nested() {
        let dir = tempfile::TempDir::new().unwrap();
        let src = dir.path().join("static");
        std::fs::create_dir_all(src.join("css")).unwrap();
        std::fs::write(src.join("css/site.css"), "body {}").unwrap();
        std::fs::write(src.join(".well-known"), "ok").unwrap();

        let dest = dir.path().join("out");
        copy_tree(&src, &dest).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(dest.join("css/site.css")).unwrap(),
            "body {}"
        );
        assert_eq!(std::fs::read_to_string(dest.join(".well-known")).unwrap(), "ok");
    }
}
