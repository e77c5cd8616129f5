// Licensed under the Apache-2.0 license

//! Writing finished artifacts to disk.
//!
//! Everything is staged next to the destination first and only moved into
//! place once every byte has been written, so a failure while producing the
//! output leaves nothing behind. A single file, or a tree whose destination
//! does not exist yet, is moved with one rename. A tree written over an
//! existing directory is moved file by file; a failed rename there can
//! leave that directory partly updated.

use crate::error::{ExportError, ExportResult};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// The finished output of one emitter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Artifact {
    /// A single file written to the destination path.
    File(Vec<u8>),
    /// A directory tree rooted at the destination path, keyed by relative
    /// path.
    Tree(BTreeMap<PathBuf, Vec<u8>>),
}

impl Artifact {
    pub fn text(content: String) -> Self {
        Artifact::File(content.into_bytes())
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Write `artifact` to `destination`, returning the written file paths.
pub fn write_artifact(destination: &Path, artifact: &Artifact) -> ExportResult<Vec<PathBuf>> {
    match artifact {
        Artifact::File(bytes) => {
            write_file(destination, bytes)?;
            Ok(vec![destination.to_path_buf()])
        }
        Artifact::Tree(files) => write_tree(destination, files),
    }
}

fn write_file(destination: &Path, bytes: &[u8]) -> ExportResult<()> {
    let dir = parent_dir(destination);
    fs::create_dir_all(dir).map_err(|e| ExportError::io(dir, e))?;
    let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(|e| ExportError::io(dir, e))?;
    staged
        .write_all(bytes)
        .and_then(|_| staged.flush())
        .map_err(|e| ExportError::io(staged.path(), e))?;
    staged
        .persist(destination)
        .map_err(|e| ExportError::io(destination, e.error))?;
    Ok(())
}

fn write_tree(destination: &Path, files: &BTreeMap<PathBuf, Vec<u8>>) -> ExportResult<Vec<PathBuf>> {
    let dir = parent_dir(destination);
    fs::create_dir_all(dir).map_err(|e| ExportError::io(dir, e))?;
    let staging = tempfile::tempdir_in(dir).map_err(|e| ExportError::io(dir, e))?;
    // A plain subdirectory, so the moved tree gets default permissions.
    let root = staging.path().join("tree");
    fs::create_dir(&root).map_err(|e| ExportError::io(&root, e))?;

    for (rel, bytes) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
        }
        fs::write(&path, bytes).map_err(|e| ExportError::io(&path, e))?;
    }

    let written: Vec<PathBuf> = files.keys().map(|rel| destination.join(rel)).collect();
    if !destination.exists() {
        fs::rename(&root, destination).map_err(|e| ExportError::io(destination, e))?;
        return Ok(written);
    }

    for rel in files.keys() {
        let target = destination.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
        }
        fs::rename(root.join(rel), &target).map_err(|e| ExportError::io(&target, e))?;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("include/chip.h");
        let written = write_artifact(&dest, &Artifact::text("#define X 1\n".into())).unwrap();
        assert_eq!(written, [dest.clone()]);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "#define X 1\n");
        // Only the destination remains; the staging file was persisted.
        assert_eq!(fs::read_dir(dest.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn test_overwrite_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("chip.h");
        fs::write(&dest, "old").unwrap();
        write_artifact(&dest, &Artifact::text("new".into())).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[test]
    fn test_write_tree() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("docs");
        let mut files = BTreeMap::new();
        files.insert(PathBuf::from("index.html"), b"<html/>".to_vec());
        files.insert(PathBuf::from("content/0.html"), b"page".to_vec());
        let written = write_artifact(&dest, &Artifact::Tree(files)).unwrap();
        assert_eq!(
            written,
            [dest.join("content/0.html"), dest.join("index.html")]
        );
        assert_eq!(fs::read(dest.join("content/0.html")).unwrap(), b"page");
        // The staging directory is gone.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_tree_over_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("docs");
        fs::create_dir_all(dest.join("content")).unwrap();
        fs::write(dest.join("index.html"), "old").unwrap();
        fs::write(dest.join("notes.txt"), "kept").unwrap();

        let mut files = BTreeMap::new();
        files.insert(PathBuf::from("index.html"), b"new".to_vec());
        files.insert(PathBuf::from("content/0.html"), b"page".to_vec());
        write_artifact(&dest, &Artifact::Tree(files)).unwrap();

        assert_eq!(fs::read_to_string(dest.join("index.html")).unwrap(), "new");
        assert_eq!(fs::read_to_string(dest.join("content/0.html")).unwrap(), "page");
        assert_eq!(fs::read_to_string(dest.join("notes.txt")).unwrap(), "kept");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let err = write_artifact(&blocker.join("chip.h"), &Artifact::text(String::new())).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
