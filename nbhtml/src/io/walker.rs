//! Recursive directory walk yielding every file under a root.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{trace, warn};
use walkdir::WalkDir;

/// A file found by the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Directory containing the file.
    pub dir: PathBuf,
    pub file_name: OsString,
}

impl WalkedFile {
    /// Full path, `dir` joined with `file_name`.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Lazy iterator over every file under a root, recursing into subdirectories.
///
/// Entries are sorted by file name within each directory. Directory symlinks are
/// not followed; file symlinks are yielded like regular files. Unreadable
/// entries are logged and skipped.
pub struct FileWalk {
    inner: walkdir::IntoIter,
}

impl Iterator for FileWalk {
    type Item = WalkedFile;

    fn next(&mut self) -> Option<WalkedFile> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(
                        path = ?err.path().map(Path::display),
                        err = %err,
                        "skipping unreadable entry"
                    );
                    continue;
                }
            };

            if !is_file_entry(&entry) {
                trace!(path = %entry.path().display(), "not a file");
                continue;
            }

            let dir = entry
                .path()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            return Some(WalkedFile {
                dir,
                file_name: entry.file_name().to_os_string(),
            });
        }
    }
}

fn is_file_entry(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    // Follows the link target; dangling links are not files.
    file_type.is_symlink() && entry.path().is_file()
}

/// Start walking `root`.
///
/// Fails before yielding anything if `root` does not exist or is not a
/// directory.
pub fn walk_files(root: &Path) -> Result<FileWalk> {
    let metadata = fs::metadata(root).with_context(|| format!("read root {}", root.display()))?;
    if !metadata.is_dir() {
        bail!("root is not a directory: {}", root.display());
    }

    Ok(FileWalk {
        inner: WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dir");
        }
        fs::write(path, "{}").expect("write file");
    }

    #[test]
    fn yields_files_recursively_in_name_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        touch(&root.join("b.ipynb"));
        touch(&root.join("a.txt"));
        touch(&root.join("sub/deeper/c.ipynb"));
        fs::create_dir_all(root.join("empty")).expect("empty dir");

        let paths: Vec<PathBuf> = walk_files(root).expect("walk").map(|f| f.path()).collect();
        assert_eq!(
            paths,
            vec![
                root.join("a.txt"),
                root.join("b.ipynb"),
                root.join("sub/deeper/c.ipynb"),
            ]
        );
    }

    #[test]
    fn splits_directory_and_file_name() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(&temp.path().join("week1/intro.ipynb"));

        let files: Vec<WalkedFile> = walk_files(temp.path()).expect("walk").collect();
        assert_eq!(
            files,
            vec![WalkedFile {
                dir: temp.path().join("week1"),
                file_name: OsString::from("intro.ipynb"),
            }]
        );
    }

    #[test]
    fn empty_root_yields_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(walk_files(temp.path()).expect("walk").count(), 0);
    }

    #[test]
    fn missing_root_fails_up_front() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = walk_files(&temp.path().join("missing"))
            .err()
            .expect("missing root");
        assert!(err.to_string().starts_with("read root"));
        let io_err = err
            .downcast_ref::<std::io::Error>()
            .expect("io error in chain");
        assert_eq!(io_err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn file_root_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("a.ipynb");
        touch(&file);
        let err = walk_files(&file).err().expect("file root");
        assert!(err.to_string().contains("not a directory"));
    }

    #[cfg(unix)]
    #[test]
    fn file_symlinks_are_files_and_dir_symlinks_are_not_followed() {
        let temp = tempfile::tempdir().expect("tempdir");
        let outside = tempfile::tempdir().expect("outside");
        touch(&outside.path().join("linked/x.ipynb"));
        touch(&temp.path().join("real.ipynb"));
        std::os::unix::fs::symlink(temp.path().join("real.ipynb"), temp.path().join("alias.ipynb"))
            .expect("file symlink");
        std::os::unix::fs::symlink(outside.path().join("linked"), temp.path().join("dirlink"))
            .expect("dir symlink");

        let names: Vec<OsString> = walk_files(temp.path())
            .expect("walk")
            .map(|f| f.file_name)
            .collect();
        assert_eq!(names, vec!["alias.ipynb", "real.ipynb"]);
    }
}
