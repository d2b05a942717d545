//! Directory walking implementation using walkdir.

use super::ImagePath;
use crate::error::InputError;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Configuration for the enumerator
#[derive(Debug, Clone)]
pub struct EnumeratorConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories (names starting with '.')
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: true,
            max_depth: None,
        }
    }
}

/// Walks a folder tree and yields every regular file in it.
#[derive(Debug, Clone, Default)]
pub struct Enumerator {
    config: EnumeratorConfig,
}

impl Enumerator {
    /// Create a new enumerator with the given configuration
    pub fn new(config: EnumeratorConfig) -> Self {
        Self { config }
    }

    /// Check that `root` names an existing directory and make it absolute.
    pub fn resolve_root(root: &Path) -> Result<PathBuf, InputError> {
        if root.as_os_str().is_empty() {
            return Err(InputError::FolderNotSet);
        }

        if !root.exists() {
            return Err(InputError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        if !root.is_dir() {
            return Err(InputError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        std::path::absolute(root).map_err(|_| InputError::DirectoryNotFound {
            path: root.to_path_buf(),
        })
    }

    /// Start a lazy walk of `root`.
    ///
    /// The root is validated up front; everything after that is pulled on
    /// demand. Entries that cannot be read are logged and skipped.
    pub fn walk(&self, root: &Path) -> Result<ImagePaths, InputError> {
        let root = Self::resolve_root(root)?;

        let mut walker = WalkDir::new(&root).follow_links(self.config.follow_symlinks);
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let include_hidden = self.config.include_hidden;
        let entries = walker
            .into_iter()
            .filter_entry(move |entry| include_hidden || entry.depth() == 0 || !is_hidden(entry));

        Ok(ImagePaths {
            root,
            inner: Box::new(entries),
            skipped: 0,
        })
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Lazy, single-pass sequence of candidate files.
pub struct ImagePaths {
    root: PathBuf,
    inner: Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + Send>,
    skipped: usize,
}

impl ImagePaths {
    /// The absolute root being walked
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entries skipped so far because they could not be read
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for ImagePaths {
    type Item = ImagePath;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(entry) if entry.file_type().is_file() => {
                    return Some(ImagePath::new(entry.into_path()));
                }
                Ok(_) => {}
                Err(e) => {
                    self.skipped += 1;
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        path
    }

    fn names(paths: ImagePaths) -> Vec<String> {
        let mut names: Vec<_> = paths.map(|p| p.file_name()).collect();
        names.sort();
        names
    }

    #[test]
    fn walk_empty_directory_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let enumerator = Enumerator::default();

        let paths = enumerator.walk(temp_dir.path()).unwrap();

        assert_eq!(paths.count(), 0);
    }

    #[test]
    fn walk_does_not_filter_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "photo.jpg");
        create_file(temp_dir.path(), "DSC_0001.NEF");
        create_file(temp_dir.path(), "notes.txt");
        create_file(temp_dir.path(), "no_extension");

        let paths = Enumerator::default().walk(temp_dir.path()).unwrap();

        assert_eq!(
            names(paths),
            vec!["DSC_0001.NEF", "no_extension", "notes.txt", "photo.jpg"]
        );
    }

    #[test]
    fn walk_traverses_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("2024").join("june");
        fs::create_dir_all(&nested).unwrap();

        create_file(temp_dir.path(), "root.jpg");
        create_file(&nested, "nested.jpg");

        let paths = Enumerator::default().walk(temp_dir.path()).unwrap();

        assert_eq!(names(paths), vec!["nested.jpg", "root.jpg"]);
    }

    #[test]
    fn walk_yields_absolute_paths() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "photo.jpg");

        let paths: Vec<_> = Enumerator::default().walk(temp_dir.path()).unwrap().collect();

        assert!(paths.iter().all(|p| p.as_path().is_absolute()));
    }

    #[test]
    fn hidden_files_included_by_default() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "visible.jpg");
        create_file(temp_dir.path(), ".hidden.jpg");

        let paths = Enumerator::default().walk(temp_dir.path()).unwrap();

        assert_eq!(paths.count(), 2);
    }

    #[test]
    fn hidden_files_and_directories_can_be_excluded() {
        let temp_dir = TempDir::new().unwrap();
        let hidden_dir = temp_dir.path().join(".thumbnails");
        fs::create_dir(&hidden_dir).unwrap();
        create_file(&hidden_dir, "thumb.jpg");
        create_file(temp_dir.path(), "visible.jpg");
        create_file(temp_dir.path(), ".hidden.jpg");

        let enumerator = Enumerator::new(EnumeratorConfig {
            include_hidden: false,
            ..Default::default()
        });
        let paths = enumerator.walk(temp_dir.path()).unwrap();

        assert_eq!(names(paths), vec!["visible.jpg"]);
    }

    #[test]
    fn max_depth_limits_recursion() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("sub");
        fs::create_dir(&nested).unwrap();
        create_file(temp_dir.path(), "top.jpg");
        create_file(&nested, "deep.jpg");

        let enumerator = Enumerator::new(EnumeratorConfig {
            max_depth: Some(1),
            ..Default::default()
        });

        assert_eq!(names(enumerator.walk(temp_dir.path()).unwrap()), vec!["top.jpg"]);
    }

    #[test]
    fn missing_root_is_rejected() {
        let result = Enumerator::default().walk(Path::new("/nonexistent/path/12345"));
        assert!(matches!(result, Err(InputError::DirectoryNotFound { .. })));
    }

    #[test]
    fn file_root_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_file(temp_dir.path(), "photo.jpg");

        let result = Enumerator::default().walk(&file);

        assert!(matches!(result, Err(InputError::NotADirectory { .. })));
    }

    #[test]
    fn empty_root_means_no_folder_selected() {
        let result = Enumerator::default().walk(Path::new(""));
        assert!(matches!(result, Err(InputError::FolderNotSet)));
    }
}
