//! # Enumerator Module
//!
//! Discovers candidate files under a root folder.
//!
//! Every regular file is a candidate. There is no extension filter:
//! unsupported files are handed to the scorer and come back as 0.0, the
//! same as a photo that fails to decode.
//!
//! ## Example
//! ```rust,ignore
//! use focus_scan::core::enumerator::{Enumerator, EnumeratorConfig};
//!
//! let enumerator = Enumerator::new(EnumeratorConfig::default());
//! for path in enumerator.walk("/Users/me/Pictures".as_ref())? {
//!     println!("{}", path);
//! }
//! ```

mod walker;

pub use walker::{Enumerator, EnumeratorConfig, ImagePaths};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Absolute path of one candidate image
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImagePath(PathBuf);

impl ImagePath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Final path component, for compact listings
    pub fn file_name(&self) -> String {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.display().to_string())
    }
}

impl AsRef<Path> for ImagePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ImagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_last_component() {
        let path = ImagePath::new("/photos/2024/DSC_0001.NEF");
        assert_eq!(path.file_name(), "DSC_0001.NEF");
    }

    #[test]
    fn serializes_as_plain_path() {
        let path = ImagePath::new("/photos/a.jpg");
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"/photos/a.jpg\"");
    }
}
