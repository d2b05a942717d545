//! Raw bytes of a photo on disk, and format sniffing from its header.

use crate::error::ScoreError;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Files at least this large are memory-mapped instead of read (1MB)
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Bytes sniffed from the start of a file
pub const HEADER_LEN: usize = 12;

/// Signatures of the formats the standard decoder handles, as
/// `(offset, bytes)`. TIFF is left out: NEF, CR2, ARW and DNG are all TIFF
/// containers.
const STANDARD_SIGNATURES: &[&[(usize, &[u8])]] = &[
    &[(0, &[0xFF, 0xD8, 0xFF])],                                 // JPEG
    &[(0, &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])],   // PNG
    &[(0, b"GIF8")],                                             // GIF
    &[(0, b"RIFF"), (8, b"WEBP")],                               // WebP
    &[(0, b"BM")],                                               // BMP
];

/// A photo's contents, owned for small files and mapped for large ones.
pub enum PhotoBytes {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl PhotoBytes {
    pub fn open(path: &Path) -> Result<Self, ScoreError> {
        let io_error = |source: io::Error| ScoreError::IoError {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_error)?;
        let len = file.metadata().map_err(io_error)?.len();

        if len < MMAP_THRESHOLD {
            let mut bytes = Vec::with_capacity(len as usize);
            (&file).read_to_end(&mut bytes).map_err(io_error)?;
            return Ok(PhotoBytes::Owned(bytes));
        }

        // SAFETY: read-only mapping; a photo rewritten underneath us at
        // worst decodes as garbage and scores 0.0.
        let map = unsafe { Mmap::map(&file) }.map_err(io_error)?;
        Ok(PhotoBytes::Mapped(map))
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, PhotoBytes::Mapped(_))
    }
}

impl std::ops::Deref for PhotoBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            PhotoBytes::Owned(bytes) => bytes,
            PhotoBytes::Mapped(map) => map,
        }
    }
}

/// Whether `header` starts like a format the standard decoder handles
pub fn is_standard_header(header: &[u8]) -> bool {
    STANDARD_SIGNATURES.iter().any(|parts| {
        parts.iter().all(|(offset, magic)| {
            header
                .get(*offset..*offset + magic.len())
                .is_some_and(|slice| slice == *magic)
        })
    })
}

/// First [`HEADER_LEN`] bytes of a file, or `None` if it is shorter or
/// unreadable.
pub fn read_header(path: &Path) -> Option<[u8; HEADER_LEN]> {
    let mut header = [0u8; HEADER_LEN];
    File::open(path).ok()?.read_exact(&mut header).ok()?;
    Some(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn recognises_standard_signatures() {
        assert!(is_standard_header(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]));
        assert!(is_standard_header(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]));
        assert!(is_standard_header(b"GIF89a"));
        assert!(is_standard_header(b"RIFF\x24\x00\x00\x00WEBP"));
        assert!(is_standard_header(b"BM\x36\x00"));
    }

    #[test]
    fn tiff_containers_go_elsewhere() {
        assert!(!is_standard_header(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]));
        assert!(!is_standard_header(&[0x4D, 0x4D, 0x00, 0x2A]));
    }

    #[test]
    fn riff_without_webp_is_not_standard() {
        assert!(!is_standard_header(b"RIFF\x24\x00\x00\x00WAVE"));
    }

    #[test]
    fn truncated_signatures_do_not_match() {
        assert!(!is_standard_header(&[0xFF, 0xD8]));
        assert!(!is_standard_header(b"RIFF"));
    }

    #[test]
    fn short_files_have_no_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny");
        fs::write(&path, b"BM").unwrap();
        assert!(read_header(&path).is_none());
    }

    #[test]
    fn small_files_are_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.bin");
        fs::write(&path, [1, 2, 3, 4]).unwrap();

        let bytes = PhotoBytes::open(&path).unwrap();
        assert!(!bytes.is_mapped());
        assert_eq!(&*bytes, &[1, 2, 3, 4]);
    }

    #[test]
    fn large_files_are_mapped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("large.bin");
        fs::write(&path, vec![7u8; MMAP_THRESHOLD as usize]).unwrap();

        let bytes = PhotoBytes::open(&path).unwrap();
        assert!(bytes.is_mapped());
        assert_eq!(bytes.len(), MMAP_THRESHOLD as usize);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = PhotoBytes::open(Path::new("/nonexistent/photo.jpg"));
        assert!(matches!(result, Err(ScoreError::IoError { .. })));
    }
}
