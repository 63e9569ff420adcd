//! Input source adapters for the CLI driver.
//!
//! The driver prefers a read-only memory map so the core can run the
//! zero-copy divide-and-conquer path; anything unmappable (stdin, pipes,
//! exotic filesystems) goes through the buffered stream path instead.

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

/// A file mapped read-only into memory.
///
/// The mapping must outlive every borrowed finding produced from it; the
/// driver keeps it alive until output is fully written.
pub struct MappedRegion {
    map: Mmap,
}

impl MappedRegion {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.map
    }
}

/// Why an input path was rejected before the core ran.
#[derive(Debug)]
#[non_exhaustive]
pub enum InputError {
    /// The path does not exist.
    NotFound(PathBuf),
    /// The path exists but is not a regular file (directory, socket, ...).
    NotRegular(PathBuf),
    /// Metadata or open failed.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "input file {} doesn't exist", path.display()),
            Self::NotRegular(path) => write!(f, "input file {} is not regular", path.display()),
            Self::Io { path, source } => {
                write!(f, "reading {} failed: {source}", path.display())
            }
        }
    }
}

impl Error for InputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Checks that `path` names a regular file and returns its length.
pub fn check_regular_file(path: &Path) -> Result<u64, InputError> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(InputError::NotFound(path.to_path_buf()));
        }
        Err(err) => {
            return Err(InputError::Io {
                path: path.to_path_buf(),
                source: err,
            });
        }
    };
    if !metadata.is_file() {
        return Err(InputError::NotRegular(path.to_path_buf()));
    }
    Ok(metadata.len())
}

/// Maps `path` read-only. Failures here are recoverable: the driver falls
/// back to stream reading.
pub fn map_file(path: &Path) -> io::Result<MappedRegion> {
    let file = File::open(path)?;
    // SAFETY: the map is read-only and we never hand out mutable access.
    // Concurrent truncation of the underlying file by another process is
    // the standard caveat of file mapping and is accepted here, as it is
    // by every mmap-based reader.
    let map = unsafe { Mmap::map(&file)? };
    Ok(MappedRegion { map })
}
