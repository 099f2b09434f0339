//! File content digests with streaming reads.
//!
//! # Overview
//!
//! [`Hasher`] opens a file and feeds it through a fresh [`Md5`] engine in
//! fixed-size chunks, so memory use does not grow with the file size.
//!
//! Two failure kinds are kept apart: a file that cannot be opened
//! ([`HashError::Unreadable`]) and a read that fails part-way through
//! ([`HashError::Read`]). Neither is retried.
//!
//! # Example
//!
//! ```no_run
//! use seekfs::scanner::Hasher;
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.full_hash(Path::new("Cargo.toml")).unwrap();
//! println!("{digest}");
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::HashError;
use crate::digest::{Digest, Md5};

/// Read chunk size used by [`Hasher::new`] (16 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024;

/// Streams files through the digest engine.
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default chunk size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Create a hasher with a custom chunk size (minimum 1 byte).
    #[must_use]
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }

    /// Chunk size used for reads.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Digest the entire contents of a file.
    ///
    /// # Errors
    ///
    /// - [`HashError::Unreadable`] if the file cannot be opened
    /// - [`HashError::Read`] if a read fails mid-stream
    pub fn full_hash(&self, path: &Path) -> Result<Digest, HashError> {
        let file = File::open(path).map_err(|source| {
            log::debug!("Cannot open {} for hashing: {}", path.display(), source);
            HashError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;

        self.hash_reader(path, file)
    }

    /// Digest everything `reader` yields. `path` is only used for error
    /// reporting.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Read`] on the first failed read other than
    /// [`ErrorKind::Interrupted`].
    pub fn hash_reader<R: Read>(&self, path: &Path, mut reader: R) -> Result<Digest, HashError> {
        let mut md5 = Md5::new();
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    log::debug!("Read failed while hashing {}: {}", path.display(), source);
                    return Err(HashError::Read {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            };

            md5.update(&buffer[..n])
                .map_err(|source| HashError::Digest {
                    path: path.to_path_buf(),
                    source,
                })?;
        }

        let digest = md5.finalize().map_err(|source| HashError::Digest {
            path: path.to_path_buf(),
            source,
        })?;
        log::trace!("Digest {} for {}", digest, path.display());
        Ok(digest)
    }
}
