//! Partial and sampled file fingerprints.
//!
//! # Overview
//!
//! A [`Fingerprint`] is a 20-byte digest used as an equality key. Two kinds
//! are computed per file:
//!
//! - **partial**: digest of the first chunk only (at most `chunk_size` bytes)
//! - **sampled**: digest of every chunk a [`ChunkReader`] yields when started
//!   at chunk 1, so the first chunk is never hashed twice
//!
//! The digest is SHA-1 by default; BLAKE3 truncated to 20 bytes is
//! available through [`FingerprintAlgorithm::Blake3`].
//!
//! # Example
//!
//! ```no_run
//! use skimdupe::scanner::Hasher;
//! use std::path::Path;
//!
//! let hasher = Hasher::default();
//! let partial = hasher.partial_fingerprint(Path::new("file.bin")).unwrap();
//! let sampled = hasher.sampled_fingerprint(Path::new("file.bin")).unwrap();
//! println!("{:02x?} {:02x?}", partial, sampled);
//! ```

use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha1::Digest as _;

use super::chunks::{read_up_to, ChunkReader, SamplingConfig};
use super::HashError;

/// Length of a fingerprint in bytes.
pub const FINGERPRINT_LEN: usize = 20;

/// Opaque content fingerprint.
pub type Fingerprint = [u8; FINGERPRINT_LEN];

/// Buffer size for byte-by-byte verification.
const VERIFY_BUFFER_SIZE: usize = 64 * 1024;

/// Digest used to build fingerprints.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintAlgorithm {
    /// SHA-1 (20-byte output).
    #[default]
    Sha1,
    /// BLAKE3 extended output truncated to 20 bytes.
    Blake3,
}

impl std::fmt::Display for FingerprintAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FingerprintAlgorithm::Sha1 => write!(f, "sha1"),
            FingerprintAlgorithm::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Running digest state for one fingerprint computation.
enum DigestState {
    Sha1(sha1::Sha1),
    Blake3(Box<blake3::Hasher>),
}

impl DigestState {
    fn new(algorithm: FingerprintAlgorithm) -> Self {
        match algorithm {
            FingerprintAlgorithm::Sha1 => Self::Sha1(sha1::Sha1::new()),
            FingerprintAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha1(state) => state.update(data),
            Self::Blake3(state) => {
                state.update(data);
            }
        }
    }

    fn finalize(self) -> Fingerprint {
        let mut fingerprint = [0u8; FINGERPRINT_LEN];
        match self {
            Self::Sha1(state) => fingerprint.copy_from_slice(&state.finalize()),
            Self::Blake3(state) => state.finalize_xof().fill(&mut fingerprint),
        }
        fingerprint
    }
}

/// Convert a fingerprint to a lowercase hexadecimal string.
///
/// # Example
///
/// ```
/// use skimdupe::scanner::fingerprint_to_hex;
///
/// let hex = fingerprint_to_hex(&[0xab; 20]);
/// assert_eq!(hex.len(), 40);
/// assert!(hex.starts_with("abab"));
/// ```
#[must_use]
pub fn fingerprint_to_hex(fingerprint: &Fingerprint) -> String {
    fingerprint.iter().map(|b| format!("{b:02x}")).collect()
}

/// File fingerprinting with a fixed sampling schedule and digest.
///
/// Every call opens its own file handle, so a `Hasher` can be shared across
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    sampling: SamplingConfig,
    algorithm: FingerprintAlgorithm,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Hasher {
    /// Create a hasher with the given sampling schedule and digest.
    #[must_use]
    pub fn new(sampling: SamplingConfig, algorithm: FingerprintAlgorithm) -> Self {
        Self {
            sampling,
            algorithm,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag checked between chunks.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// The sampling schedule used for sampled fingerprints.
    #[must_use]
    pub fn sampling(&self) -> SamplingConfig {
        self.sampling
    }

    /// The digest algorithm.
    #[must_use]
    pub fn algorithm(&self) -> FingerprintAlgorithm {
        self.algorithm
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Fingerprint an in-memory buffer with this hasher's digest.
    #[must_use]
    pub fn fingerprint_bytes(&self, data: &[u8]) -> Fingerprint {
        let mut digest = DigestState::new(self.algorithm);
        digest.update(data);
        digest.finalize()
    }

    /// Compute the partial fingerprint of a file (first chunk only).
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn partial_fingerprint(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.partial_fingerprint_reader(file)
            .map_err(|e| HashError::from_io(path, e))
    }

    /// Compute the partial fingerprint of an arbitrary reader.
    ///
    /// # Errors
    ///
    /// Propagates read errors from `reader`.
    pub fn partial_fingerprint_reader<R: Read>(&self, mut reader: R) -> io::Result<Fingerprint> {
        let leading = read_up_to(&mut reader, self.sampling.chunk_size)?;
        Ok(self.fingerprint_bytes(&leading))
    }

    /// Compute the sampled fingerprint of a file (chunks from index 1 on).
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened, read or seeked.
    pub fn sampled_fingerprint(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.sampled_fingerprint_reader(file)
            .map_err(|e| HashError::from_io(path, e))
    }

    /// Compute the sampled fingerprint of an arbitrary seekable reader.
    ///
    /// # Errors
    ///
    /// Propagates read and seek errors, and returns
    /// [`io::ErrorKind::Interrupted`] if shutdown was requested mid-file.
    pub fn sampled_fingerprint_reader<R: Read + Seek>(&self, reader: R) -> io::Result<Fingerprint> {
        let mut digest = DigestState::new(self.algorithm);
        for chunk in ChunkReader::new(reader, self.sampling, 1) {
            if self.is_shutdown_requested() {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "Shutdown"));
            }
            digest.update(&chunk?.data);
        }
        Ok(digest.finalize())
    }

    /// Compare two files byte by byte.
    ///
    /// Used to confirm a fingerprint match when verification is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] for whichever file could not be read.
    pub fn files_identical(&self, a: &Path, b: &Path) -> Result<bool, HashError> {
        let mut file_a = File::open(a).map_err(|e| HashError::from_io(a, e))?;
        let mut file_b = File::open(b).map_err(|e| HashError::from_io(b, e))?;

        let len_a = file_a.metadata().map_err(|e| HashError::from_io(a, e))?.len();
        let len_b = file_b.metadata().map_err(|e| HashError::from_io(b, e))?.len();
        if len_a != len_b {
            return Ok(false);
        }

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::from_io(
                    a,
                    io::Error::new(io::ErrorKind::Interrupted, "Shutdown"),
                ));
            }
            let block_a =
                read_up_to(&mut file_a, VERIFY_BUFFER_SIZE).map_err(|e| HashError::from_io(a, e))?;
            let block_b =
                read_up_to(&mut file_b, VERIFY_BUFFER_SIZE).map_err(|e| HashError::from_io(b, e))?;
            if block_a != block_b {
                return Ok(false);
            }
            if block_a.is_empty() {
                return Ok(true);
            }
        }
    }
}
