//! Fixed-size chunk reader with a deterministic skip schedule.
//!
//! # Overview
//!
//! [`ChunkReader`] turns any `Read + Seek` source into a lazy sequence of
//! [`Chunk`]s. After each chunk it may jump the read cursor forward
//! according to a [`SamplingConfig`], which bounds the number of chunks
//! read from very large files.
//!
//! The jump target after the `n`-th chunk (counting from 1) with `k` jumps
//! performed so far is the absolute chunk index
//! `start_chunk + n + skip_size * k`. Whether a jump happens at all is
//! decided by the [`SkipPolicy`]:
//!
//! - [`SkipPolicy::Reference`]: jump unless `n` is a multiple of
//!   `skip_interval`. Every `skip_interval`-th chunk continues sequentially.
//! - [`SkipPolicy::Boundary`]: jump only when `n` is a multiple of
//!   `skip_interval`. Runs of `skip_interval` chunks are read sequentially.
//!
//! A `skip_interval` of zero disables jumping entirely and the whole source
//! is read sequentially.
//!
//! # Example
//!
//! ```
//! use skimdupe::scanner::{ChunkReader, SamplingConfig};
//! use std::io::Cursor;
//!
//! let data = vec![7u8; 3000];
//! let sampling = SamplingConfig::default().with_skip_interval(0);
//! let chunks: Vec<_> = ChunkReader::new(Cursor::new(data), sampling, 0)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(chunks.len(), 3);
//! assert_eq!(chunks[2].data.len(), 3000 - 2 * 1024);
//! ```

use std::io::{self, Read, Seek, SeekFrom};

use serde::{Deserialize, Serialize};

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default number of chunks between skip decisions.
pub const DEFAULT_SKIP_INTERVAL: u64 = 1024;

/// Default number of chunks added to the jump distance per skip.
pub const DEFAULT_SKIP_SIZE: u64 = 1024;

/// Largest accepted chunk size (64 MiB).
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Upper bound on the buffer reserved ahead of a bounded read.
const MAX_PREALLOC: usize = 64 * 1024;

/// Rule deciding after which chunks the reader jumps forward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SkipPolicy {
    /// Jump after every chunk except those landing on a `skip_interval`
    /// boundary.
    #[default]
    Reference,
    /// Jump only after chunks landing on a `skip_interval` boundary.
    Boundary,
}

impl SkipPolicy {
    /// Whether to jump after `chunks_read` chunks have been yielded.
    ///
    /// `skip_interval` must be non-zero.
    #[must_use]
    fn should_skip(self, chunks_read: u64, skip_interval: u64) -> bool {
        let on_boundary = chunks_read % skip_interval == 0;
        match self {
            Self::Reference => !on_boundary,
            Self::Boundary => on_boundary,
        }
    }
}

impl std::fmt::Display for SkipPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipPolicy::Reference => write!(f, "reference"),
            SkipPolicy::Boundary => write!(f, "boundary"),
        }
    }
}

/// Chunk geometry and skip schedule for sampled reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingConfig {
    /// Size of one chunk in bytes.
    pub chunk_size: usize,
    /// Number of chunks between skip decisions. Zero disables skipping.
    pub skip_interval: u64,
    /// Chunks added to the cumulative jump distance on every skip.
    pub skip_size: u64,
    /// When to skip.
    pub policy: SkipPolicy,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            skip_interval: DEFAULT_SKIP_INTERVAL,
            skip_size: DEFAULT_SKIP_SIZE,
            policy: SkipPolicy::default(),
        }
    }
}

impl SamplingConfig {
    /// Set the chunk size in bytes.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the skip interval in chunks (0 disables skipping).
    #[must_use]
    pub fn with_skip_interval(mut self, skip_interval: u64) -> Self {
        self.skip_interval = skip_interval;
        self
    }

    /// Set the skip size in chunks.
    #[must_use]
    pub fn with_skip_size(mut self, skip_size: u64) -> Self {
        self.skip_size = skip_size;
        self
    }

    /// Set the skip policy.
    #[must_use]
    pub fn with_policy(mut self, policy: SkipPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether this configuration reads every chunk.
    #[must_use]
    pub fn is_sequential(&self) -> bool {
        self.skip_interval == 0
    }

    fn chunk_offset(&self, chunk_index: u64) -> u64 {
        chunk_index.saturating_mul(self.chunk_size as u64)
    }
}

/// A block of file content and the absolute byte offset it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Byte offset of the first byte of `data` in the source.
    pub offset: u64,
    /// Chunk content. Shorter than the chunk size only at end of input.
    pub data: Vec<u8>,
}

/// Lazy, finite iterator over the sampled chunks of a source.
///
/// The reader consumes the source's cursor and cannot be restarted. An I/O
/// error is yielded once, after which the iterator is exhausted.
#[derive(Debug)]
pub struct ChunkReader<R> {
    source: R,
    sampling: SamplingConfig,
    start_chunk: u64,
    chunks_read: u64,
    skip_count: u64,
    /// Absolute byte offset the next read starts from.
    position: u64,
    /// Seek deferred until the next chunk is requested.
    pending_seek: Option<u64>,
    finished: bool,
}

impl<R: Read + Seek> ChunkReader<R> {
    /// Create a reader starting at chunk index `start_chunk`.
    ///
    /// No I/O happens until the first chunk is requested.
    #[must_use]
    pub fn new(source: R, sampling: SamplingConfig, start_chunk: u64) -> Self {
        Self {
            source,
            sampling,
            start_chunk,
            chunks_read: 0,
            skip_count: 0,
            position: 0,
            pending_seek: Some(sampling.chunk_offset(start_chunk)),
            finished: false,
        }
    }

    /// Number of chunks yielded so far.
    #[must_use]
    pub fn chunks_read(&self) -> u64 {
        self.chunks_read
    }

    /// Number of forward jumps scheduled so far.
    #[must_use]
    pub fn skip_count(&self) -> u64 {
        self.skip_count
    }

    fn advance(&mut self) -> io::Result<Option<Chunk>> {
        if let Some(target) = self.pending_seek.take() {
            self.position = self.source.seek(SeekFrom::Start(target))?;
        }

        let data = read_up_to(&mut self.source, self.sampling.chunk_size)?;
        if data.is_empty() {
            return Ok(None);
        }

        let chunk = Chunk {
            offset: self.position,
            data,
        };
        self.position += chunk.data.len() as u64;

        self.chunks_read += 1;
        if !self.sampling.is_sequential()
            && self
                .sampling
                .policy
                .should_skip(self.chunks_read, self.sampling.skip_interval)
        {
            self.skip_count += 1;
            let target_chunk = self
                .start_chunk
                .saturating_add(self.chunks_read)
                .saturating_add(self.sampling.skip_size.saturating_mul(self.skip_count));
            self.pending_seek = Some(self.sampling.chunk_offset(target_chunk));
        }

        Ok(Some(chunk))
    }
}

impl<R: Read + Seek> Iterator for ChunkReader<R> {
    type Item = io::Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.advance() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Read up to `limit` bytes, retrying short reads until `limit` bytes were
/// read or the source is exhausted.
pub fn read_up_to<R: Read>(source: &mut R, limit: usize) -> io::Result<Vec<u8>> {
    let mut data = Vec::with_capacity(limit.min(MAX_PREALLOC));
    let limit = u64::try_from(limit).unwrap_or(u64::MAX);
    source.take(limit).read_to_end(&mut data)?;
    Ok(data)
}
