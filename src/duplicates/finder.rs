//! Duplicate finder implementation with multi-stage detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk**: collect every regular file below the root
//! 2. **Size grouping**: bucket files by exact size (see [`crate::duplicates::groups`])
//! 3. **Partial stage**: fingerprint the first chunk of each file in a
//!    multi-member bucket and split the bucket into partial groups
//! 4. **Sampled stage**: fingerprint a sparse chunk subsequence of each file
//!    in a multi-member partial group and pair files sharing a fingerprint
//!
//! Buckets are processed concurrently on a bounded rayon pool. Inside a
//! bucket the work is sequential, and results are collected in bucket
//! order, so the reported pairs do not depend on thread scheduling.
//!
//! # Example
//!
//! ```no_run
//! use skimdupe::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(2));
//! let (pairs, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! for pair in &pairs {
//!     println!("{} == {}", pair.original.path.display(), pair.duplicate.path.display());
//! }
//! println!("{} reclaimable", summary.reclaimable_display());
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{
    group_by_partial, group_by_size, DuplicateIndex, DuplicatePair, PartialGroup, SizeGroup,
};
use crate::progress::ProgressCallback;
use crate::scanner::{
    FileEntry, Fingerprint, FingerprintAlgorithm, HashError, Hasher, SamplingConfig, ScanError,
    Walker, WalkerConfig,
};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads; buckets are fingerprinted in parallel.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Fail on the first per-file error instead of skipping the file.
    pub strict: bool,
    /// Compare files byte-by-byte before reporting a pair.
    pub verify: bool,
    /// Chunk size and skip schedule for fingerprints.
    pub sampling: SamplingConfig,
    /// Digest used for fingerprints.
    pub algorithm: FingerprintAlgorithm,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("strict", &self.strict)
            .field("verify", &self.verify)
            .field("sampling", &self.sampling)
            .field("algorithm", &self.algorithm)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            strict: false,
            verify: false,
            sampling: SamplingConfig::default(),
            algorithm: FingerprintAlgorithm::default(),
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the I/O thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set fail-fast on any error.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable byte-by-byte verification of reported pairs.
    #[must_use]
    pub fn with_verify(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }

    /// Set the sampling schedule.
    #[must_use]
    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set the fingerprint digest.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: FingerprintAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Total number of files considered
    pub total_files: usize,
    /// Total size of all considered files in bytes
    pub total_size: u64,
    /// Files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Files eliminated by partial fingerprint (unique first chunk)
    pub eliminated_by_partial: usize,
    /// Files whose sampled fingerprint was computed
    pub files_sampled: usize,
    /// Number of duplicate pairs reported
    pub duplicate_pairs: usize,
    /// Files whose sampled fingerprint matched an earlier file but whose
    /// bytes matched none of them (verification only)
    pub verify_mismatches: usize,
    /// Total space that can be reclaimed by removing every duplicate
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Per-file errors encountered during the scan
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Whether any file was skipped because of an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty()
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred during scanning.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The fingerprinting thread pool could not be created.
    #[error("Failed to build I/O thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A per-file error in strict mode.
    #[error(transparent)]
    ScanError(#[from] ScanError),
}

/// Output of one stage over one bucket or group.
#[derive(Debug, Default)]
struct StageOutcome<T> {
    value: T,
    errors: Vec<HashError>,
    interrupted: bool,
}

/// Partial-stage output for one size bucket.
#[derive(Debug, Default)]
struct PartialOutcome {
    groups: Vec<PartialGroup>,
    eliminated: usize,
}

/// Sampled-stage output for one partial group.
#[derive(Debug, Default)]
struct SampledOutcome {
    pairs: Vec<DuplicatePair>,
    sampled: usize,
    mismatches: usize,
}

/// Shared progress counter for one stage.
struct StageProgress<'a> {
    callback: Option<&'a Arc<dyn ProgressCallback>>,
    done: AtomicUsize,
}

impl<'a> StageProgress<'a> {
    fn start(callback: Option<&'a Arc<dyn ProgressCallback>>, phase: &str, total: usize) -> Self {
        if let Some(cb) = callback {
            cb.on_phase_start(phase, total);
        }
        Self {
            callback,
            done: AtomicUsize::new(0),
        }
    }

    fn tick(&self, file: &FileEntry) {
        if let Some(cb) = self.callback {
            let current = self.done.fetch_add(1, Ordering::Relaxed) + 1;
            cb.on_progress(current, file.path.to_string_lossy().as_ref());
            cb.on_item_completed(file.size);
        }
    }

    fn finish(self, phase: &str) {
        if let Some(cb) = self.callback {
            cb.on_phase_end(phase);
        }
    }
}

/// Duplicate finder that orchestrates the detection pipeline.
///
/// # Example
///
/// ```no_run
/// use skimdupe::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let finder = DuplicateFinder::with_defaults();
/// match finder.find_duplicates(Path::new(".")) {
///     Ok((pairs, summary)) => {
///         println!("Found {} duplicate pairs", pairs.len());
///         println!("Can reclaim {} bytes", summary.reclaimable_space);
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new(config.sampling, config.algorithm);
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files below `path`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory
    /// - The scan is interrupted by shutdown signal
    /// - A per-file error occurs in strict mode
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicatePair>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }

        log::info!("Starting duplicate scan of {}", path.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let callback = self.config.progress_callback.as_ref();
        if let Some(cb) = callback {
            cb.on_phase_start("walking", 0);
            cb.on_message(&format!("Walking {}", path.display()));
        }

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(cb) = callback {
            walker = walker.with_progress_callback(cb.clone());
        }

        let mut files = Vec::new();
        let mut walk_errors = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => files.push(file),
                Err(e) if self.config.strict => return Err(FinderError::ScanError(e)),
                Err(e) => walk_errors.push(e),
            }
        }

        if let Some(cb) = callback {
            cb.on_phase_end("walking");
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!("Found {} files", files.len());

        let summary = ScanSummary {
            scan_errors: walk_errors,
            ..Default::default()
        };
        self.run_pipeline(files, summary, start_time)
    }

    /// Find duplicates among a pre-collected list of files.
    ///
    /// The order of `files` decides which file of a pair is the original.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` on interruption or, in strict mode, on the
    /// first per-file error.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileEntry>,
    ) -> Result<(Vec<DuplicatePair>, ScanSummary), FinderError> {
        self.run_pipeline(files, ScanSummary::default(), Instant::now())
    }

    fn run_pipeline(
        &self,
        files: Vec<FileEntry>,
        mut summary: ScanSummary,
        start_time: Instant,
    ) -> Result<(Vec<DuplicatePair>, ScanSummary), FinderError> {
        summary.total_files = files.len();
        summary.total_size = files.iter().map(|f| f.size).sum();

        let (size_groups, size_stats) = group_by_size(files);
        summary.eliminated_by_size = size_stats.eliminated_unique;

        log::info!(
            "Size grouping: {} → {} files in {} buckets ({:.1}% eliminated)",
            size_stats.total_files,
            size_stats.potential_duplicates,
            size_stats.duplicate_groups,
            size_stats.elimination_rate()
        );

        if size_groups.is_empty() {
            log::info!("No potential duplicates found after size grouping");
            summary.scan_duration = start_time.elapsed();
            return Ok((Vec::new(), summary));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads.max(1))
            .build()?;
        let callback = self.config.progress_callback.as_ref();

        // Partial stage
        let progress = StageProgress::start(callback, "partial", size_stats.potential_duplicates);
        let outcomes: Vec<StageOutcome<PartialOutcome>> = pool.install(|| {
            size_groups
                .into_par_iter()
                .map(|group| self.partial_stage(group, &progress))
                .collect()
        });
        progress.finish("partial");

        let mut partial_groups = Vec::new();
        for outcome in outcomes {
            self.absorb_errors(&mut summary, outcome.errors, outcome.interrupted)?;
            summary.eliminated_by_partial += outcome.value.eliminated;
            partial_groups.extend(outcome.value.groups);
        }

        let candidates: usize = partial_groups.iter().map(PartialGroup::len).sum();
        log::info!(
            "Partial fingerprints: {} files remain in {} groups",
            candidates,
            partial_groups.len()
        );

        if partial_groups.is_empty() {
            summary.scan_duration = start_time.elapsed();
            return Ok((Vec::new(), summary));
        }

        // Sampled stage
        let progress = StageProgress::start(callback, "sampled", candidates);
        let outcomes: Vec<StageOutcome<SampledOutcome>> = pool.install(|| {
            partial_groups
                .into_par_iter()
                .map(|group| self.sampled_stage(group, &progress))
                .collect()
        });
        progress.finish("sampled");

        let mut pairs = Vec::new();
        for outcome in outcomes {
            self.absorb_errors(&mut summary, outcome.errors, outcome.interrupted)?;
            summary.files_sampled += outcome.value.sampled;
            summary.verify_mismatches += outcome.value.mismatches;
            pairs.extend(outcome.value.pairs);
        }

        summary.duplicate_pairs = pairs.len();
        summary.reclaimable_space = pairs.iter().map(DuplicatePair::size).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate pairs, {} reclaimable, {} errors",
            summary.duplicate_pairs,
            summary.reclaimable_display(),
            summary.scan_errors.len()
        );

        Ok((pairs, summary))
    }

    /// Fold one outcome's errors into the summary, failing on interruption
    /// or on the first error in strict mode.
    fn absorb_errors(
        &self,
        summary: &mut ScanSummary,
        errors: Vec<HashError>,
        interrupted: bool,
    ) -> Result<(), FinderError> {
        if interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }
        if self.config.strict {
            if let Some(first) = errors.into_iter().next() {
                return Err(FinderError::ScanError(first.into()));
            }
            return Ok(());
        }
        summary.scan_errors.extend(errors.into_iter().map(ScanError::from));
        Ok(())
    }

    /// Split one size bucket by partial fingerprint.
    fn partial_stage(
        &self,
        group: SizeGroup,
        progress: &StageProgress<'_>,
    ) -> StageOutcome<PartialOutcome> {
        let mut outcome = StageOutcome::<PartialOutcome>::default();
        let mut fingerprinted = Vec::with_capacity(group.files.len());

        for file in group.files {
            if self.config.is_shutdown_requested() {
                outcome.interrupted = true;
                return outcome;
            }

            match self.hasher.partial_fingerprint(&file.path) {
                Ok(fp) => {
                    log::trace!("Partial fingerprint computed: {}", file.path.display());
                    progress.tick(&file);
                    fingerprinted.push((file, fp));
                }
                Err(e) => {
                    log::debug!("Error on file: {}, {}", file.path.display(), e);
                    outcome.errors.push(e);
                    if self.config.strict {
                        return outcome;
                    }
                }
            }
        }

        for partial in group_by_partial(fingerprinted) {
            if partial.has_duplicates() {
                outcome.value.groups.push(partial);
            } else {
                outcome.value.eliminated += partial.len();
            }
        }
        outcome
    }

    /// Pair files of one partial group by sampled fingerprint.
    fn sampled_stage(
        &self,
        group: PartialGroup,
        progress: &StageProgress<'_>,
    ) -> StageOutcome<SampledOutcome> {
        let mut outcome = StageOutcome::<SampledOutcome>::default();
        let mut index = DuplicateIndex::new();
        // Verified mode: every content-distinct file per fingerprint
        let mut representatives: HashMap<Fingerprint, Vec<FileEntry>> = HashMap::new();

        for file in group.files {
            if self.config.is_shutdown_requested() {
                outcome.interrupted = true;
                return outcome;
            }

            let fingerprint = match self.hasher.sampled_fingerprint(&file.path) {
                Ok(fp) => fp,
                Err(e) => {
                    log::debug!("Error on file: {}, {}", file.path.display(), e);
                    outcome.errors.push(e);
                    if self.config.strict {
                        return outcome;
                    }
                    continue;
                }
            };
            progress.tick(&file);
            outcome.value.sampled += 1;

            let pair = if self.config.verify {
                let known = representatives.entry(fingerprint).or_default();
                match self.verified_match(known, &file).map(|m| m.cloned()) {
                    Ok(Some(original)) => Some(DuplicatePair {
                        original,
                        duplicate: file,
                        fingerprint,
                    }),
                    Ok(None) => {
                        if !known.is_empty() {
                            outcome.value.mismatches += 1;
                        }
                        known.push(file);
                        None
                    }
                    Err(e) => {
                        log::debug!("Error on file: {}, {}", e.path().display(), e);
                        outcome.errors.push(e);
                        if self.config.strict {
                            return outcome;
                        }
                        None
                    }
                }
            } else {
                index.insert(file, fingerprint)
            };

            if let Some(pair) = pair {
                log::debug!(
                    "Duplicate: {} and {}",
                    pair.original.path.display(),
                    pair.duplicate.path.display()
                );
                outcome.value.pairs.push(pair);
            }
        }
        outcome
    }

    /// First of `known` whose bytes equal `file`, compared in order.
    fn verified_match<'k>(
        &self,
        known: &'k [FileEntry],
        file: &FileEntry,
    ) -> Result<Option<&'k FileEntry>, HashError> {
        for candidate in known {
            if self.hasher.files_identical(&candidate.path, &file.path)? {
                return Ok(Some(candidate));
            }
            log::warn!(
                "Fingerprints match but contents differ: {} and {}",
                candidate.path.display(),
                file.path.display()
            );
        }
        Ok(None)
    }
}
