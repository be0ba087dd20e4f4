//! Size buckets, partial-fingerprint groups and duplicate pairs.
//!
//! # Overview
//!
//! Size grouping is the first stage of duplicate detection. Files with
//! different sizes cannot be duplicates, so every file is put into a bucket
//! keyed by its exact size and buckets holding a single file are dropped.
//!
//! Within a bucket, files are then split by partial fingerprint into
//! [`PartialGroup`]s, and within each partial group a [`DuplicateIndex`]
//! pairs every file whose sampled fingerprint has already been seen with
//! the first file that produced it.
//!
//! Buckets and groups are kept in first-seen order, and files keep their
//! insertion order inside them, so the whole pipeline is deterministic for
//! a given input order.
//!
//! # Example
//!
//! ```
//! use skimdupe::scanner::FileEntry;
//! use skimdupe::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;
use std::hash::Hash;

use crate::scanner::{fingerprint_to_hex, FileEntry, Fingerprint};

/// A group of files with the same size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size, in first-seen order
    pub files: Vec<FileEntry>,
}

impl SizeGroup {
    /// Create an empty size group.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            files: Vec::new(),
        }
    }

    /// Create a size group with initial files.
    #[must_use]
    pub fn with_files(size: u64, files: Vec<FileEntry>) -> Self {
        Self { size, files }
    }

    /// Add a file to this group.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if file size doesn't match group size.
    pub fn add(&mut self, file: FileEntry) {
        debug_assert_eq!(
            file.size, self.size,
            "File size {} doesn't match group size {}",
            file.size, self.size
        );
        self.files.push(file);
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this group has potential duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size.saturating_mul(self.files.len() as u64)
    }
}

/// Files of one size bucket sharing a partial fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialGroup {
    /// Fingerprint of the first chunk shared by every file in the group
    pub fingerprint: Fingerprint,
    /// Files in first-seen order
    pub files: Vec<FileEntry>,
}

impl PartialGroup {
    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this group has potential duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }
}

/// A reported duplicate: `duplicate` matched the earlier `original`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatePair {
    /// First file seen with this fingerprint
    pub original: FileEntry,
    /// Later file with the same size, partial and sampled fingerprint
    pub duplicate: FileEntry,
    /// The shared sampled fingerprint
    pub fingerprint: Fingerprint,
}

impl DuplicatePair {
    /// Size of either file.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.duplicate.size
    }

    /// Sampled fingerprint as hexadecimal string.
    #[must_use]
    pub fn fingerprint_hex(&self) -> String {
        fingerprint_to_hex(&self.fingerprint)
    }
}

/// Maps each sampled fingerprint to the first file that produced it.
///
/// Scoped to a single [`PartialGroup`]. First-seen wins: later matches are
/// all paired with that representative, never with each other.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    seen: HashMap<Fingerprint, FileEntry>,
}

impl DuplicateIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `file` under `fingerprint`.
    ///
    /// Returns a [`DuplicatePair`] of `(existing, file)` when the fingerprint
    /// was already present; otherwise `file` becomes the representative.
    pub fn insert(&mut self, file: FileEntry, fingerprint: Fingerprint) -> Option<DuplicatePair> {
        match self.seen.get(&fingerprint) {
            Some(original) => Some(DuplicatePair {
                original: original.clone(),
                duplicate: file,
                fingerprint,
            }),
            None => {
                self.seen.insert(fingerprint, file);
                None
            }
        }
    }

    /// Number of distinct fingerprints seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Statistics from size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of unique file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of zero-byte files encountered
    pub empty_files: usize,
    /// Number of size groups with 2+ files (potential duplicate groups)
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group items by key, keeping groups in first-seen order and items in
/// insertion order within each group.
pub(crate) fn group_in_order<K, T>(items: impl IntoIterator<Item = (K, T)>) -> Vec<(K, Vec<T>)>
where
    K: Eq + Hash + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();

    for (key, item) in items {
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(item),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![item]));
            }
        }
    }

    groups
}

/// Group files by size (first stage of duplicate detection).
///
/// Single pass, no file I/O. Buckets are returned in the order their size
/// was first seen and only buckets with 2+ files are kept. Zero-byte files
/// form their own bucket like any other size.
///
/// # Example
///
/// ```
/// use skimdupe::scanner::FileEntry;
/// use skimdupe::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileEntry::new(PathBuf::from("/c.txt"), 200),
///     FileEntry::new(PathBuf::from("/a.txt"), 100),
///     FileEntry::new(PathBuf::from("/b.txt"), 100),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].size, 100);
/// assert_eq!(groups[0].len(), 2);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(files: impl IntoIterator<Item = FileEntry>) -> (Vec<SizeGroup>, GroupingStats) {
    let mut stats = GroupingStats::default();

    let keyed = files.into_iter().map(|file| {
        stats.total_files += 1;
        stats.total_size = stats.total_size.saturating_add(file.size);
        if file.size == 0 {
            stats.empty_files += 1;
        }
        (file.size, file)
    });
    let all_groups = group_in_order(keyed);

    stats.unique_sizes = all_groups.len();

    let mut groups = Vec::new();
    for (size, files) in all_groups {
        if files.len() == 1 {
            stats.eliminated_unique += 1;
            log::trace!(
                "Eliminated unique size {}: {}",
                size,
                files[0].path.display()
            );
        } else {
            stats.potential_duplicates += files.len();
            stats.duplicate_groups += 1;
            log::debug!(
                "Size group {} bytes: {} potential duplicates",
                size,
                files.len()
            );
            groups.push(SizeGroup::with_files(size, files));
        }
    }

    log::debug!(
        "Size grouping: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (groups, stats)
}

/// Split fingerprinted files into [`PartialGroup`]s.
///
/// Groups are in first-seen order; groups with a single file are kept so
/// the caller can count what was eliminated.
#[must_use]
pub fn group_by_partial(
    fingerprinted: impl IntoIterator<Item = (FileEntry, Fingerprint)>,
) -> Vec<PartialGroup> {
    group_in_order(fingerprinted.into_iter().map(|(file, fp)| (fp, file)))
        .into_iter()
        .map(|(fingerprint, files)| PartialGroup { fingerprint, files })
        .collect()
}
