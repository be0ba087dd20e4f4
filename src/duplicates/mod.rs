//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping
//! - Partial fingerprint grouping within a size bucket
//! - Sampled fingerprint pairing within a partial group
//! - Pipeline orchestration via [`DuplicateFinder`]

pub mod finder;
pub mod groups;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{
    group_by_partial, group_by_size, DuplicateIndex, DuplicatePair, GroupingStats, PartialGroup,
    SizeGroup,
};
