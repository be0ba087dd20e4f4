//! End-to-end checks of what the sampled stage reads and skips.
//!
//! With chunk size 4, skip interval 4 and skip size 4 the sampled reader
//! starting at chunk 1 visits chunks 1, 6, 11, 16, 17, 22, ... under the
//! default policy, and chunks 1-4, 9-12, ... under the boundary policy.

use skimdupe::duplicates::{DuplicateFinder, FinderConfig};
use skimdupe::scanner::{FingerprintAlgorithm, SamplingConfig, SkipPolicy};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const LEN: usize = 200;

fn small_sampling() -> SamplingConfig {
    SamplingConfig::default()
        .with_chunk_size(4)
        .with_skip_interval(4)
        .with_skip_size(4)
}

/// Two files of `LEN` bytes that differ only at byte `at`.
fn write_pair(dir: &Path, at: usize) {
    let base: Vec<u8> = (0..LEN).map(|i| (i % 97) as u8).collect();
    let mut changed = base.clone();
    changed[at] ^= 0xff;
    fs::write(dir.join("a.bin"), &base).unwrap();
    fs::write(dir.join("b.bin"), &changed).unwrap();
}

fn scan(dir: &Path, config: FinderConfig) -> (usize, usize) {
    let (pairs, summary) = DuplicateFinder::new(config).find_duplicates(dir).unwrap();
    (pairs.len(), summary.verify_mismatches)
}

#[test]
fn test_difference_in_skipped_chunk_is_not_seen() {
    let dir = tempdir().unwrap();
    // Byte 9 lives in chunk 2, which the default schedule skips
    write_pair(dir.path(), 9);

    let config = FinderConfig::default().with_sampling(small_sampling());
    assert_eq!(scan(dir.path(), config), (1, 0));
}

#[test]
fn test_difference_in_visited_chunk_is_seen() {
    let dir = tempdir().unwrap();
    // Byte 25 lives in chunk 6
    write_pair(dir.path(), 25);

    let config = FinderConfig::default().with_sampling(small_sampling());
    assert_eq!(scan(dir.path(), config), (0, 0));
}

#[test]
fn test_difference_in_first_chunk_stops_at_partial_stage() {
    let dir = tempdir().unwrap();
    write_pair(dir.path(), 2);

    let config = FinderConfig::default().with_sampling(small_sampling());
    let (pairs, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.eliminated_by_partial, 2);
    assert_eq!(summary.files_sampled, 0);
}

#[test]
fn test_sequential_reading_sees_everything() {
    let dir = tempdir().unwrap();
    write_pair(dir.path(), 9);

    let config =
        FinderConfig::default().with_sampling(small_sampling().with_skip_interval(0));
    assert_eq!(scan(dir.path(), config), (0, 0));
}

#[test]
fn test_verify_drops_sampling_false_positive() {
    let dir = tempdir().unwrap();
    write_pair(dir.path(), 9);

    let config = FinderConfig::default()
        .with_sampling(small_sampling())
        .with_verify(true);
    assert_eq!(scan(dir.path(), config), (0, 1));
}

#[test]
fn test_boundary_policy_reads_runs() {
    let dir = tempdir().unwrap();
    // Chunk 2 is inside the first run of the boundary schedule
    write_pair(dir.path(), 9);

    let config = FinderConfig::default()
        .with_sampling(small_sampling().with_policy(SkipPolicy::Boundary));
    assert_eq!(scan(dir.path(), config), (0, 0));

    // Chunk 6 falls in the first gap
    let dir = tempdir().unwrap();
    write_pair(dir.path(), 25);

    let config = FinderConfig::default()
        .with_sampling(small_sampling().with_policy(SkipPolicy::Boundary));
    assert_eq!(scan(dir.path(), config), (1, 0));
}

#[test]
fn test_algorithms_agree_on_pairs() {
    let dir = tempdir().unwrap();
    write_pair(dir.path(), 25);
    fs::write(dir.path().join("c.bin"), fs::read(dir.path().join("a.bin")).unwrap()).unwrap();

    let sha1 = DuplicateFinder::new(FinderConfig::default())
        .find_duplicates(dir.path())
        .unwrap()
        .0;
    let blake3 = DuplicateFinder::new(
        FinderConfig::default().with_algorithm(FingerprintAlgorithm::Blake3),
    )
    .find_duplicates(dir.path())
    .unwrap()
    .0;

    assert_eq!(sha1.len(), 1);
    assert_eq!(blake3.len(), 1);
    assert_eq!(sha1[0].original, blake3[0].original);
    assert_eq!(sha1[0].duplicate, blake3[0].duplicate);
    assert_ne!(sha1[0].fingerprint, blake3[0].fingerprint);
}

#[test]
fn test_verify_keeps_identical_files_after_an_impostor() {
    let dir = tempdir().unwrap();
    // Chunk 2 (bytes 2048..3072) is never sampled with the default schedule
    let content: Vec<u8> = (0..3072).map(|i| (i % 97) as u8).collect();
    let mut impostor = content.clone();
    impostor[2500] ^= 0xff;
    fs::write(dir.path().join("a.bin"), &impostor).unwrap();
    fs::write(dir.path().join("b.bin"), &content).unwrap();
    fs::write(dir.path().join("c.bin"), &content).unwrap();

    let (pairs, summary) = DuplicateFinder::new(FinderConfig::default().with_verify(true))
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(pairs.len(), 1);
    assert!(pairs[0].original.path.ends_with("b.bin"));
    assert!(pairs[0].duplicate.path.ends_with("c.bin"));
    assert_eq!(summary.verify_mismatches, 1);
}
