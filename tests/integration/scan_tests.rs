use skimdupe::duplicates::{DuplicateFinder, FinderConfig};
use skimdupe::scanner::WalkerConfig;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

fn file_name(path: &Path) -> &str {
    path.file_name().unwrap().to_str().unwrap()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (pairs, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_pairs, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content a");
    write(&dir.path().join("b.txt"), b"content b");
    write(&dir.path().join("c.txt"), b"content c");

    let finder = DuplicateFinder::with_defaults();
    let (pairs, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.eliminated_by_partial, 3);
    assert_eq!(summary.files_sampled, 0);
}

#[test]
fn test_scan_hello_world() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"hello");
    write(&dir.path().join("b.txt"), b"hello");
    write(&dir.path().join("c.txt"), b"world");

    let finder = DuplicateFinder::with_defaults();
    let (pairs, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(pairs.len(), 1);
    assert_eq!(file_name(&pairs[0].original.path), "a.txt");
    assert_eq!(file_name(&pairs[0].duplicate.path), "b.txt");
    assert!(pairs[0].original.path.is_absolute());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_pairs, 1);
    assert_eq!(summary.reclaimable_space, 5);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir");
    fs::create_dir(&sub).unwrap();

    write(&dir.path().join("a.txt"), b"nested duplicate");
    write(&sub.join("b.txt"), b"nested duplicate");

    let finder = DuplicateFinder::with_defaults();
    let (pairs, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(pairs.len(), 1);
    assert_eq!(file_name(&pairs[0].duplicate.path), "b.txt");
}

#[test]
fn test_scan_differing_sizes_never_pair() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("short.txt"), b"abc");
    write(&dir.path().join("long.txt"), b"abcabc");

    let finder = DuplicateFinder::with_defaults();
    let (pairs, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.eliminated_by_size, 2);
}

#[test]
fn test_scan_many_copies_pair_with_first() {
    let dir = tempdir().unwrap();
    for name in ["1.bin", "2.bin", "3.bin", "4.bin"] {
        write(&dir.path().join(name), b"copy copy copy");
    }

    let finder = DuplicateFinder::with_defaults();
    let (pairs, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(pairs.len(), 3);
    for (pair, dup) in pairs.iter().zip(["2.bin", "3.bin", "4.bin"]) {
        assert_eq!(file_name(&pair.original.path), "1.bin");
        assert_eq!(file_name(&pair.duplicate.path), dup);
    }
    assert_eq!(summary.reclaimable_space, 3 * 14);
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..10 {
        let content = format!("group {}", i % 3);
        write(&dir.path().join(format!("f{i}.txt")), content.as_bytes());
    }

    let finder = DuplicateFinder::with_defaults();
    let (first, _) = finder.find_duplicates(dir.path()).unwrap();
    let (second, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 7);
}

#[test]
fn test_scan_with_size_filters() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("small1"), b"x");
    write(&dir.path().join("small2"), b"x");
    write(&dir.path().join("big1"), &[b'y'; 100]);
    write(&dir.path().join("big2"), &[b'y'; 100]);

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        min_size: Some(10),
        ..WalkerConfig::default()
    });
    let (pairs, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].size(), 100);
}

#[test]
fn test_scan_with_ignore_patterns() {
    let dir = tempdir().unwrap();
    let build = dir.path().join("build");
    fs::create_dir(&build).unwrap();
    write(&dir.path().join("keep.txt"), b"same");
    write(&build.join("ignored.txt"), b"same");

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        ignore_patterns: vec!["build/".to_string()],
        ..WalkerConfig::default()
    });
    let (pairs, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_scan_io_threads_do_not_change_result() {
    let dir = tempdir().unwrap();
    for i in 0..24 {
        let content = format!("bucket-{:02}-{}", i % 4, i % 2);
        write(&dir.path().join(format!("f{i:02}.dat")), content.as_bytes());
    }

    let single = DuplicateFinder::new(FinderConfig::default().with_io_threads(1))
        .find_duplicates(dir.path())
        .unwrap()
        .0;
    let many = DuplicateFinder::new(FinderConfig::default().with_io_threads(8))
        .find_duplicates(dir.path())
        .unwrap()
        .0;

    assert_eq!(single, many);
    assert!(!single.is_empty());
}
