use skimdupe::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use skimdupe::scanner::{FileEntry, HashError, ScanError, Walker, WalkerConfig};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_find_duplicates_from_files_continues_on_error() {
    let finder = DuplicateFinder::with_defaults();
    // Files that don't exist trigger fingerprinting errors
    let file1 = FileEntry::new(PathBuf::from("nonexistent_1.txt"), 100);
    let file2 = FileEntry::new(PathBuf::from("nonexistent_2.txt"), 100);

    let (pairs, summary) = finder
        .find_duplicates_from_files(vec![file1, file2])
        .unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.scan_errors.len(), 2);

    for err in &summary.scan_errors {
        match err {
            ScanError::HashError(HashError::NotFound(_)) => {}
            _ => panic!("Expected NotFound HashError, got: {:?}", err),
        }
    }
}

#[test]
fn test_find_duplicates_from_files_strict_fails() {
    let config = FinderConfig::default().with_strict(true);
    let finder = DuplicateFinder::new(config);
    let file1 = FileEntry::new(PathBuf::from("nonexistent_1.txt"), 100);
    let file2 = FileEntry::new(PathBuf::from("nonexistent_2.txt"), 100);

    let result = finder.find_duplicates_from_files(vec![file1, file2]);

    match result.unwrap_err() {
        FinderError::ScanError(ScanError::HashError(HashError::NotFound(_))) => {}
        other => panic!("Expected NotFound ScanError, got: {:?}", other),
    }
}

#[test]
fn test_file_removed_after_walk() {
    let dir = tempdir().unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        fs::write(dir.path().join(name), b"same bytes").unwrap();
    }

    let files: Vec<FileEntry> = Walker::new(dir.path(), WalkerConfig::default())
        .walk()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(files.len(), 3);

    // Gone between enumeration and fingerprinting
    fs::remove_file(dir.path().join("b.txt")).unwrap();

    let (pairs, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files)
        .unwrap();

    assert_eq!(summary.scan_errors.len(), 1);
    assert!(summary.scan_errors[0].path().ends_with("b.txt"));
    assert_eq!(pairs.len(), 1);
    assert!(pairs[0].original.path.ends_with("a.txt"));
    assert!(pairs[0].duplicate.path.ends_with("c.txt"));
}

#[test]
fn test_errors_in_one_bucket_do_not_affect_another() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x1"), b"xx").unwrap();
    fs::write(dir.path().join("x2"), b"xx").unwrap();

    let mut files = vec![
        FileEntry::new(dir.path().join("missing_1"), 7),
        FileEntry::new(dir.path().join("missing_2"), 7),
    ];
    files.push(FileEntry::new(dir.path().join("x1"), 2));
    files.push(FileEntry::new(dir.path().join("x2"), 2));

    let (pairs, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files)
        .unwrap();

    assert_eq!(pairs.len(), 1);
    assert_eq!(summary.scan_errors.len(), 2);
    assert!(summary.has_errors());
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let result = DuplicateFinder::with_defaults().find_duplicates(&dir.path().join("absent"));
    assert!(matches!(result, Err(FinderError::PathNotFound(_))));
}

#[test]
fn test_file_root_is_fatal() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, b"x").unwrap();

    let result = DuplicateFinder::with_defaults().find_duplicates(&file);
    assert!(matches!(result, Err(FinderError::NotADirectory(_))));
}

#[test]
fn test_requested_shutdown_interrupts() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"1").unwrap();
    fs::write(dir.path().join("b"), b"1").unwrap();

    let flag = Arc::new(AtomicBool::new(true));
    let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(flag));

    let result = finder.find_duplicates(dir.path());
    assert!(matches!(result, Err(FinderError::Interrupted)));
}
