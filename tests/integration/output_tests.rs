use skimdupe::duplicates::{DuplicateFinder, DuplicatePair, ScanSummary};
use skimdupe::error::ExitCode;
use skimdupe::output::{CsvOutput, JsonOutput, TextOutput};
use skimdupe::scanner::FileEntry;
use std::fs;
use tempfile::{tempdir, TempDir};

fn scan_fixture() -> (TempDir, Vec<DuplicatePair>, ScanSummary) {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();
    fs::write(dir.path().join("c.txt"), b"world").unwrap();

    let (pairs, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    (dir, pairs, summary)
}

#[test]
fn test_text_output_scenario() {
    let (dir, pairs, summary) = scan_fixture();

    let mut out = Vec::new();
    let mut err = Vec::new();
    TextOutput::new(&pairs, &summary)
        .write_to(&mut out, &mut err)
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    let lines: Vec<_> = out.lines().collect();
    let expected = format!(
        "found duplicated files: {} and {}",
        dir.path().join("a.txt").display(),
        dir.path().join("b.txt").display()
    );
    assert_eq!(lines[0], expected);
    assert_eq!(lines.len(), 2);
    assert!(err.is_empty());
}

#[test]
fn test_text_output_reports_errors() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("present"), b"abc").unwrap();
    let files = vec![
        FileEntry::new(dir.path().join("present"), 3),
        FileEntry::new(dir.path().join("vanished"), 3),
    ];
    let (pairs, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files)
        .unwrap();

    let mut out = Vec::new();
    let mut err = Vec::new();
    TextOutput::new(&pairs, &summary)
        .with_quiet(true)
        .write_to(&mut out, &mut err)
        .unwrap();

    let err = String::from_utf8(err).unwrap();
    assert!(out.is_empty());
    let vanished = dir.path().join("vanished").display().to_string();
    assert_eq!(err, format!("Error on file: {vanished}, File not found\n"));
    assert_eq!(err.matches(&vanished).count(), 1);
}

#[test]
fn test_json_output_scenario() {
    let (_dir, pairs, summary) = scan_fixture();
    let exit_code = ExitCode::from_summary(&summary);
    assert_eq!(exit_code, ExitCode::Success);

    let json = JsonOutput::new(&pairs, &summary, exit_code).to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    let duplicates = parsed["duplicates"].as_array().unwrap();
    assert_eq!(duplicates.len(), 1);
    assert!(duplicates[0]["original"].as_str().unwrap().ends_with("a.txt"));
    assert!(duplicates[0]["duplicate"].as_str().unwrap().ends_with("b.txt"));
    assert_eq!(duplicates[0]["size"].as_u64().unwrap(), 5);
    assert_eq!(duplicates[0]["fingerprint"].as_str().unwrap().len(), 40);
    assert_eq!(parsed["summary"]["total_files"].as_u64().unwrap(), 3);
    assert_eq!(parsed["summary"]["exit_code_name"].as_str().unwrap(), "SD000");
}

#[test]
fn test_csv_output_scenario() {
    let (_dir, pairs, _summary) = scan_fixture();

    let csv = CsvOutput::new(&pairs).to_string().unwrap();
    let mut reader = csv::Reader::from_reader(csv.as_bytes());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["original", "duplicate", "size", "fingerprint"]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 1);
    assert!(rows[0][0].ends_with("a.txt"));
    assert_eq!(&rows[0][2], "5");
}
