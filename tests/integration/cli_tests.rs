use clap::Parser;
use skimdupe::cli::Cli;
use skimdupe::error::{ExitCode, StructuredError};
use skimdupe::run_app;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(args: &[&str], path: &Path) -> anyhow::Result<ExitCode> {
    let path = path.to_str().unwrap();
    let mut argv = vec!["skimdupe", "-q", "scan", path, "--no-progress"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_run_app_duplicates_found() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();

    assert_eq!(run(&[], dir.path()).unwrap(), ExitCode::Success);
}

#[test]
fn test_run_app_no_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"world").unwrap();

    assert_eq!(run(&[], dir.path()).unwrap(), ExitCode::NoDuplicates);
}

#[test]
fn test_run_app_json_and_csv() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"same").unwrap();

    assert_eq!(
        run(&["--output", "json"], dir.path()).unwrap(),
        ExitCode::Success
    );
    assert_eq!(
        run(&["--output", "csv", "--algorithm", "blake3"], dir.path()).unwrap(),
        ExitCode::Success
    );
}

#[test]
fn test_run_app_missing_path_is_general_error() {
    let dir = tempdir().unwrap();
    let err = run(&[], &dir.path().join("absent")).unwrap_err();

    assert_eq!(ExitCode::from_error(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("Path not found"));
}

#[test]
fn test_run_app_rejects_zero_chunk_size() {
    let dir = tempdir().unwrap();
    let err = run(&["--chunk-size", "0"], dir.path()).unwrap_err();

    assert!(format!("{err:#}").contains("chunk_size must be greater than 0"));
}

#[test]
fn test_run_app_rejects_oversized_chunk_size() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();

    let err = run(&["--chunk-size", "1T"], dir.path()).unwrap_err();

    assert!(format!("{err:#}").contains("larger than the maximum"));
}

#[test]
fn test_run_app_missing_config_file() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    let err = run(&["--config", missing.to_str().unwrap()], dir.path()).unwrap_err();

    assert!(format!("{err:#}").contains("Config file not found"));
}

#[test]
fn test_run_app_reads_config_file() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("a.log"), b"same").unwrap();
    fs::write(data.join("b.log"), b"same").unwrap();

    let config = dir.path().join("config.toml");
    fs::write(&config, "ignore_patterns = [\"*.log\"]\n").unwrap();

    let code = run(&["--config", config.to_str().unwrap()], &data).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_structured_error_for_failure() {
    let dir = tempdir().unwrap();
    let err = run(&[], &dir.path().join("absent")).unwrap_err();
    let structured = StructuredError::new(&err, ExitCode::from_error(&err));

    let json = serde_json::to_value(&structured).unwrap();
    assert_eq!(json["code"], "SD001");
    assert_eq!(json["exit_code"], 1);
    assert_eq!(json["interrupted"], false);
}
