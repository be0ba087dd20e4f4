use clap::Parser;
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use skimdupe::cli::{Cli, Commands};
use skimdupe::config::{Config, ConfigError};
use skimdupe::scanner::{FingerprintAlgorithm, SkipPolicy};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Figment without the environment layer to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config.chunk_size, 1024);
    assert_eq!(config.skip_interval, 1024);
    assert_eq!(config.skip_size, 1024);
    assert_eq!(config.io_threads, 4);
    assert!(config.ignore_patterns.is_empty());
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
chunk_size = 2048
skip_interval = 0
skip_policy = "boundary"
algorithm = "blake3"
io_threads = 8
follow_symlinks = true
ignore_patterns = ["*.tmp", "target/"]
min_size = 10
verify = true
"#;
    fs::write(&config_path, toml_content).unwrap();

    let config = Config::load(Some(&config_path)).unwrap();

    assert_eq!(config.chunk_size, 2048);
    assert_eq!(config.skip_interval, 0);
    assert_eq!(config.skip_policy, SkipPolicy::Boundary);
    assert_eq!(config.algorithm, FingerprintAlgorithm::Blake3);
    assert_eq!(config.io_threads, 8);
    assert!(config.follow_symlinks);
    assert_eq!(config.ignore_patterns, vec!["*.tmp", "target/"]);
    assert_eq!(config.min_size, Some(10));
    assert!(config.verify);
    assert!(!config.strict);
}

#[test]
fn test_config_file_with_zero_chunk_size_is_rejected() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "chunk_size = 0\n").unwrap();

    let result = Config::load(Some(&config_path));
    assert!(matches!(result, Err(ConfigError::ZeroChunkSize)));
}

#[test]
fn test_config_unknown_policy_is_rejected() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "skip_policy = \"sometimes\"\n").unwrap();

    let result = Config::load(Some(&config_path));
    assert!(matches!(result, Err(ConfigError::Extract(_))));
}

#[test]
fn test_cli_flags_override_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "chunk_size = 2048\nio_threads = 8\nignore_patterns = [\"*.bak\"]\n",
    )
    .unwrap();

    let mut config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    let cli = Cli::try_parse_from([
        "skimdupe",
        "scan",
        "/path",
        "--io-threads",
        "2",
        "-i",
        "*.tmp",
    ])
    .unwrap();
    let Commands::Scan(args) = cli.command;
    args.apply_to(&mut config);

    assert_eq!(config.io_threads, 2);
    assert_eq!(config.chunk_size, 2048);
    assert_eq!(config.ignore_patterns, vec!["*.bak", "*.tmp"]);
}

#[test]
fn test_config_feeds_finder() {
    let config = Config {
        chunk_size: 64,
        skip_interval: 0,
        algorithm: FingerprintAlgorithm::Blake3,
        strict: true,
        ..Config::default()
    };

    let finder = config.finder_config();
    assert_eq!(finder.sampling.chunk_size, 64);
    assert!(finder.sampling.is_sequential());
    assert_eq!(finder.algorithm, FingerprintAlgorithm::Blake3);
    assert!(finder.strict);
}
