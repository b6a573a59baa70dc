// tests/config_loading.rs

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use cmdexec::config::{ConfigFile, load_and_validate, load_from_path, load_or_default};
use cmdexec::errors::CmdexecError;
use cmdexec::exec::DEFAULT_MAX_BUFFER;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_full_config_is_parsed() {
    let file = config_file(
        r#"
[defaults]
max_buffer = 4096
strip_final_newline = true
reject = true

[helper]
path = "/opt/cmdexec/bin/cmdexec-helper"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.defaults.max_buffer, 4096);
    assert!(cfg.defaults.strip_final_newline);
    assert!(cfg.defaults.reject);
    assert_eq!(
        cfg.helper.path,
        Some(PathBuf::from("/opt/cmdexec/bin/cmdexec-helper"))
    );
}

#[test]
fn test_missing_sections_use_engine_defaults() {
    let file = config_file("");

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.defaults.max_buffer, DEFAULT_MAX_BUFFER);
    assert!(!cfg.defaults.strip_final_newline);
    assert!(!cfg.defaults.reject);
    assert_eq!(cfg.helper.path, None);
}

#[test]
fn test_partial_defaults_keep_the_rest() {
    let file = config_file("[defaults]\nstrip_final_newline = true\n");

    let cfg = load_and_validate(file.path()).unwrap();

    assert!(cfg.defaults.strip_final_newline);
    assert_eq!(cfg.defaults.max_buffer, DEFAULT_MAX_BUFFER);
}

#[test]
fn test_zero_max_buffer_returns_config_error() {
    let file = config_file("[defaults]\nmax_buffer = 0\n");

    match load_and_validate(file.path()) {
        Err(CmdexecError::ConfigError(msg)) => {
            assert!(msg.contains("max_buffer"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_empty_helper_path_returns_config_error() {
    let file = config_file("[helper]\npath = \"\"\n");

    let result = load_and_validate(file.path());

    assert!(matches!(result, Err(CmdexecError::ConfigError(_))));
}

#[test]
fn test_unknown_field_returns_toml_error() {
    let file = config_file("[defaults]\nmax_bufer = 10\n");

    let result = load_from_path(file.path());

    assert!(matches!(result, Err(CmdexecError::TomlError(_))));
}

#[test]
fn test_invalid_toml_returns_toml_error() {
    let file = config_file("[defaults\nmax_buffer = ");

    let result = load_and_validate(file.path());

    assert!(matches!(result, Err(CmdexecError::TomlError(_))));
}

#[test]
fn test_explicit_missing_path_is_an_error() {
    let result = load_or_default(Some(Path::new("/definitely/not/here/Cmdexec.toml")));

    assert!(matches!(result, Err(CmdexecError::IoError(_))));
}

#[test]
fn test_explicit_path_is_loaded() {
    let file = config_file("[defaults]\nreject = true\n");

    let cfg = load_or_default(Some(file.path())).unwrap();

    assert!(cfg.defaults.reject);
}

#[test]
fn test_default_config_matches_engine_defaults() {
    let cfg = ConfigFile::default();

    assert_eq!(cfg.defaults.max_buffer, 20 * 1024 * 1024);
    assert_eq!(cfg.helper.path, None);
}
