//! Checker settings loaded from project files

use mya::frontend::ir::build::*;
use mya::frontend::Checker;
use mya::util::config::CheckerConfig;
use mya::{check_with_config_file, MonoType};
use std::fs;
use tempfile::TempDir;

fn empty_array_program() -> Vec<mya::Instruction> {
    vec![push_array(0, 1), set_var("a", 1), push_var("a", 2)]
}

#[test]
fn test_lenient_mode_from_project_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mya.toml");
    fs::write(&path, "[checker]\nstrict = false\n").unwrap();

    let typed = check_with_config_file(empty_array_program(), &path).unwrap();
    assert!(matches!(typed.result_type, MonoType::Array(_)));
}

#[test]
fn test_strict_mode_is_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.toml");

    let err = check_with_config_file(empty_array_program(), &path).unwrap_err();
    assert!(format!("{:#}", err).contains("Not enough information"));
}

#[test]
fn test_checker_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mya.toml");
    fs::write(&path, "[checker]\nmax_deferred_rounds = 3\n").unwrap();

    let checker = Checker::from_config_file(&path).unwrap();
    assert_eq!(checker.config().max_deferred_rounds, 3);
    assert!(checker.config().strict);
}

#[test]
fn test_invalid_project_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mya.toml");
    fs::write(&path, "[checker]\nstrict = \"yes please\"\n").unwrap();

    assert!(Checker::from_config_file(&path).is_err());
    assert!(check_with_config_file(empty_array_program(), &path).is_err());
}

#[test]
fn test_config_round_trips_through_project_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mya.toml");
    let config = CheckerConfig {
        strict: false,
        max_deferred_rounds: 7,
        log_level: "debug".to_string(),
    };
    fs::write(&path, config.to_toml_string().unwrap()).unwrap();

    assert_eq!(CheckerConfig::load(&path).unwrap(), config);
}
