use super::args::CliArgs;
use super::config::{ClosurizeConfig, load_config, parse_config, resolve_options};
use clap::Parser;
use std::path::{Path, PathBuf};

fn args(extra: &[&str]) -> CliArgs {
    let mut argv = vec!["closurize", "program.json"];
    argv.extend_from_slice(extra);
    CliArgs::try_parse_from(argv).expect("valid args")
}

#[test]
fn parses_camel_case_fields() {
    let config = parse_config(
        r#"{
            "unwrapWrappers": false,
            "typeAnnotations": "true",
            "suppressions": ["checkTypes", "visibility"],
            "fileoverviewText": "generated"
        }"#,
    )
    .expect("valid config");
    assert_eq!(config.unwrap_wrappers, Some(false));
    assert_eq!(config.type_annotations, Some(true));
    assert_eq!(config.downlevel_calls, None);
    assert_eq!(
        config.suppressions,
        Some(vec!["checkTypes".to_string(), "visibility".to_string()])
    );
    assert_eq!(config.fileoverview_text.as_deref(), Some("generated"));
}

#[test]
fn rejects_invalid_boolean_string() {
    let err = parse_config(r#"{ "fileoverview": "maybe" }"#).unwrap_err();
    assert!(format!("{err:#}").contains("invalid boolean value"));
}

#[test]
fn flags_override_config() {
    let config = ClosurizeConfig {
        unwrap_wrappers: Some(true),
        fileoverview: Some(false),
        ..ClosurizeConfig::default()
    };
    let options = resolve_options(&config, &args(&["--noUnwrap"]), Path::new("/work"));
    assert!(!options.unwrap_wrappers);
    assert!(!options.fileoverview);
    assert!(options.downlevel_calls);
    assert!(options.type_annotations);
    assert_eq!(options.root_dir, PathBuf::from("/work"));
    assert_eq!(options.fileoverview_options.suppressions, vec!["checkTypes"]);
}

#[test]
fn root_dir_prefers_flag() {
    let config = ClosurizeConfig {
        root_dir: Some(PathBuf::from("/from/config")),
        ..ClosurizeConfig::default()
    };
    let options = resolve_options(&config, &args(&[]), Path::new("/work"));
    assert_eq!(options.root_dir, PathBuf::from("/from/config"));
    let options = resolve_options(&config, &args(&["--rootDir", "/flag"]), Path::new("/work"));
    assert_eq!(options.root_dir, PathBuf::from("/flag"));
}

#[test]
fn load_config_resolves_root_dir_against_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("closurize.json");
    std::fs::write(&path, r#"{ "rootDir": "src" }"#).expect("write config");
    let config = load_config(&path).expect("load config");
    assert_eq!(config.root_dir, Some(dir.path().join("src")));
}
