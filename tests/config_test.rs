//! Integration tests for Settings layered loading.
//!
//! These run without a global config (temp directories only), so they
//! exercise local files merged over compiled defaults.

use std::fs;

use tempfile::TempDir;

use matrixnet::application::ApplicationError;
use matrixnet::config::{local_config_path, Settings};
use matrixnet::domain::RankTier;

#[test]
fn given_no_local_config_when_load_then_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.max_arity, Settings::default().max_arity);
    assert_eq!(settings.ranks, Settings::default().ranks);
}

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
max_arity = 2
tree_file = "network/tree.json"
required_cpv = 800
cycle = "March 2026"
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.max_arity, 2);
    assert_eq!(
        settings.tree_file.as_deref(),
        Some(std::path::Path::new("network/tree.json"))
    );
    assert_eq!(settings.required_cpv, 800);
    assert_eq!(settings.cycle, "March 2026");
}

#[test]
fn given_local_ranks_when_load_then_replace_inherited_ladder() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
[[ranks]]
name = "Member"
min_team_size = 0

[[ranks]]
name = "Captain"
min_team_size = 9
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(
        settings.ranks,
        vec![RankTier::new("Member", 0), RankTier::new("Captain", 9)]
    );
}

#[test]
fn given_zero_arity_in_local_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "max_arity = 0\n").unwrap();

    let err = Settings::load(Some(dir.path())).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_malformed_local_config_when_load_then_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = local_config_path(dir.path());
    fs::write(&path, "max_arity = [not a number\n").unwrap();

    let err = Settings::load(Some(dir.path())).unwrap_err();

    assert!(err.to_string().contains(&path.display().to_string()));
}

#[test]
fn given_template_when_written_as_local_config_then_loads_as_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), Settings::template()).unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.max_arity, Settings::default().max_arity);
    assert_eq!(settings.required_cpv, Settings::default().required_cpv);
}
