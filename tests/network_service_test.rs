//! Tests for NetworkService (file loading and portal queries)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use matrixnet::application::ApplicationError;
use matrixnet::cli::CliError;
use matrixnet::config::Settings;
use matrixnet::domain::{DomainError, RankTier, TreeViolation};
use matrixnet::exitcode;
use matrixnet::infrastructure::di::ServiceContainer;
use matrixnet::infrastructure::traits::RealFileSystem;

const FIXTURE: &str = "tests/resources/portal_matrix.json";

fn container(settings: Settings) -> ServiceContainer {
    ServiceContainer::with_deps(settings, Arc::new(RealFileSystem))
}

/// Helper to write a tree file into a temp dir
fn write_tree(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write tree file");
    path
}

#[test]
fn given_portal_file_when_loading_then_store_is_ready() {
    let container = container(Settings::default());

    let store = container.network.load(Path::new(FIXTURE)).unwrap();

    assert!(store.is_loaded());
    assert_eq!(store.node_count().unwrap(), 13);
    assert_eq!(store.max_arity(), 3);
}

#[test]
fn given_missing_file_when_loading_then_operation_failed_maps_to_noinput() {
    let temp = TempDir::new().unwrap();
    let container = container(Settings::default());

    let err = container
        .network
        .load(&temp.path().join("absent.json"))
        .unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    assert_eq!(CliError::from(err).exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_malformed_json_when_loading_then_decode_error() {
    let temp = TempDir::new().unwrap();
    let path = write_tree(&temp, "broken.json", r#"{"id": "root", "children": ["#);
    let container = container(Settings::default());

    let err = container.network.load(&path).unwrap_err();

    match &err {
        ApplicationError::Decode { path: p, .. } => assert_eq!(p, &path),
        other => panic!("expected decode error, got {other:?}"),
    }
    assert_eq!(CliError::from(err).exit_code(), exitcode::DATAERR);
}

#[test]
fn given_binary_arity_setting_when_loading_ternary_tree_then_invalid_tree() {
    let settings = Settings {
        max_arity: 2,
        ..Default::default()
    };
    let container = container(settings);

    let err = container.network.load(Path::new(FIXTURE)).unwrap_err();

    match err {
        ApplicationError::Domain(DomainError::InvalidTree { id, violation }) => {
            assert_eq!(id.as_str(), "root");
            assert_eq!(
                violation,
                TreeViolation::ArityExceeded {
                    children: 3,
                    max: 2
                }
            );
        }
        other => panic!("expected invalid tree, got {other:?}"),
    }
}

#[test]
fn given_no_file_and_no_config_when_resolving_then_config_error() {
    let container = container(Settings::default());

    let err = container.network.resolve_tree_file(None).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_configured_tree_file_when_resolving_then_explicit_path_wins() {
    let settings = Settings {
        tree_file: Some(PathBuf::from("configured.json")),
        ..Default::default()
    };
    let container = container(settings);

    assert_eq!(
        container.network.resolve_tree_file(None).unwrap(),
        PathBuf::from("configured.json")
    );
    assert_eq!(
        container
            .network
            .resolve_tree_file(Some(Path::new("explicit.json")))
            .unwrap(),
        PathBuf::from("explicit.json")
    );
}

#[test]
fn given_member_id_when_viewing_then_navigator_starts_zoomed() {
    let container = container(Settings::default());
    let store = container.network.load(Path::new(FIXTURE)).unwrap();

    let nav = container.network.view(store, Some("c1")).unwrap();

    assert_eq!(nav.current_root_id().as_str(), "c1");
    assert_eq!(nav.breadcrumb().len(), 1);
    assert_eq!(nav.current_view().unwrap().depth, 0);
}

#[test]
fn given_unknown_or_empty_root_when_viewing_then_reports_why() {
    let container = container(Settings::default());
    let store = container.network.load(Path::new(FIXTURE)).unwrap();

    let unknown = container
        .network
        .view(Arc::clone(&store), Some("ghost"))
        .unwrap_err();
    let empty = container.network.view(store, Some("r1")).unwrap_err();

    assert!(matches!(unknown, ApplicationError::MemberNotFound(ref id) if id.as_str() == "ghost"));
    assert!(matches!(empty, ApplicationError::EmptySlot(ref id) if id.as_str() == "r1"));
}

#[test]
fn given_member_when_finding_then_returns_upline_path() {
    let container = container(Settings::default());
    let store = container.network.load(Path::new(FIXTURE)).unwrap();

    let lookup = container.network.find(&store, "l1-c2").unwrap();

    assert_eq!(lookup.member.display_name, "Emma_W");
    assert_eq!(
        lookup.member.describe(),
        "Emma_W | Premium | Level 2 | Active"
    );
    let path: Vec<_> = lookup.path.iter().map(|id| id.as_str()).collect();
    assert_eq!(path, ["root", "l1", "l1-c2"]);
    assert_eq!(lookup.team_size, 0);
}

#[test]
fn given_member_with_empty_slot_when_finding_then_downline_matches_listing() {
    let container = container(Settings::default());
    let store = container.network.load(Path::new(FIXTURE)).unwrap();

    let lookup = container.network.find(&store, "c1").unwrap();
    let listed = container
        .network
        .downline(Arc::clone(&store), Some("David_B"))
        .unwrap();

    assert_eq!(lookup.member.children.len(), 3);
    assert_eq!(lookup.team_size, 2);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].team_size, lookup.team_size);
}

#[test]
fn given_custom_settings_when_reporting_then_uses_ladder_and_target() {
    let settings = Settings {
        required_cpv: 3000,
        cycle: "February 2026".to_string(),
        ranks: vec![RankTier::new("Starter", 0), RankTier::new("Leader", 12)],
        ..Default::default()
    };
    let container = container(settings);
    let store = container.network.load(Path::new(FIXTURE)).unwrap();

    let report = container.network.report(store).unwrap();

    assert_eq!(report.network.team_size, 6);
    assert_eq!(report.network.rank.as_deref(), Some("Starter"));
    assert_eq!(report.network.next_rank.as_deref(), Some("Leader"));
    assert_eq!(report.network.rank_progress, 50);
    assert_eq!(report.cpv.team_cpv, 1500);
    assert_eq!(report.cpv.percentage, 50);
    assert_eq!(report.cpv.cycle, "February 2026");

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["network"]["teamSize"], 6);
    assert_eq!(json["cpv"]["requiredCpv"], 3000);
}
