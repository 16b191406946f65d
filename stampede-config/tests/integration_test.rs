//! Integration tests for stampede-config

use stampede_config::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use temp_env::with_vars;

const FULL_TEMPLATE: &str = r#"{
    "host": "https://template.test",
    "users": 20,
    "spawn_rate": 4.0,
    "run_time": "2m",
    "seed": 42,
    "think_time_seconds": 0.5,
    "report_html": "out/report.html",
    "endpoints": [
        {"path": "/a", "weight": 2},
        {"path": "/b", "method": "POST", "payload": {"x": 1}}
    ]
}"#;

fn write_template(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn no_env() -> HashMap<String, String> {
    HashMap::new()
}

#[test]
fn test_template_values_pass_through_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = write_template(dir.path(), "config.json", FULL_TEMPLATE);

    let resolved = ConfigResolver::new()
        .with_template(&path)
        .resolve(&no_env(), &CliOverrides::default())
        .unwrap();

    let config = &resolved.config;
    assert_eq!(config.host, "https://template.test");
    assert_eq!(config.users, 20);
    assert_eq!(config.spawn_rate, 4.0);
    assert_eq!(config.run_time, "2m");
    assert_eq!(config.seed, Some(42));
    assert_eq!(config.think_time_seconds, Some(0.5));
    assert_eq!(config.report_html, "out/report.html");
    assert_eq!(config.endpoints.len(), 2);
    assert_eq!(config.endpoints[0].weight, 2);
    assert_eq!(config.endpoints[1].method, "POST");

    let expected = Source::Template(path.clone());
    for key in [
        "host",
        "users",
        "spawn_rate",
        "run_time",
        "seed",
        "think_time_seconds",
        "report_html",
        "endpoints",
    ] {
        assert_eq!(resolved.provenance.get(key), Some(&expected), "key {key}");
    }
}

#[test]
fn test_defaults_fill_absent_optional_keys() {
    let dir = TempDir::new().unwrap();
    let path = write_template(
        dir.path(),
        "config.json",
        r#"{"host": "http://h", "users": 1, "spawn_rate": 1, "run_time": "10s"}"#,
    );

    let resolved = ConfigResolver::new()
        .with_template(&path)
        .resolve(&no_env(), &CliOverrides::default())
        .unwrap();

    assert_eq!(resolved.config.endpoints, vec![EndpointSpec::root()]);
    assert_eq!(resolved.config.think_time_seconds, None);
    assert_eq!(resolved.config.report_html, DEFAULT_REPORT_HTML);
    assert_eq!(resolved.config.seed, None);
    assert_eq!(resolved.provenance.get("endpoints"), Some(&Source::Default));
    assert_eq!(resolved.provenance.get("think_time_seconds"), Some(&Source::Default));
    assert_eq!(resolved.provenance.get("report_html"), Some(&Source::Default));
    assert!(resolved.provenance.get("seed").is_none());
}

#[test]
fn test_env_beats_template_for_every_overridable_key() {
    let dir = TempDir::new().unwrap();
    let path = write_template(dir.path(), "config.json", FULL_TEMPLATE);

    let env = [
        ("USERS", "7"),
        ("SPAWN_RATE", "0.5"),
        ("RUN_TIME", "30s"),
        ("HOST", "https://env.test"),
        ("REPORT_HTML", "env/report.html"),
    ];

    let resolved = ConfigResolver::new()
        .with_template(&path)
        .resolve(&env, &CliOverrides::default())
        .unwrap();

    assert_eq!(resolved.config.users, 7);
    assert_eq!(resolved.config.spawn_rate, 0.5);
    assert_eq!(resolved.config.run_time, "30s");
    assert_eq!(resolved.config.host, "https://env.test");
    assert_eq!(resolved.config.report_html, "env/report.html");

    assert_eq!(resolved.provenance.get("users"), Some(&Source::Env("USERS".into())));
    assert_eq!(resolved.provenance.get("host"), Some(&Source::Env("HOST".into())));
    // Untouched keys keep their template source
    assert_eq!(resolved.provenance.get("seed"), Some(&Source::Template(path)));
}

#[test]
fn test_env_can_supply_missing_required_keys() {
    let dir = TempDir::new().unwrap();
    let path = write_template(dir.path(), "config.json", r#"{"host": "http://h"}"#);

    let env = [("USERS", "3"), ("SPAWN_RATE", "1"), ("RUN_TIME", "1m")];
    let resolved = ConfigResolver::new()
        .with_template(&path)
        .resolve(&env, &CliOverrides::default())
        .unwrap();

    assert_eq!(resolved.config.users, 3);
    assert_eq!(resolved.config.spawn_rate, 1.0);
}

#[test]
fn test_cli_beats_env() {
    let dir = TempDir::new().unwrap();
    let path = write_template(dir.path(), "config.json", FULL_TEMPLATE);

    let env = [("USERS", "7"), ("HOST", "https://env.test")];
    let cli = CliOverrides {
        users: Some(99),
        host: Some("https://cli.test".to_string()),
        ..Default::default()
    };

    let resolved = ConfigResolver::new()
        .with_template(&path)
        .resolve(&env, &cli)
        .unwrap();

    assert_eq!(resolved.config.users, 99);
    assert_eq!(resolved.config.host, "https://cli.test");
    assert_eq!(resolved.provenance.get("users"), Some(&Source::Cli("--users".into())));
}

#[test]
fn test_missing_keys_names_exact_subset() {
    let dir = TempDir::new().unwrap();
    let path = write_template(
        dir.path(),
        "config.json",
        r#"{"host": "http://h", "users": 5}"#,
    );

    let err = ConfigResolver::new()
        .with_template(&path)
        .resolve(&no_env(), &CliOverrides::default())
        .unwrap_err();

    assert_eq!(
        err.missing_keys().unwrap(),
        &["run_time".to_string(), "spawn_rate".to_string()]
    );
    assert!(err.to_string().contains("run_time, spawn_rate"));
}

#[test]
fn test_invalid_override_reports_key_and_value() {
    let dir = TempDir::new().unwrap();
    let path = write_template(dir.path(), "config.json", FULL_TEMPLATE);

    let err = ConfigResolver::new()
        .with_template(&path)
        .resolve(&[("USERS", "lots")], &CliOverrides::default())
        .unwrap_err();

    match err {
        ConfigError::InvalidOverride { key, value } => {
            assert_eq!(key, "USERS");
            assert_eq!(value, "lots");
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = ConfigResolver::new()
        .with_template(&path)
        .resolve(&[("SPAWN_RATE", "fast")], &CliOverrides::default())
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidOverride { .. }));
}

#[test]
fn test_malformed_template_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_template(dir.path(), "config.json", "{ not json");

    let err = ConfigResolver::new()
        .with_template(&path)
        .resolve(&no_env(), &CliOverrides::default())
        .unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));

    let path = write_template(dir.path(), "list.json", "[1, 2]");
    let err = ConfigResolver::new()
        .with_template(&path)
        .resolve(&no_env(), &CliOverrides::default())
        .unwrap_err();
    assert!(err.to_string().contains("top-level object"));
}

#[test]
fn test_wrongly_typed_template_value_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_template(
        dir.path(),
        "config.json",
        r#"{"host": "http://h", "users": "many", "spawn_rate": 1, "run_time": "1m"}"#,
    );

    let err = ConfigResolver::new()
        .with_template(&path)
        .resolve(&no_env(), &CliOverrides::default())
        .unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_unreadable_template_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::create_dir_all(&path).unwrap();

    let err = ConfigResolver::new()
        .with_template(&path)
        .resolve(&no_env(), &CliOverrides::default())
        .unwrap_err();
    assert!(matches!(&err, ConfigError::Io { path: p, .. } if *p == path));
    assert!(err.to_string().starts_with("Failed to read config file"));
}

#[test]
fn test_negative_seed_is_accepted() {
    let dir = TempDir::new().unwrap();
    let path = write_template(
        dir.path(),
        "c.json",
        r#"{"host": "http://h", "users": 1, "spawn_rate": 1, "run_time": "1m", "seed": -7}"#,
    );

    let resolved = ConfigResolver::new()
        .with_template(&path)
        .resolve(&no_env(), &CliOverrides::default())
        .unwrap();
    assert_eq!(resolved.config.seed, Some(-7));
}

#[test]
fn test_non_positive_weight_fails_resolution() {
    let dir = TempDir::new().unwrap();
    let path = write_template(
        dir.path(),
        "config.json",
        r#"{"host": "http://h", "users": 1, "spawn_rate": 1, "run_time": "1m",
            "endpoints": [{"path": "/ok"}, {"path": "/zero", "weight": 0}]}"#,
    );

    let err = ConfigResolver::new()
        .with_template(&path)
        .resolve(&no_env(), &CliOverrides::default())
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEndpoint { index: 1, .. }));
}

#[test]
fn test_explicit_missing_path_is_not_found() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.json");

    let err = ConfigResolver::new()
        .with_template(&missing)
        .resolve(&no_env(), &CliOverrides::default())
        .unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { path } if path == missing));
}

#[test]
fn test_config_path_env_selects_template() {
    let dir = TempDir::new().unwrap();
    let path = write_template(dir.path(), "custom.json", FULL_TEMPLATE);
    let path_str = path.to_string_lossy().to_string();

    let resolved = ConfigResolver::new()
        .with_base_dir(dir.path())
        .resolve(&[("CONFIG_PATH", path_str.as_str())], &CliOverrides::default())
        .unwrap();
    assert_eq!(resolved.template_path, path);
}

#[test]
fn test_discovery_prefers_candidates_then_bundled() {
    let dir = TempDir::new().unwrap();
    let resolver = ConfigResolver::new().with_base_dir(dir.path());

    // Nothing exists: the bundled example path is reported
    let err = resolver.locate_template(&no_env()).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { path } if path.ends_with(BUNDLED_TEMPLATE)));

    let bundled = write_template(dir.path(), BUNDLED_TEMPLATE, FULL_TEMPLATE);
    assert_eq!(resolver.locate_template(&no_env()).unwrap(), bundled);

    let json = write_template(dir.path(), "data/config.json", FULL_TEMPLATE);
    assert_eq!(resolver.locate_template(&no_env()).unwrap(), json);

    let yaml = write_template(dir.path(), "data/config.yaml", "host: http://yaml\n");
    assert_eq!(resolver.locate_template(&no_env()).unwrap(), yaml);
}

#[test]
fn test_yaml_template() {
    let dir = TempDir::new().unwrap();
    let path = write_template(
        dir.path(),
        "config.yaml",
        r#"
host: "http://yaml.test"
users: 3
spawn_rate: 1.5
run_time: 45s
endpoints:
  - path: /orders
    method: put
    weight: 4
    headers:
      X-Trace: "1"
"#,
    );

    let resolved = ConfigResolver::new()
        .with_template(&path)
        .resolve(&no_env(), &CliOverrides::default())
        .unwrap();

    assert_eq!(resolved.config.host, "http://yaml.test");
    assert_eq!(resolved.config.spawn_rate, 1.5);
    let endpoint = &resolved.config.endpoints[0];
    assert_eq!(endpoint.http_method(), Some(HttpMethod::Put));
    assert_eq!(endpoint.weight, 4);
    assert_eq!(endpoint.headers.get("X-Trace").map(String::as_str), Some("1"));
}

#[test]
fn test_printed_listing_redacts_seed() {
    let dir = TempDir::new().unwrap();
    let path = write_template(dir.path(), "config.json", FULL_TEMPLATE);

    let resolved = ConfigResolver::new()
        .with_template(&path)
        .resolve(&[("USERS", "8")], &CliOverrides::default())
        .unwrap();
    let listing = render_resolved(&resolved);

    assert!(listing.starts_with("=== Resolved Configuration ==="));
    assert!(listing.contains(&format!("seed: [REDACTED] (from template:{})", path.display())));
    assert!(!listing.contains("seed: 42"));
    assert!(listing.contains("users: 8 (from env:USERS)"));
    assert!(listing.contains("host: https://template.test"));
}

#[test]
fn test_unknown_keys_listed_with_template_source() {
    let dir = TempDir::new().unwrap();
    let path = write_template(
        dir.path(),
        "config.json",
        r#"{"host": "http://h", "users": 1, "spawn_rate": 1, "run_time": "1m", "owner": "qa"}"#,
    );

    let resolved = ConfigResolver::new()
        .with_template(&path)
        .resolve(&no_env(), &CliOverrides::default())
        .unwrap();
    let listing = render_resolved(&resolved);
    assert!(listing.contains("owner: qa (from template:"));
}

#[test]
fn test_process_env_overrides() {
    let dir = TempDir::new().unwrap();
    let path = write_template(dir.path(), "config.json", FULL_TEMPLATE);
    let path_str = path.to_string_lossy().to_string();

    let vars = vec![
        ("CONFIG_PATH", Some(path_str.as_str())),
        ("USERS", Some("11")),
        ("SPAWN_RATE", None),
        ("RUN_TIME", Some("90s")),
        ("HOST", None),
        ("REPORT_HTML", None),
    ];

    with_vars(vars, || {
        let resolved = ConfigResolver::new()
            .resolve_from_process(&CliOverrides::default())
            .unwrap();

        assert_eq!(resolved.template_path, path);
        assert_eq!(resolved.config.users, 11);
        assert_eq!(resolved.config.run_time, "90s");
        assert_eq!(resolved.config.host, "https://template.test");
    });
}
