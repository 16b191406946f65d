//! Resolved templates driving the run-wide random source

use stampede_config::{CliOverrides, ConfigResolver};
use stampede_traffic::TrafficPlan;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

fn resolve_plan(template: &str) -> TrafficPlan {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("c.json");
    std::fs::write(&path, template).unwrap();

    let resolved = ConfigResolver::new()
        .with_template(&path)
        .resolve(&HashMap::<String, String>::new(), &CliOverrides::default())
        .unwrap();
    TrafficPlan::new(Arc::new(resolved.config))
}

fn draws(plan: &TrafficPlan, count: usize) -> Vec<String> {
    let user = plan.user();
    (0..count).map(|_| user.next_endpoint().path.clone()).collect()
}

#[test]
fn test_negative_seed_resolves_and_repeats_draws() {
    let template = r#"{
        "host": "http://h",
        "users": 1,
        "spawn_rate": 1,
        "run_time": "1m",
        "seed": -7,
        "endpoints": [
            {"path": "/a", "weight": 3},
            {"path": "/b", "weight": 1},
            {"path": "/c", "weight": 1}
        ]
    }"#;

    let first = resolve_plan(template);
    let second = resolve_plan(template);
    assert_eq!(first.config().seed, Some(-7));

    let sequence = draws(&first, 300);
    assert_eq!(sequence, draws(&second, 300));
    for path in ["/a", "/b", "/c"] {
        assert!(sequence.iter().any(|p| p == path), "{path} never drawn");
    }
}
