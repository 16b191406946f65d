//! `run_load_test` against stand-in engines driven through `sh -c`
#![cfg(unix)]

use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

use stampede_mcp::server::ToolExecutionContext;
use stampede_mcp::{EngineCommand, LoadTestToolRegistry, McpServerConfig, ToolRegistry};

/// Engine that runs `script`; run flags land in `$0`, `$1`, ...
/// so the report path is `$2`.
fn shell_engine(script: &str) -> EngineCommand {
    EngineCommand::new("sh").arg("-c").arg(script)
}

fn registry(dir: &Path, engine: EngineCommand, timeout: Duration) -> LoadTestToolRegistry {
    let config = McpServerConfig::default()
        .with_data_dir(dir.join("data"))
        .with_results_dir("results")
        .with_workdir(dir)
        .with_engine(engine)
        .with_run_timeout(timeout);
    LoadTestToolRegistry::new(&config)
}

fn write_template(dir: &Path) -> String {
    let path = dir.join("config.json");
    std::fs::write(
        &path,
        json!({"host": "http://localhost:1", "users": 1, "spawn_rate": 1, "run_time": "1s"})
            .to_string(),
    )
    .unwrap();
    path.display().to_string()
}

fn call(arguments: serde_json::Value) -> ToolExecutionContext {
    ToolExecutionContext {
        arguments: Some(arguments),
        request_id: Some("test".to_string()),
    }
}

#[tokio::test]
async fn test_successful_run_is_reported_and_recorded() {
    let dir = TempDir::new().unwrap();
    let config_path = write_template(dir.path());
    let script = r#"
        echo "config=$CONFIG_PATH args=$*"
        echo " Aggregated   120   0(0.00%)   12.0 req/s "
        echo "<html></html>" > "$2"
        echo "deprecation warning" >&2
    "#;
    let registry = registry(dir.path(), shell_engine(script), Duration::from_secs(30));

    let result = registry
        .execute_tool(
            "run_load_test",
            call(json!({"config_path": config_path, "users": 3, "run_time": "10s"})),
        )
        .await
        .unwrap();
    let text = result.joined_text();

    assert!(!result.is_error, "{text}");
    assert!(text.starts_with("🚀 Load test completed!\n\n**Test ID:** "));
    assert!(text.contains("**Status:** ✅ SUCCESS"));
    assert!(text.contains("**Summary:** Aggregated   120   0(0.00%)   12.0 req/s\n"));
    assert!(text.contains("📊 **HTML Report:** results/test_"));
    assert!(text.ends_with("**Errors:** deprecation warning\n\n"));

    let ids = registry.results().ids().await;
    assert_eq!(ids.len(), 1);
    let record = registry.results().get(&ids[0]).await.unwrap();
    assert_eq!(record.return_code, Some(0));
    assert!(record.report_written);
    assert!(dir.path().join(&record.report_path).exists());
    assert!(record
        .stdout
        .contains(&format!("config={}", config_path)));
    assert!(record.stdout.contains("--html results/test_"));
    assert!(record.stdout.contains("--users 3 --run-time 10s"));
    assert!(record.command.starts_with("sh -c "));
}

#[tokio::test]
async fn test_failing_engine_reports_errors_status() {
    let dir = TempDir::new().unwrap();
    let config_path = write_template(dir.path());
    let registry = registry(
        dir.path(),
        shell_engine("echo 'boom' >&2; exit 3"),
        Duration::from_secs(30),
    );

    let result = registry
        .execute_tool("run_load_test", call(json!({"config_path": config_path})))
        .await
        .unwrap();
    let text = result.joined_text();

    assert!(text.contains("**Status:** ⚠️ ERRORS"));
    assert!(!text.contains("HTML Report"));
    assert!(text.contains("**Errors:** boom\n"));

    let ids = registry.results().ids().await;
    let record = registry.results().get(&ids[0]).await.unwrap();
    assert_eq!(record.return_code, Some(3));
}

#[tokio::test]
async fn test_engine_is_killed_after_timeout() {
    let dir = TempDir::new().unwrap();
    let config_path = write_template(dir.path());
    let registry = registry(dir.path(), shell_engine("sleep 30"), Duration::from_secs(1));

    let started = std::time::Instant::now();
    let result = registry
        .execute_tool("run_load_test", call(json!({"config_path": config_path})))
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(20));
    assert!(result.is_error);
    assert_eq!(
        result.joined_text(),
        "❌ Load test failed: Load engine timed out after 1 seconds"
    );
    assert!(registry.results().is_empty().await);
}

#[tokio::test]
async fn test_missing_engine_binary() {
    let dir = TempDir::new().unwrap();
    let config_path = write_template(dir.path());
    let registry = registry(
        dir.path(),
        EngineCommand::new("stampede-no-such-engine"),
        Duration::from_secs(5),
    );

    let result = registry
        .execute_tool("run_load_test", call(json!({"config_path": config_path})))
        .await
        .unwrap();

    assert!(result.is_error);
    assert!(result
        .joined_text()
        .starts_with("❌ Load test failed: failed to run `stampede-no-such-engine --headless --html results/test_"));
}

#[tokio::test]
async fn test_missing_config_file_never_starts_the_engine() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("started");
    let script = format!("touch {}", marker.display());
    let registry = registry(dir.path(), shell_engine(&script), Duration::from_secs(5));
    let missing = dir.path().join("nope.json").display().to_string();

    let result = registry
        .execute_tool("run_load_test", call(json!({"config_path": missing})))
        .await
        .unwrap();

    assert_eq!(
        result.joined_text(),
        format!("❌ Configuration file not found: {}", missing)
    );
    assert!(!marker.exists());
}
