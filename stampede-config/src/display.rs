//! Diagnostic listing of a resolved configuration

use crate::loader::Resolved;
use serde_json::Value;
use std::fmt::Write;

const HEADER: &str = "=== Resolved Configuration ===";
const FOOTER: &str = "===============================";
const REDACTED: &str = "[REDACTED]";

/// Keys listed first, in this order; pass-through keys follow alphabetically
const LISTING_ORDER: [&str; 8] = [
    "host",
    "users",
    "spawn_rate",
    "run_time",
    "endpoints",
    "think_time_seconds",
    "seed",
    "report_html",
];

/// Render every resolved key with its source.
///
/// A non-null `seed` is replaced by `[REDACTED]`; its source is still shown
/// so the listing confirms a seed was supplied.
pub fn render_resolved(resolved: &Resolved) -> String {
    let config = &resolved.config;
    let mut out = String::new();
    let _ = writeln!(out, "{HEADER}");

    for key in LISTING_ORDER {
        let Some(source) = resolved.provenance.get(key) else {
            continue;
        };
        let value = match key {
            "host" => config.host.clone(),
            "users" => config.users.to_string(),
            "spawn_rate" => config.spawn_rate.to_string(),
            "run_time" => config.run_time.clone(),
            "endpoints" => compact(&serde_json::to_value(&config.endpoints).unwrap_or(Value::Null)),
            "think_time_seconds" => config
                .think_time_seconds
                .map(|secs| secs.to_string())
                .unwrap_or_else(|| "null".to_string()),
            "seed" => match config.seed {
                Some(_) => REDACTED.to_string(),
                None => "null".to_string(),
            },
            "report_html" => config.report_html.clone(),
            _ => continue,
        };
        let _ = writeln!(out, "{key}: {value} (from {source})");
    }

    for (key, value) in &config.extra {
        let source = resolved
            .provenance
            .get(key)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let _ = writeln!(out, "{key}: {} (from {source})", compact(value));
    }

    let _ = writeln!(out, "{FOOTER}");
    out
}

/// Print [`render_resolved`] to stdout
pub fn print_resolved_config(resolved: &Resolved) {
    print!("{}", render_resolved(resolved));
}

fn compact(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
