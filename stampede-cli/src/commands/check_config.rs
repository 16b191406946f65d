use std::io::Write;
use std::process::ExitCode;

use anyhow::Result;
use stampede_config::{render_resolved, CliOverrides, ConfigResolver, EnvSource};
use tracing::debug;

/// Resolve, print the redacted listing and report validity.
///
/// Resolution failures are reported on `out` and turned into a failing exit
/// code; only write errors are returned.
pub fn check_config<E, W>(
    resolver: &ConfigResolver,
    env: &E,
    overrides: &CliOverrides,
    out: &mut W,
) -> Result<ExitCode>
where
    E: EnvSource + ?Sized,
    W: Write,
{
    match resolver.resolve(env, overrides) {
        Ok(resolved) => {
            debug!("Template {}", resolved.template_path.display());
            write!(out, "{}", render_resolved(&resolved))?;
            writeln!(out, "✓ Configuration is valid")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            writeln!(out, "✗ Configuration error: {}", e)?;
            Ok(ExitCode::FAILURE)
        }
    }
}
