use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use stampede_config::{render_resolved, Resolved};
use stampede_traffic::{DispatchOutcome, HttpClient, OutcomeTally, SimulatedUser, TrafficPlan};
use tracing::info;

/// Build the traffic plan for a resolved configuration and print its listing
pub fn prepare_plan<W: Write>(resolved: Resolved, out: &mut W) -> Result<TrafficPlan> {
    write!(out, "{}", render_resolved(&resolved))?;

    let plan = TrafficPlan::new(Arc::new(resolved.config));
    info!(
        "Traffic plan ready: {} endpoints over {} selection slots",
        plan.pool().endpoints().len(),
        plan.pool().len()
    );
    writeln!(
        out,
        "Traffic plan: {} endpoints, {} selection slots",
        plan.pool().endpoints().len(),
        plan.pool().len()
    )?;
    Ok(plan)
}

/// Issue `tasks` sequential requests from one simulated user.
///
/// The user's think time is observed between requests.
pub async fn run_smoke<C, W>(
    user: &SimulatedUser,
    client: &C,
    tasks: u64,
    out: &mut W,
) -> Result<OutcomeTally>
where
    C: HttpClient + ?Sized,
    W: Write,
{
    let mut tally = OutcomeTally::default();
    for task in 0..tasks {
        if task > 0 {
            if let Some(wait) = user.wait_time() {
                tokio::time::sleep(wait).await;
            }
        }
        let outcome = user.run_task(client).await;
        writeln!(out, "  {}", describe(&outcome))?;
        tally.record(&outcome);
    }
    writeln!(out, "Smoke run: {}", tally)?;
    Ok(tally)
}

fn describe(outcome: &DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::Sent {
            method,
            path,
            status,
        } => format!("{} {} -> {}", method, path, status),
        DispatchOutcome::Skipped { method, path } => {
            format!("{} {} skipped (unsupported method)", method, path)
        }
        DispatchOutcome::Failed {
            method,
            path,
            error,
        } => format!("{} {} failed: {}", method, path, error),
    }
}
