// src/build/initial.rs

use std::path::Path;

use tracing::{info, warn};

use crate::build::recorder::BuildEventBus;
use crate::build::{BuildInvoker, DefaultPhase, RecordedStep};
use crate::errors::Result;

/// Run the configured initial build, publishing each step on `bus`.
///
/// Failures are reported to the bus and the build carries on with the next
/// step. Returns the number of failed steps.
pub async fn initial_build<I: BuildInvoker>(
    steps: &[RecordedStep],
    invoker: &mut I,
    bus: &mut BuildEventBus,
) -> usize {
    if steps.is_empty() {
        return 0;
    }

    info!(steps = steps.len(), "running initial build");
    let mut failed = 0;

    for step in steps {
        bus.step_started(step);
        match invoker.replay(step).await {
            Ok(()) => bus.step_succeeded(step),
            Err(err) => {
                failed += 1;
                bus.step_failed(step, &err);
            }
        }
    }

    if failed > 0 {
        warn!(failed, "initial build finished with failures");
    }
    failed
}

/// Compile once if `output_dir` does not exist yet.
///
/// Returns whether a compile was run.
pub async fn compile_if_needed<I: BuildInvoker>(output_dir: &Path, invoker: &mut I) -> Result<bool> {
    if output_dir.is_dir() {
        return Ok(false);
    }

    info!(output_dir = ?output_dir, "compiled output missing; compiling before first start");
    invoker.invoke_phase(DefaultPhase::Compile).await?;
    Ok(true)
}
