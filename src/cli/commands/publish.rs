//! CLI implementation for `stackforge publish`

use std::path::Path;

use anyhow::Result;

use crate::cli::output::status;
use crate::core::catalog::platform_assembly;
use crate::core::control::ControlData;
use crate::core::steps;
use crate::infra::process::SystemRunner;

/// Execute the publish command
pub async fn execute(control: &ControlData, release_dir: Option<&Path>) -> Result<()> {
    let assembly = platform_assembly();
    let runner = SystemRunner::new(control.dummy);
    let artifact = steps::resolve_artifact(control, &runner, &assembly, None)?;
    steps::run_publish(control, &runner, artifact.as_deref(), release_dir)?;
    println!("{} artifact staged for release", status::SUCCESS);
    Ok(())
}
