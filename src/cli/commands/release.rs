//! CLI implementation for `stackforge release`
//!
//! Runs the full step pipeline and reports what was executed and what
//! was skipped.

use anyhow::Result;

use crate::cli::output::status;
use crate::core::catalog::platform_assembly;
use crate::core::control::ControlData;
use crate::core::steps::{self, StepOptions};
use crate::infra::process::SystemRunner;

/// Execute the release command
pub async fn execute(control: &ControlData, options: StepOptions, json: bool) -> Result<()> {
    let assembly = platform_assembly();
    let runner = SystemRunner::new(control.dummy);
    let report = steps::run_release(control, &runner, &assembly, &options).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for step in &report.executed {
        println!("{} {step}", status::SUCCESS);
    }
    for step in &report.skipped {
        println!("{} {step} (skipped)", status::INFO);
    }
    Ok(())
}
