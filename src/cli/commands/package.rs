//! CLI implementation for `stackforge package`

use anyhow::Result;

use crate::cli::output::status;
use crate::core::catalog::platform_assembly;
use crate::core::control::ControlData;
use crate::core::steps;
use crate::infra::process::SystemRunner;

/// Execute the package command
pub async fn execute(control: &ControlData) -> Result<()> {
    let assembly = platform_assembly();
    let runner = SystemRunner::new(control.dummy);
    match steps::run_package(control, &runner, &assembly)? {
        Some(artifact) => {
            println!("{} packaged {}", status::SUCCESS, artifact.display());
        }
        None => println!("{} package step planned", status::SUCCESS),
    }
    Ok(())
}
