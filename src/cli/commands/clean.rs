//! CLI implementation for `stackforge clean`
//!
//! Deletes the build trees of the selected components.

use anyhow::Result;

use crate::cli::output::status;
use crate::core::assembly::PhasePlan;
use crate::core::catalog::platform_assembly;
use crate::core::control::ControlData;
use crate::infra::process::SystemRunner;

/// Execute the clean command
pub async fn execute(control: &ControlData, libraries: Vec<String>) -> Result<()> {
    let mut assembly = platform_assembly();
    if !libraries.is_empty() {
        assembly.select_libraries(&libraries);
    }

    let runner = SystemRunner::new(control.dummy);
    let plan = PhasePlan {
        configure_clean: true,
        ..PhasePlan::default()
    };
    assembly.process(control, &runner, &plan)?;

    println!(
        "{} removed build trees of {} component(s)",
        status::SUCCESS,
        assembly.selection().len()
    );
    Ok(())
}
