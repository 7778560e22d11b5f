//! CLI implementation for `stackforge install`

use anyhow::Result;

use crate::cli::output::status;
use crate::core::catalog::platform_assembly;
use crate::core::control::ControlData;
use crate::core::steps;
use crate::infra::process::SystemRunner;

/// Execute the install command: unpack the packaged artifact and
/// smoke-test the installed application
pub async fn execute(control: &ControlData) -> Result<()> {
    let assembly = platform_assembly();
    let runner = SystemRunner::new(control.dummy);
    let artifact = steps::resolve_artifact(control, &runner, &assembly, None)?;
    steps::run_install(control, &runner, artifact.as_deref()).await?;
    println!("{} installed and smoke-tested", status::SUCCESS);
    Ok(())
}
