//! CLI implementation for `stackforge doctor`

use anyhow::Result;

use crate::cli::output::{create_spinner, status};
use crate::core::control::ControlData;
use crate::core::doctor::run_doctor;

/// Execute the doctor command. Reports tool problems without failing the
/// process; the run itself is diagnostic.
pub async fn execute(control: &ControlData, json: bool) -> Result<()> {
    let spinner = create_spinner("Checking external tools...");
    let report = run_doctor(control);
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for check in &report.checks {
        if check.passed {
            let version = check.version.as_deref().unwrap_or("unknown version");
            println!("{} {} ({version})", status::SUCCESS, check.name);
        } else {
            let glyph = if check.required {
                status::ERROR
            } else {
                status::WARNING
            };
            let error = check.error.as_deref().unwrap_or("check failed");
            println!("{glyph} {}: {error}", check.name);
            if let Some(suggestion) = &check.suggestion {
                println!("  {} {suggestion}", status::INFO);
            }
        }
    }
    println!(
        "{} checks passed, {} failed",
        report.passed_count(),
        report.failed_count()
    );
    Ok(())
}
