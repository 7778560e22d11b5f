//! CLI implementation for `stackforge build`
//!
//! Maps phase flags onto one assembly `process` run. With no phase flag
//! given, the full checkout-configure-build pipeline runs.

use anyhow::Result;

use crate::cli::output::status;
use crate::core::assembly::PhasePlan;
use crate::core::catalog::platform_assembly;
use crate::core::control::ControlData;
use crate::infra::process::SystemRunner;

/// Phase and selection flags for one build invocation
#[derive(Debug, Default)]
pub struct BuildOptions {
    pub libraries: Vec<String>,
    pub checkout: bool,
    pub configure_clean: bool,
    pub configure: bool,
    pub clean: bool,
    pub build: bool,
}

impl BuildOptions {
    /// Translate the flags into a phase plan; no flags means the full
    /// pipeline
    pub fn plan(&self) -> PhasePlan {
        let explicit = PhasePlan {
            checkout: self.checkout,
            configure_clean: self.configure_clean,
            configure: self.configure,
            clean: self.clean,
            build: self.build,
        };
        if explicit == PhasePlan::default() {
            PhasePlan::full()
        } else {
            explicit
        }
    }
}

/// Execute the build command
pub async fn execute(control: &ControlData, options: BuildOptions) -> Result<()> {
    let mut assembly = platform_assembly();
    if !options.libraries.is_empty() {
        assembly.select_libraries(&options.libraries);
    }

    let plan = options.plan();
    let phases: Vec<String> = plan.phases().iter().map(ToString::to_string).collect();
    println!(
        "{} processing {} component(s): {}",
        status::INFO,
        assembly.selection().len(),
        phases.join(", ")
    );

    let runner = SystemRunner::new(control.dummy);
    assembly.process(control, &runner, &plan)?;

    println!("{} done", status::SUCCESS);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_expands_to_full_pipeline() {
        let options = BuildOptions::default();
        assert_eq!(options.plan(), PhasePlan::full());
    }

    #[test]
    fn test_explicit_flags_are_passed_through() {
        let options = BuildOptions {
            configure: true,
            ..BuildOptions::default()
        };
        let plan = options.plan();
        assert!(plan.configure);
        assert!(!plan.checkout);
        assert!(!plan.build);
    }
}
