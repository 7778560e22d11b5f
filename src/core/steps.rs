//! Release pipeline
//!
//! The fixed sequence of high-level steps behind `stackforge release`:
//! build, test, package, install-and-smoke-test, publish. Each step is
//! individually skippable; the first failing step aborts the rest.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::config::defaults;
use crate::core::assembly::{LibraryAssembly, PhasePlan};
use crate::core::control::{ControlData, Platform};
use crate::error::StepError;
use crate::infra::process::{run_checked, CommandRunner, CommandSpec};
use crate::infra::smoke::{self, SmokeOutcome};
use crate::infra::fs;

/// One named release step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepId {
    Build,
    Test,
    Package,
    Install,
    Publish,
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Build => "build",
            Self::Test => "test",
            Self::Package => "package",
            Self::Install => "install",
            Self::Publish => "publish",
        };
        f.write_str(name)
    }
}

/// Per-step opt-outs and destinations for one release run
#[derive(Debug, Clone, Default)]
pub struct StepOptions {
    pub skip_build: bool,
    pub skip_tests: bool,
    pub skip_package: bool,
    pub skip_install: bool,
    pub skip_publish: bool,
    /// Where published artifacts are staged; defaults to `<root>/releases`
    pub release_dir: Option<PathBuf>,
}

/// What a release run did and did not do
#[derive(Debug, Default, Serialize)]
pub struct StepReport {
    pub executed: Vec<StepId>,
    pub skipped: Vec<StepId>,
}

/// Installer artifact suffix per platform
pub fn package_suffix(platform: Platform) -> &'static str {
    match platform {
        Platform::Linux => ".tar.gz",
        Platform::Darwin => ".dmg",
        Platform::Windows => ".exe",
    }
}

fn app_build_dir(ctl: &ControlData, assembly: &LibraryAssembly) -> Result<PathBuf, StepError> {
    assembly
        .get(defaults::APP_COMPONENT)
        .map(|app| app.build_dir(ctl))
        .ok_or_else(|| StepError::MissingComponent {
            name: defaults::APP_COMPONENT.to_string(),
        })
}

/// Run ctest plus the application's tag-filtered unit-test runner,
/// writing the XML report under `<root>/test-reports`
pub fn run_tests(
    ctl: &ControlData,
    runner: &dyn CommandRunner,
    assembly: &LibraryAssembly,
    tags: Option<&str>,
) -> Result<(), StepError> {
    let build_dir = app_build_dir(ctl, assembly)?;

    let ctest = CommandSpec::new("ctest")
        .args(["-j".to_string(), ctl.threads.to_string()])
        .current_dir(&build_dir);
    run_checked(runner, &ctest)?;

    let report_dir = ctl.root_dir.join(defaults::TEST_REPORT_DIR);
    if !runner.dry_run() {
        fs::ensure_dir(&report_dir).map_err(|e| StepError::Io {
            path: report_dir.clone(),
            error: e.to_string(),
        })?;
    }
    let unit = CommandSpec::new(
        build_dir
            .join("bin")
            .join(defaults::TEST_RUNNER_NAME)
            .display()
            .to_string(),
    )
    .args([
        "--tag".to_string(),
        tags.unwrap_or(defaults::DEFAULT_TEST_TAGS).to_string(),
        "--reporter".to_string(),
        "xml".to_string(),
        "--out".to_string(),
        report_dir.join("unit.xml").display().to_string(),
    ]);
    run_checked(runner, &unit)?;
    Ok(())
}

/// Run cpack and locate the single expected installer artifact.
///
/// Returns `None` in dry-run mode, where nothing is actually produced.
/// Finding more or fewer than one artifact is a hard error.
pub fn run_package(
    ctl: &ControlData,
    runner: &dyn CommandRunner,
    assembly: &LibraryAssembly,
) -> Result<Option<PathBuf>, StepError> {
    let build_dir = app_build_dir(ctl, assembly)?;
    let cpack = CommandSpec::new("cpack").current_dir(&build_dir);
    run_checked(runner, &cpack)?;

    if runner.dry_run() {
        println!(
            "[dry-run] expecting one {} artifact under {}",
            package_suffix(ctl.platform),
            build_dir.display()
        );
        return Ok(None);
    }
    locate_artifact(ctl, &build_dir).map(Some)
}

fn locate_artifact(ctl: &ControlData, build_dir: &Path) -> Result<PathBuf, StepError> {
    let mut artifacts = fs::find_artifacts(build_dir, package_suffix(ctl.platform));
    if artifacts.len() != 1 {
        return Err(StepError::UnexpectedArtifactCount {
            dir: build_dir.to_path_buf(),
            expected: 1,
            found: artifacts.len(),
        });
    }
    Ok(artifacts.remove(0))
}

/// Unpack the installer into `<root>/install` and smoke-test the
/// installed binary: launch it and require it to still be running at the
/// deadline.
pub async fn run_install(
    ctl: &ControlData,
    runner: &dyn CommandRunner,
    artifact: Option<&Path>,
) -> Result<(), StepError> {
    if ctl.platform != Platform::Linux {
        return Err(StepError::UnsupportedInstallPlatform {
            platform: ctl.platform.to_string(),
        });
    }

    let install_dir = ctl.root_dir.join(defaults::INSTALL_DIRNAME);
    if !runner.dry_run() {
        fs::ensure_dir(&install_dir).map_err(|e| StepError::Io {
            path: install_dir.clone(),
            error: e.to_string(),
        })?;
    }

    let artifact_arg = artifact
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<installer artifact>".to_string());
    let tar = CommandSpec::new("tar").args([
        "xzf".to_string(),
        artifact_arg,
        "-C".to_string(),
        install_dir.display().to_string(),
    ]);
    run_checked(runner, &tar)?;

    let deadline = Duration::from_secs(defaults::SMOKE_TEST_TIMEOUT_SECS);
    let binary = if runner.dry_run() {
        install_dir.join("bin").join(defaults::APP_BINARY)
    } else {
        fs::find_named_file(&install_dir, defaults::APP_BINARY).ok_or(
            StepError::InstalledBinaryNotFound {
                dir: install_dir.clone(),
            },
        )?
    };
    match smoke::launch_and_verify(&binary, deadline, runner.dry_run()).await? {
        SmokeOutcome::Started => {
            tracing::info!(binary = %binary.display(), "smoke test passed");
            Ok(())
        }
        SmokeOutcome::Exited { code } => Err(StepError::SmokeTestFailed { binary, code }),
    }
}

/// Stage the installer artifact under `<release dir>/navapp/<tag or
/// branch>/`. Remote transfer is out of scope; an external transfer tool
/// can be pointed at the staged tree.
pub fn run_publish(
    ctl: &ControlData,
    runner: &dyn CommandRunner,
    artifact: Option<&Path>,
    release_dir: Option<&Path>,
) -> Result<(), StepError> {
    let label = ctl
        .git_tag
        .clone()
        .unwrap_or_else(|| ctl.main_branch.clone());
    let base = release_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| ctl.root_dir.join(defaults::RELEASE_DIRNAME));
    let dest_dir = base.join(defaults::APP_COMPONENT).join(&label);

    if runner.dry_run() {
        let name = artifact
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<installer artifact>".to_string());
        println!("[dry-run] publish {} -> {}", name, dest_dir.display());
        return Ok(());
    }

    let artifact = artifact.ok_or_else(|| StepError::UnexpectedArtifactCount {
        dir: dest_dir.clone(),
        expected: 1,
        found: 0,
    })?;
    fs::ensure_dir(&dest_dir).map_err(|e| StepError::Io {
        path: dest_dir.clone(),
        error: e.to_string(),
    })?;
    let file_name = artifact
        .file_name()
        .ok_or_else(|| StepError::Io {
            path: artifact.to_path_buf(),
            error: "artifact has no file name".to_string(),
        })?;
    let dest = dest_dir.join(file_name);
    std::fs::copy(artifact, &dest).map_err(|e| StepError::Io {
        path: dest.clone(),
        error: e.to_string(),
    })?;
    tracing::info!(dest = %dest.display(), "artifact published");
    Ok(())
}

/// Locate the artifact for steps that run after (or without) packaging.
///
/// A freshly produced artifact passes through unchanged; otherwise the
/// application build tree is searched. Dry runs have no artifact.
pub fn resolve_artifact(
    ctl: &ControlData,
    runner: &dyn CommandRunner,
    assembly: &LibraryAssembly,
    known: Option<PathBuf>,
) -> Result<Option<PathBuf>, StepError> {
    if known.is_some() {
        return Ok(known);
    }
    if runner.dry_run() {
        return Ok(None);
    }
    let build_dir = app_build_dir(ctl, assembly)?;
    locate_artifact(ctl, &build_dir).map(Some)
}

/// Execute the release pipeline over the assembly's current selection
pub async fn run_release(
    ctl: &ControlData,
    runner: &dyn CommandRunner,
    assembly: &LibraryAssembly,
    options: &StepOptions,
) -> Result<StepReport, StepError> {
    let mut report = StepReport::default();

    if options.skip_build {
        report.skipped.push(StepId::Build);
    } else {
        tracing::info!("step: build");
        assembly.process(ctl, runner, &PhasePlan::full())?;
        report.executed.push(StepId::Build);
    }

    if options.skip_tests {
        report.skipped.push(StepId::Test);
    } else {
        tracing::info!("step: test");
        run_tests(ctl, runner, assembly, None)?;
        report.executed.push(StepId::Test);
    }

    let mut artifact = None;
    if options.skip_package {
        report.skipped.push(StepId::Package);
    } else {
        tracing::info!("step: package");
        artifact = run_package(ctl, runner, assembly)?;
        report.executed.push(StepId::Package);
    }

    if options.skip_install {
        report.skipped.push(StepId::Install);
    } else {
        tracing::info!("step: install");
        let target = resolve_artifact(ctl, runner, assembly, artifact.clone())?;
        run_install(ctl, runner, target.as_deref()).await?;
        report.executed.push(StepId::Install);
    }

    if options.skip_publish {
        report.skipped.push(StepId::Publish);
    } else {
        tracing::info!("step: publish");
        let target = resolve_artifact(ctl, runner, assembly, artifact)?;
        run_publish(ctl, runner, target.as_deref(), options.release_dir.as_deref())?;
        report.executed.push(StepId::Publish);
    }

    Ok(report)
}
