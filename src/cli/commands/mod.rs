//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod clean;
pub mod doctor;
pub mod install;
pub mod package;
pub mod publish;
pub mod release;
pub mod show;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::core::control::ControlData;
use crate::core::steps::StepOptions;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run lifecycle phases across the component stack
    Build {
        /// Components to operate on (comma separated; default: all)
        #[arg(short = 'l', long, value_delimiter = ',')]
        libraries: Vec<String>,

        /// Clone missing sources (schedules an update pass too)
        #[arg(long)]
        checkout: bool,

        /// Delete build trees before configuring
        #[arg(long)]
        configure_clean: bool,

        /// Run the build-system generator
        #[arg(long)]
        configure: bool,

        /// Run the native tool's clean target
        #[arg(long)]
        clean: bool,

        /// Run the native build tool
        #[arg(long)]
        build: bool,
    },

    /// Run ctest and the application's unit-test runner
    Test {
        /// Tag filter for the unit-test runner (e.g. "[integration]")
        #[arg(long)]
        tags: Option<String>,
    },

    /// Create the installer package
    Package,

    /// Install the package and smoke-test the application
    Install,

    /// Stage the installer artifact for release
    Publish {
        /// Destination directory [default: <root>/releases]
        #[arg(long)]
        release_dir: Option<PathBuf>,
    },

    /// Run the full release pipeline: build, test, package, install, publish
    Release {
        /// Skip the build step
        #[arg(long)]
        skip_build: bool,

        /// Skip the test step
        #[arg(long)]
        skip_tests: bool,

        /// Skip the package step
        #[arg(long)]
        skip_package: bool,

        /// Skip the install-and-smoke-test step
        #[arg(long)]
        skip_install: bool,

        /// Skip the publish step
        #[arg(long)]
        skip_publish: bool,

        /// Destination directory for published artifacts
        #[arg(long)]
        release_dir: Option<PathBuf>,
    },

    /// Check the external tools stackforge drives
    Doctor,

    /// Show the component registry and the resolved configure order
    Show,

    /// Delete the build trees of the selected components
    Clean {
        /// Components to operate on (comma separated; default: all)
        #[arg(short = 'l', long, value_delimiter = ',')]
        libraries: Vec<String>,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self, control: &ControlData, json: bool) -> Result<()> {
        match self {
            Self::Build {
                libraries,
                checkout,
                configure_clean,
                configure,
                clean,
                build,
            } => {
                let options = build::BuildOptions {
                    libraries,
                    checkout,
                    configure_clean,
                    configure,
                    clean,
                    build,
                };
                build::execute(control, options).await
            }
            Self::Test { tags } => test::execute(control, tags.as_deref()).await,
            Self::Package => package::execute(control).await,
            Self::Install => install::execute(control).await,
            Self::Publish { release_dir } => {
                publish::execute(control, release_dir.as_deref()).await
            }
            Self::Release {
                skip_build,
                skip_tests,
                skip_package,
                skip_install,
                skip_publish,
                release_dir,
            } => {
                let options = StepOptions {
                    skip_build,
                    skip_tests,
                    skip_package,
                    skip_install,
                    skip_publish,
                    release_dir,
                };
                release::execute(control, options, json).await
            }
            Self::Doctor => doctor::execute(control, json).await,
            Self::Show => show::execute(control, json).await,
            Self::Clean { libraries } => clean::execute(control, libraries).await,
        }
    }
}
