//! Command-line interface module
//!
//! Argument parsing and output formatting only; the orchestration model
//! lives in [`crate::core`].

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser};

use crate::config::defaults;
use crate::core::control::{ControlData, ControlOptions};
use crate::error::ConfigError;

use commands::Commands;

/// Stackforge - superbuild orchestrator for the navapp platform
///
/// Checks out, configures, builds, packages, and releases the navapp
/// application together with its external library stack.
#[derive(Parser, Debug)]
#[command(name = "stackforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Run configuration flags, shared by every subcommand
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Base directory for all checkouts and builds [default: ~/dev]
    #[arg(long, global = true)]
    pub root_dir: Option<PathBuf>,

    /// Build type for the application component
    #[arg(short = 't', long, global = true, default_value = "Release")]
    pub build_type: String,

    /// Parallelism passed to the native build tool [default: all cores]
    #[arg(short = 'j', long, global = true)]
    pub threads: Option<usize>,

    /// Release tag to check out; takes precedence over --main-branch
    #[arg(short = 'g', long, global = true)]
    pub git_tag: Option<String>,

    /// Branch checked out when no tag is given
    #[arg(long, global = true, default_value = defaults::DEFAULT_MAIN_BRANCH)]
    pub main_branch: String,

    /// Build external libraries with the requested build type instead of Release
    #[arg(long, global = true)]
    pub debug_externals: bool,

    /// 32-bit build
    #[arg(long, global = true)]
    pub b32: bool,

    /// Link statically
    #[arg(long = "static", global = true)]
    pub static_link: bool,

    /// Use the Xcode generator (Darwin only)
    #[arg(long, global = true)]
    pub xcode: bool,

    /// Use jom instead of nmake (Windows only)
    #[arg(long, global = true)]
    pub jom: bool,

    /// Use the Ninja generator
    #[arg(long, global = true)]
    pub ninja: bool,

    /// Dry run: print the command lines without executing anything
    #[arg(long, global = true)]
    pub dummy: bool,

    /// Comma-separated component=folder build-folder overrides
    #[arg(long, global = true)]
    pub build_folders: Option<String>,
}

impl ConfigArgs {
    /// Validate the flags into the run configuration
    pub fn to_control(&self) -> Result<ControlData, ConfigError> {
        ControlData::from_options(ControlOptions {
            root_dir: self.root_dir.clone(),
            build_type: self.build_type.clone(),
            debug_externals: self.debug_externals,
            threads: self.threads,
            git_tag: self.git_tag.clone(),
            main_branch: self.main_branch.clone(),
            static_link: self.static_link,
            b32: self.b32,
            xcode: self.xcode,
            jom: self.jom,
            ninja: self.ninja,
            dummy: self.dummy,
            build_folder_overrides: self.build_folders.clone(),
        })
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        if let Some(cmd) = self.command {
            let control = self.config.to_control()?;
            cmd.run(&control, self.json).await
        } else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
