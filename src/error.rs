//! Error types for stackforge
//!
//! Domain-specific error types using thiserror. Errors travel up the call
//! chain as `Result`s; only `main` turns them into a process exit code.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::component::Operation;

/// Configuration errors raised while constructing [`crate::core::control::ControlData`]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Build type outside {Debug, Release, RelWithDebInfo, MinSizeRel}
    #[error("Invalid build type '{value}'. Expected one of: Debug, Release, RelWithDebInfo, MinSizeRel")]
    InvalidBuildType { value: String },

    /// Thread count must be at least 1
    #[error("Invalid thread count {value}: must be at least 1")]
    InvalidThreads { value: usize },

    /// Build folder override entry is not a name=folder pair
    #[error("Invalid build folder override '{entry}': expected <component>=<folder>")]
    InvalidOverride { entry: String },

    /// No root directory given and no home directory to derive one from
    #[error("Cannot determine a default root directory; pass --root-dir")]
    NoRootDir,
}

/// Errors from the subprocess execution utility
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Command could not be spawned at all
    #[error("Failed to spawn '{program}': {error}")]
    Spawn { program: String, error: String },

    /// Command ran and returned a non-zero exit code
    #[error("Command '{program}' failed with exit code {code}")]
    Failed { program: String, code: i32 },

    /// Command was terminated by a signal before producing an exit code
    #[error("Command '{program}' terminated without an exit code")]
    Terminated { program: String },
}

/// Errors from version-control operations
#[derive(Error, Debug)]
pub enum GitError {
    /// Neither the requested branch nor the fallback exists on the remote
    #[error("Ref '{reference}' not found in repository at '{path}'")]
    RefNotFound { path: PathBuf, reference: String },

    /// Underlying git invocation failed
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Errors raised by a single component lifecycle operation
#[derive(Error, Debug)]
pub enum ComponentError {
    /// Version-control error
    #[error(transparent)]
    Git(#[from] GitError),

    /// External command error
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Filesystem error
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },

    /// A declared dependency is not registered in the assembly
    #[error("Component '{component}' depends on '{dependency}', which is not registered")]
    MissingSibling {
        component: String,
        dependency: String,
    },
}

/// Errors from the assembly's selection and sequencing
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// Declared dependencies form a cycle
    #[error("Circular dependency among components: {}", cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    /// A lifecycle operation failed for one component
    #[error("{operation} failed for component '{component}': {source}")]
    Operation {
        component: String,
        operation: Operation,
        #[source]
        source: ComponentError,
    },
}

/// Errors from the high-level release steps
#[derive(Error, Debug)]
pub enum StepError {
    /// Build step failed
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// External tool failed
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// A step needs a component the assembly does not register
    #[error("Component '{name}' is not registered in the assembly")]
    MissingComponent { name: String },

    /// Packaging produced an unexpected number of installer artifacts
    #[error("Expected {expected} installer artifact(s) in '{dir}', found {found}")]
    UnexpectedArtifactCount {
        dir: PathBuf,
        expected: usize,
        found: usize,
    },

    /// Installed application binary could not be located
    #[error("Installed application binary not found under '{dir}'")]
    InstalledBinaryNotFound { dir: PathBuf },

    /// Installed application exited before the smoke-test deadline
    #[error("Smoke test failed: '{binary}' exited with code {code}")]
    SmokeTestFailed { binary: PathBuf, code: i32 },

    /// Install step has no generic implementation for this platform
    #[error("Install step is not supported on {platform}; run the platform installer manually")]
    UnsupportedInstallPlatform { platform: String },

    /// Filesystem error
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// Top-level stackforge error type
#[derive(Error, Debug)]
pub enum StackforgeError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Assembly error
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// Release step error
    #[error(transparent)]
    Step(#[from] StepError),

    /// Process error
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Git error
    #[error(transparent)]
    Git(#[from] GitError),
}
