//! Subprocess execution
//!
//! Every external tool (git, cmake, make, ninja, ctest, cpack) is invoked
//! through the single [`CommandRunner`] utility with a structured argument
//! list. No shell strings are assembled anywhere in the crate.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::ProcessError;

/// A fully-assembled external command: program, arguments, working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path
    pub program: String,
    /// Argument list, passed verbatim (no shell interpretation)
    pub args: Vec<String>,
    /// Working directory, if different from the orchestrator's
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    /// Create a spec for the given program
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Render the command as a single log line, quoting arguments with spaces
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.contains(' ') {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code (0 on success)
    pub code: i32,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the command exited with code 0
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Execution seam for external commands.
///
/// Production code uses [`SystemRunner`]; tests substitute a recording
/// implementation so the orchestration core runs without spawning anything.
pub trait CommandRunner {
    /// Run the command with inherited stdio and return its exit code.
    ///
    /// A non-zero exit code is NOT an error at this level; callers decide
    /// via [`run_checked`] whether a failure is fatal.
    fn run(&self, spec: &CommandSpec) -> Result<i32, ProcessError>;

    /// Run the command capturing stdout/stderr (used for probes and
    /// version queries).
    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError>;

    /// Whether this runner only logs commands instead of executing them
    fn dry_run(&self) -> bool {
        false
    }
}

/// Blocking runner over `std::process`, with an optional dry-run mode in
/// which command lines are printed but nothing executes.
#[derive(Debug, Default)]
pub struct SystemRunner {
    dummy: bool,
}

impl SystemRunner {
    /// Create a runner; `dummy` enables dry-run mode
    pub fn new(dummy: bool) -> Self {
        Self { dummy }
    }

    fn print_dry_run(spec: &CommandSpec) {
        match &spec.cwd {
            Some(cwd) => println!("[dry-run] {}  (in {})", spec.display_line(), cwd.display()),
            None => println!("[dry-run] {}", spec.display_line()),
        }
    }

    fn command(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<i32, ProcessError> {
        if self.dummy {
            Self::print_dry_run(spec);
            return Ok(0);
        }
        tracing::info!(command = %spec.display_line(), "running");
        let status = Self::command(spec)
            .status()
            .map_err(|e| ProcessError::Spawn {
                program: spec.program.clone(),
                error: e.to_string(),
            })?;
        status.code().ok_or(ProcessError::Terminated {
            program: spec.program.clone(),
        })
    }

    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        if self.dummy {
            Self::print_dry_run(spec);
            return Ok(CommandOutput::default());
        }
        tracing::debug!(command = %spec.display_line(), "capturing");
        let output = Self::command(spec)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ProcessError::Spawn {
                program: spec.program.clone(),
                error: e.to_string(),
            })?;
        Ok(CommandOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn dry_run(&self) -> bool {
        self.dummy
    }
}

/// Run a command and treat any non-zero exit code as fatal
pub fn run_checked(runner: &dyn CommandRunner, spec: &CommandSpec) -> Result<(), ProcessError> {
    let code = runner.run(spec)?;
    if code == 0 {
        Ok(())
    } else {
        Err(ProcessError::Failed {
            program: spec.program.clone(),
            code,
        })
    }
}

/// Speculative query: returns trimmed stdout on success, `None` on any
/// failure. Used only for idempotency checks ("is this repo already at
/// the target tag"), never for mutating commands.
pub fn probe(runner: &dyn CommandRunner, spec: &CommandSpec) -> Option<String> {
    match runner.capture(spec) {
        Ok(output) if output.success() => Some(output.stdout.trim().to_string()),
        _ => None,
    }
}
