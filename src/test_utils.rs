//! Shared unit-test doubles
//!
//! A recording command runner lets the orchestration core run end to end
//! in tests without spawning a single external process.

use std::sync::Mutex;

use crate::error::ProcessError;
use crate::infra::process::{CommandOutput, CommandRunner, CommandSpec};

/// Command runner that records every spec it receives and answers from a
/// table of scripted responses (matched by substring of the rendered
/// command line; first match wins, default is success with empty output).
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<CommandSpec>>,
    rules: Mutex<Vec<(String, CommandOutput)>>,
}

impl RecordingRunner {
    /// Create a runner with no scripted responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a full response for command lines containing `needle`
    pub fn respond(&self, needle: &str, output: CommandOutput) {
        self.rules
            .lock()
            .unwrap()
            .push((needle.to_string(), output));
    }

    /// Script an exit code for command lines containing `needle`
    pub fn respond_code(&self, needle: &str, code: i32) {
        self.respond(
            needle,
            CommandOutput {
                code,
                ..CommandOutput::default()
            },
        );
    }

    /// Script successful stdout for command lines containing `needle`
    pub fn respond_stdout(&self, needle: &str, stdout: &str) {
        self.respond(
            needle,
            CommandOutput {
                code: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
    }

    /// Every spec received so far
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Every received spec rendered as a command line
    pub fn lines(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(CommandSpec::display_line)
            .collect()
    }

    fn lookup(&self, line: &str) -> CommandOutput {
        self.rules
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| line.contains(needle))
            .map(|(_, output)| output.clone())
            .unwrap_or_default()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> Result<i32, ProcessError> {
        let line = spec.display_line();
        self.calls.lock().unwrap().push(spec.clone());
        Ok(self.lookup(&line).code)
    }

    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        let line = spec.display_line();
        self.calls.lock().unwrap().push(spec.clone());
        Ok(self.lookup(&line))
    }
}
