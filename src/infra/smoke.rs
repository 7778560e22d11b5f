//! Installed-application smoke test
//!
//! Launches the freshly installed binary and races a fixed deadline
//! against process exit. Surviving to the deadline means the application
//! starts; exiting early means the install is broken.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use crate::error::ProcessError;

/// Result of the launch race
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmokeOutcome {
    /// Still running at the deadline; the launch is considered good
    Started,
    /// Exited before the deadline with this code
    Exited { code: i32 },
}

/// Launch `binary` and wait up to `deadline` for it to exit.
///
/// In dry-run mode the launch is logged and reported as started.
pub async fn launch_and_verify(
    binary: &Path,
    deadline: Duration,
    dummy: bool,
) -> Result<SmokeOutcome, ProcessError> {
    if dummy {
        println!("[dry-run] {} (smoke test, {}s)", binary.display(), deadline.as_secs());
        return Ok(SmokeOutcome::Started);
    }

    let mut child = tokio::process::Command::new(binary)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ProcessError::Spawn {
            program: binary.display().to_string(),
            error: e.to_string(),
        })?;

    match tokio::time::timeout(deadline, child.wait()).await {
        Ok(Ok(status)) => Ok(SmokeOutcome::Exited {
            code: status.code().unwrap_or(-1),
        }),
        Ok(Err(_)) => Err(ProcessError::Terminated {
            program: binary.display().to_string(),
        }),
        Err(_elapsed) => {
            let _ = child.kill().await;
            Ok(SmokeOutcome::Started)
        }
    }
}
