//! Blocking invocation of the ffmpeg command-line tools

use std::ffi::OsString;
use std::process::{Command, Stdio};

use tracing::debug;

/// Failure of an external tool run
#[derive(Debug)]
pub(crate) enum ToolError {
    /// The binary could not be started
    Spawn(std::io::Error),
    /// The tool exited unsuccessfully
    Failed { status: Option<i32>, stderr: String },
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolError::Spawn(e) => write!(f, "failed to start: {}", e),
            ToolError::Failed { status, stderr } => match status {
                Some(code) => write!(f, "exited with status {}: {}", code, stderr.trim()),
                None => write!(f, "terminated by signal: {}", stderr.trim()),
            },
        }
    }
}

/// Run `program` to completion and return its stdout
pub(crate) fn run_tool(program: &str, args: &[OsString]) -> Result<Vec<u8>, ToolError> {
    debug!(program, ?args, "running external tool");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(ToolError::Spawn)?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(output.stdout)
}

/// Seconds formatted for ffmpeg time options
pub(crate) fn seconds_arg(seconds: f64) -> OsString {
    OsString::from(format!("{:.6}", seconds))
}
