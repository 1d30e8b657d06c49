use crate::utils::ToolError;
use std::{
    ffi::OsStr,
    path::Path,
    process::{Command, ExitStatus, Stdio},
};

/// Lines of captured tool output kept in a failure report.
const DIAGNOSTIC_TAIL_LINES: usize = 20;

/// Runs `program` to completion and fails on a non-zero exit status.
///
/// Stdin is closed so TeX engines stop at the first error instead of waiting
/// for terminal input. Captured output is logged at debug level and the tail
/// of it is attached to the error on failure.
pub fn run_tool<I, S>(program: &str, args: I, current_dir: Option<&Path>) -> Result<(), ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args).stdin(Stdio::null());
    if let Some(dir) = current_dir {
        command.current_dir(dir);
    }

    log::debug!("Running {:?}", command);
    let output = command.output().map_err(|source| ToolError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stdout.lines().chain(stderr.lines()) {
        log::debug!("[{}] {}", program, line);
    }

    if output.status.success() {
        Ok(())
    } else {
        Err(ToolError::Failed {
            program: program.to_string(),
            status: describe_status(output.status),
            diagnostics: tail(&stdout, &stderr),
        })
    }
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exited with code {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

fn tail(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout
        .lines()
        .chain(stderr.lines())
        .filter(|line| !line.trim().is_empty())
        .collect();
    let start = lines.len().saturating_sub(DIAGNOSTIC_TAIL_LINES);
    lines[start..].join("\n")
}
