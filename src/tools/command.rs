//! Blocking external command execution.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::process::{Command, Output, Stdio};

use crate::error::{Error, Result};

/// Maximum number of stderr characters kept in error messages.
const STDERR_TAIL_CHARS: usize = 600;

/// Run an external tool to completion and capture its output.
///
/// A missing binary maps to [`Error::ToolUnavailable`]; a non-zero exit
/// status maps to [`Error::ConversionFailed`] carrying the end of stderr.
pub fn run_tool<I, S>(tool: &str, program: &OsStr, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    log::debug!("Running {}: {:?}", tool, command);

    let output = command.output().map_err(|e| match e.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => {
            Error::ToolUnavailable(format!("{} ({})", tool, program.to_string_lossy()))
        }
        _ => Error::conversion_failed(tool, e.to_string()),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::warn!("{} exited with {}", tool, output.status);
        return Err(Error::conversion_failed(
            tool,
            format!("{}: {}", output.status, stderr_tail(&stderr)),
        ));
    }

    Ok(output)
}

/// Last part of a tool's stderr, trimmed, for error messages.
pub fn stderr_tail(stderr: &str) -> String {
    let trimmed = stderr.trim();
    let count = trimmed.chars().count();
    if count <= STDERR_TAIL_CHARS {
        return trimmed.to_string();
    }
    let tail: String = trimmed.chars().skip(count - STDERR_TAIL_CHARS).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_unavailable() {
        let err = run_tool(
            "nonexistent",
            OsStr::new("kurdocx-definitely-not-installed-binary"),
            ["--version"],
        )
        .unwrap_err();
        assert!(matches!(err, Error::ToolUnavailable(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_stderr_tail() {
        assert_eq!(stderr_tail("  short \n"), "short");
        let long = "x".repeat(STDERR_TAIL_CHARS + 10);
        let tail = stderr_tail(&long);
        assert!(tail.starts_with("..."));
        assert_eq!(tail.chars().count(), STDERR_TAIL_CHARS + 3);
    }
}
