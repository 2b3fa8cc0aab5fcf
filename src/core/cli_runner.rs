//! Usage tool runner.
//!
//! Resolves the configured `ccusage` path and runs it as a short-lived child
//! process with a bounded timeout.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{CcduError, Result};

/// Default timeout for usage tool commands.
pub const CLI_TIMEOUT: Duration = Duration::from_secs(5);

/// Arguments requesting the daily report as JSON.
pub const DAILY_JSON_ARGS: [&str; 2] = ["daily", "--json"];

/// Captured output longer than this is truncated in logs and errors.
pub const MAX_LOGGED_OUTPUT: usize = 128;

/// Output from a CLI command.
#[derive(Debug)]
pub struct CliOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: i32,
}

impl CliOutput {
    /// Check if command succeeded (exit code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Truncate captured output for logging.
#[must_use]
pub fn truncate_output(output: &[u8]) -> String {
    if output.len() <= MAX_LOGGED_OUTPUT {
        String::from_utf8_lossy(output).into_owned()
    } else {
        format!("{}...", String::from_utf8_lossy(&output[..MAX_LOGGED_OUTPUT]))
    }
}

/// Resolve a tool path to an absolute executable path.
///
/// Bare names are looked up on `PATH`; paths with separators are resolved
/// against the current directory.
///
/// # Errors
///
/// Returns [`CcduError::ToolNotFound`] if the path is empty or does not
/// resolve to an executable file.
pub fn resolve_tool(path: &str) -> Result<PathBuf> {
    if path.trim().is_empty() {
        return Err(CcduError::ToolNotFound(path.to_string()));
    }

    let resolved = which::which(path).map_err(|_| CcduError::ToolNotFound(path.to_string()))?;
    if resolved.is_absolute() {
        Ok(resolved)
    } else {
        Ok(std::env::current_dir()?.join(resolved))
    }
}

/// Check whether a tool path resolves to an executable regular file.
///
/// Advisory only; the invocation re-resolves the path.
#[must_use]
pub fn is_tool_available(path: &str) -> bool {
    resolve_tool(path).is_ok_and(|resolved| is_executable_file(&resolved))
}

/// Result of probing a configured tool path.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ToolCheck {
    /// Path as configured.
    pub configured: String,
    /// Absolute path it resolved to, if any.
    pub resolved: Option<PathBuf>,
    /// Whether the resolved path is an executable file.
    pub available: bool,
}

/// Resolve a tool path and report what was found.
#[must_use]
pub fn check_tool(path: &str) -> ToolCheck {
    let resolved = resolve_tool(path).ok();
    let available = resolved.as_deref().is_some_and(is_executable_file);
    ToolCheck {
        configured: path.to_string(),
        resolved,
        available,
    }
}

fn is_executable_file(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if metadata.is_dir() {
        return false;
    }
    has_execute_bit(&metadata)
}

#[cfg(unix)]
fn has_execute_bit(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_execute_bit(metadata: &std::fs::Metadata) -> bool {
    metadata.is_file()
}

/// Run a CLI command with timeout.
///
/// The child is killed if the timeout elapses or the returned future is dropped.
///
/// # Errors
///
/// Returns error if:
/// - Command not found
/// - Command times out
/// - Command fails to execute
pub async fn run_command(
    program: &Path,
    args: &[&str],
    timeout_duration: Duration,
) -> Result<CliOutput> {
    let display = program.display().to_string();
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CcduError::ToolNotFound(display.clone())
            } else {
                CcduError::Spawn {
                    path: display.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

    let result = timeout(timeout_duration, async {
        // Read stdout and stderr concurrently so a full pipe on one stream
        // cannot block the child while we wait on the other.
        let stdout_handle = async {
            let mut stdout = Vec::new();
            if let Some(mut out) = child.stdout.take() {
                out.read_to_end(&mut stdout).await?;
            }
            Ok::<_, std::io::Error>(stdout)
        };

        let stderr_handle = async {
            let mut stderr = Vec::new();
            if let Some(mut err) = child.stderr.take() {
                err.read_to_end(&mut stderr).await?;
            }
            Ok::<_, std::io::Error>(stderr)
        };

        let (stdout_result, stderr_result) = tokio::join!(stdout_handle, stderr_handle);
        let stdout = stdout_result?;
        let stderr = stderr_result?;

        let status = child.wait().await?;

        Ok::<_, std::io::Error>(CliOutput {
            stdout,
            stderr,
            exit_code: status.code().unwrap_or(-1),
        })
    })
    .await;

    match result {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(CcduError::Spawn {
            path: display,
            reason: e.to_string(),
        }),
        Err(_) => {
            // Timeout - kill the process
            let _ = child.kill().await;
            let _ = child.wait().await;
            Err(CcduError::Timeout {
                path: display,
                seconds: timeout_duration.as_secs(),
            })
        }
    }
}

/// The external `ccusage` tool.
#[derive(Debug, Clone)]
pub struct UsageTool {
    path: String,
    timeout: Duration,
}

impl UsageTool {
    #[must_use]
    pub fn new(path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    /// Configured (unresolved) path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        is_tool_available(&self.path)
    }

    /// Run `<tool> daily --json` and return its stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool cannot be resolved or started, exits
    /// non-zero, or exceeds the timeout.
    pub async fn fetch_daily(&self) -> Result<Vec<u8>> {
        let resolved = resolve_tool(&self.path)?;
        let output = run_command(&resolved, &DAILY_JSON_ARGS, self.timeout).await?;

        if !output.success() {
            let captured = if output.stderr.is_empty() {
                &output.stdout
            } else {
                &output.stderr
            };
            return Err(CcduError::CommandFailed {
                path: resolved.display().to_string(),
                exit_code: output.exit_code,
                output: truncate_output(captured),
            });
        }

        tracing::debug!(
            path = %resolved.display(),
            out_len = output.stdout.len(),
            "usage tool command successful"
        );
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_output_is_unchanged() {
        assert_eq!(truncate_output(b"hello"), "hello");
    }

    #[test]
    fn truncate_long_output_is_capped() {
        let long = vec![b'a'; MAX_LOGGED_OUTPUT * 2];
        let truncated = truncate_output(&long);
        assert_eq!(truncated.len(), MAX_LOGGED_OUTPUT + 3);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn empty_path_is_not_available() {
        assert!(!is_tool_available(""));
        assert!(matches!(resolve_tool("  "), Err(CcduError::ToolNotFound(_))));
    }

    #[test]
    fn missing_path_is_not_available() {
        assert!(!is_tool_available("/nonexistent/path/to/ccusage"));
        let check = check_tool("/nonexistent/path/to/ccusage");
        assert!(check.resolved.is_none());
        assert!(!check.available);
    }

    #[cfg(unix)]
    #[test]
    fn directory_is_not_available() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_tool_available(dir.path().to_str().unwrap()));
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_file_is_not_available() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ccusage");
        std::fs::write(&path, "#!/bin/sh\necho {}\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(!is_tool_available(path.to_str().unwrap()));

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(is_tool_available(path.to_str().unwrap()));
    }

    #[cfg(unix)]
    #[test]
    fn bare_name_resolves_to_absolute_path() {
        let resolved = resolve_tool("sh").unwrap();
        assert!(resolved.is_absolute());

        let check = check_tool("sh");
        assert_eq!(check.resolved.as_deref(), Some(resolved.as_path()));
        assert!(check.available);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_command_captures_stdout_and_exit_code() {
        let sh = resolve_tool("sh").unwrap();
        let output = run_command(&sh, &["-c", "printf out; printf err >&2; exit 3"], CLI_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(output.stdout, b"out");
        assert_eq!(output.stderr, b"err");
        assert_eq!(output.exit_code, 3);
        assert!(!output.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_command_times_out() {
        let sh = resolve_tool("sh").unwrap();
        let err = run_command(&sh, &["-c", "sleep 5"], Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, CcduError::Timeout { .. }));
    }
}
