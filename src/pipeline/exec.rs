//! External tool invocation: spawn, capture stderr, map exit status,
//! enforce the configured deadline.
//!
//! Every stage that shells out goes through [`run_tool`], so the failure
//! taxonomy is uniform: a tool that cannot be spawned, a tool that exits
//! non-zero, and a tool that outlives its deadline are three distinct
//! [`StageError`] kinds. The child is spawned with `kill_on_drop` so an
//! expired deadline actually terminates the external process instead of
//! leaking it.

use crate::error::{Stage, StageError};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Longest stderr excerpt carried into a [`StageError::Tool`].
const STDERR_LIMIT: usize = 400;

/// Run an external tool to completion under a deadline.
///
/// Succeeds iff the process exits with status 0. The tool's stdout is
/// discarded (the tools here communicate through the filesystem); stderr is
/// captured for diagnostics.
pub async fn run_tool<I, S>(
    stage: Stage,
    tool: &Path,
    args: I,
    deadline: Duration,
) -> Result<(), StageError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let tool_name = tool.display().to_string();

    let mut cmd = Command::new(tool);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(stage = %stage, tool = %tool_name, "spawning external tool");

    let child = cmd.spawn().map_err(|e| StageError::Launch {
        stage,
        tool: tool_name.clone(),
        detail: e.to_string(),
    })?;

    let output = match tokio::time::timeout(deadline, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(StageError::Launch {
                stage,
                tool: tool_name,
                detail: e.to_string(),
            })
        }
        // Dropping the wait future kills the child (kill_on_drop).
        Err(_) => {
            return Err(StageError::Timeout {
                stage,
                tool: tool_name,
                secs: deadline.as_secs(),
            })
        }
    };

    if output.status.success() {
        return Ok(());
    }

    let status = output
        .status
        .code()
        .map_or_else(|| "signal".to_string(), |c| c.to_string());
    let stderr = truncate(String::from_utf8_lossy(&output.stderr).trim());

    Err(StageError::Tool {
        stage,
        tool: tool_name,
        status,
        stderr,
    })
}

fn truncate(s: &str) -> String {
    if s.len() <= STDERR_LIMIT {
        return s.to_string();
    }
    let mut end = STDERR_LIMIT;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\u{2026}", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn truncate_caps_long_strings_on_char_boundary() {
        let long = "é".repeat(400); // 800 bytes
        let t = truncate(&long);
        assert!(t.len() <= STDERR_LIMIT + '\u{2026}'.len_utf8());
        assert!(t.ends_with('\u{2026}'));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_ok() {
        run_tool(
            Stage::Rasterize,
            Path::new("true"),
            Vec::<&str>::new(),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_maps_to_tool_error() {
        let err = run_tool(
            Stage::Optimize,
            Path::new("false"),
            Vec::<&str>::new(),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        match err {
            StageError::Tool { stage, status, .. } => {
                assert_eq!(stage, Stage::Optimize);
                assert_eq!(status, "1");
            }
            other => panic!("expected Tool error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_binary_maps_to_launch_error() {
        let err = run_tool(
            Stage::Rasterize,
            Path::new("/no/such/binary-anywhere"),
            Vec::<&str>::new(),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StageError::Launch { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn deadline_expiry_maps_to_timeout() {
        let err = run_tool(
            Stage::Reassemble,
            Path::new("sleep"),
            ["5"],
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();
        match err {
            StageError::Timeout { stage, .. } => assert_eq!(stage, Stage::Reassemble),
            other => panic!("expected Timeout, got {other:?}"),
        }
    }
}
