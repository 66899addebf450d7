use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::command::CommandError;

/// Captured output of a finished command.
#[derive(Debug)]
pub struct CommandOutput {
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

/// Runs a program to completion with a bounded timeout.
///
/// The child is killed when the timeout elapses or when the returned future is
/// dropped, so a hung `systemctl` or `journalctl` cannot outlive its caller.
///
/// # Arguments
/// - `program` - Program name, resolved through `PATH`
/// - `args` - Arguments passed verbatim
/// - `timeout` - Upper bound on the run time
///
/// # Returns
/// - `Ok(CommandOutput)` - The program ran; check `success` for the exit status
/// - `Err(CommandError::Spawn)` - The program could not be started
/// - `Err(CommandError::TimedOut)` - The program was killed after `timeout`
pub async fn run(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<CommandOutput, CommandError> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, child).await {
        Ok(result) => result.map_err(|source| CommandError::Spawn {
            program: program.to_string(),
            source,
        })?,
        Err(_) => {
            return Err(CommandError::TimedOut {
                program: program.to_string(),
                timeout,
            })
        }
    };

    Ok(CommandOutput {
        success: output.status.success(),
        status: output.status.to_string(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Like `run`, but treats a non-zero exit status as an error.
pub async fn run_checked(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<CommandOutput, CommandError> {
    let output = run(program, args, timeout).await?;

    if !output.success {
        return Err(CommandError::Failed {
            program: program.to_string(),
            status: output.status,
            stderr: output.stderr,
        });
    }

    Ok(output)
}
