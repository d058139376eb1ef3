use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// How a subprocess invocation ended
#[derive(Debug)]
pub enum CommandOutcome {
    /// The program ran to completion, successfully or not
    Completed(Output),
    /// The program is not installed or not on the PATH
    NotFound,
    /// The program was killed after exceeding its time limit
    TimedOut(Duration),
}

/// Run `program` with `args`, killing it if it outlives `timeout`.
pub async fn run<S: AsRef<str>>(
    program: &str,
    args: &[S],
    timeout: Duration,
) -> io::Result<CommandOutcome> {
    let child = Command::new(program)
        .args(args.iter().map(AsRef::as_ref))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match child {
        Ok(child) => child,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(CommandOutcome::NotFound),
        Err(e) => return Err(e),
    };

    // Dropping the pending future on timeout drops the child, which kills it
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => Ok(CommandOutcome::Completed(output?)),
        Err(_) => {
            tracing::debug!(program, ?timeout, "command timed out");
            Ok(CommandOutcome::TimedOut(timeout))
        }
    }
}

pub fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// The most useful explanation of a failed run: stderr, or stdout when the
/// utility reports failures there.
pub fn failure_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    match stdout.trim() {
        "" => match output.status.code() {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        },
        text => text.to_string(),
    }
}
