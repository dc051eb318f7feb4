// src/system/executor.rs

// External command helpers for action bodies. The parser never calls these; a
// failure here is an ordinary error the action can propagate.

use crate::constants::WINDOWS_SCRIPT_EXTENSION;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::process::{Command as StdCommand, ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command as TokioCommand;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, #[source] io::Error),
    #[error("Command '{command}' exited with a non-zero status ({status}).")]
    NonZeroExitStatus { command: String, status: ExitStatus },
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("Command '{0}' was interrupted.")]
    Interrupted(String),
}

/// A command line split into program and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CommandLine {
    program: String,
    args: Vec<String>,
    text: String,
}

fn split_command_line(command_line: &str) -> Result<CommandLine, ExecutionError> {
    let text = command_line.trim();
    if text.is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }

    let mut parts = shlex::split(text)
        .ok_or_else(|| ExecutionError::CommandParse(text.to_string()))?
        .into_iter();
    let program = parts.next().ok_or(ExecutionError::EmptyCommand)?;

    Ok(CommandLine {
        program,
        args: parts.collect(),
        text: text.to_string(),
    })
}

/// The program names tried, in order, when spawning `program`.
///
/// The bare name always comes first. On Windows a name without an extension is
/// retried as a `.cmd` script, which is how most package-manager shims are installed.
pub fn program_candidates(program: &str) -> Vec<String> {
    let mut candidates = vec![program.to_string()];
    if cfg!(target_os = "windows") && Path::new(program).extension().is_none() {
        candidates.push(format!("{}{}", program, WINDOWS_SCRIPT_EXTENSION));
    }
    candidates
}

/// Calls `spawn` with each candidate name until one is found.
fn spawn_with_probe<T>(program: &str, mut spawn: impl FnMut(&str) -> io::Result<T>) -> io::Result<T> {
    let mut last_error = None;
    for candidate in program_candidates(program) {
        match spawn(&candidate) {
            Ok(child) => return Ok(child),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Program '{}' not found.", candidate);
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_error.unwrap_or_else(|| io::Error::new(ErrorKind::NotFound, program.to_string())))
}

fn check_status(command: &CommandLine, status: ExitStatus) -> Result<(), ExecutionError> {
    if status.success() {
        Ok(())
    } else {
        Err(ExecutionError::NonZeroExitStatus {
            command: command.text.clone(),
            status,
        })
    }
}

/// Runs a command line to completion with inherited standard streams.
pub fn execute_command(command_line: &str, cwd: &Path) -> Result<(), ExecutionError> {
    let command = split_command_line(command_line)?;
    let clean_cwd = dunce::simplified(cwd);
    log::debug!("Executing '{}' in {}", command.text, clean_cwd.display());

    let mut child = spawn_with_probe(&command.program, |program| {
        StdCommand::new(program)
            .args(&command.args)
            .current_dir(clean_cwd)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
    })
    .map_err(|e| ExecutionError::CommandFailed(command.text.clone(), e))?;

    let status = child
        .wait()
        .map_err(|e| ExecutionError::CommandFailed(command.text.clone(), e))?;
    check_status(&command, status)
}

/// Runs a command line and returns its standard output.
/// Standard error is passed through to the terminal.
pub fn execute_and_capture_output(command_line: &str, cwd: &Path) -> Result<String, ExecutionError> {
    let command = split_command_line(command_line)?;
    let clean_cwd = dunce::simplified(cwd);

    let child = spawn_with_probe(&command.program, |program| {
        StdCommand::new(program)
            .args(&command.args)
            .current_dir(clean_cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
    })
    .map_err(|e| ExecutionError::CommandFailed(command.text.clone(), e))?;

    let output = child
        .wait_with_output()
        .map_err(|e| ExecutionError::CommandFailed(command.text.clone(), e))?;
    check_status(&command, output.status)?;

    String::from_utf8(output.stdout).map_err(|e| ExecutionError::InvalidUtf8Output {
        command: command.text.clone(),
        source: e,
    })
}

/// Async variant of [`execute_command`]. Ctrl-C kills the child and yields
/// [`ExecutionError::Interrupted`].
pub async fn execute_command_async(command_line: &str, cwd: &Path) -> Result<(), ExecutionError> {
    let command = split_command_line(command_line)?;
    let clean_cwd = dunce::simplified(cwd);
    log::debug!("Executing '{}' in {}", command.text, clean_cwd.display());

    let mut child = spawn_with_probe(&command.program, |program| {
        TokioCommand::new(program)
            .args(&command.args)
            .current_dir(clean_cwd)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
    })
    .map_err(|e| ExecutionError::CommandFailed(command.text.clone(), e))?;

    tokio::select! {
        status = child.wait() => {
            let status = status.map_err(|e| ExecutionError::CommandFailed(command.text.clone(), e))?;
            check_status(&command, status)
        }
        _ = tokio::signal::ctrl_c() => {
            log::debug!("Interrupt received, killing child process...");
            if let Err(e) = child.kill().await {
                log::warn!("Failed to kill child process: {}", e);
            }
            Err(ExecutionError::Interrupted(command.text.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_split_command_line() {
        let command = split_command_line("  git commit -m 'first commit' ").unwrap();
        assert_eq!(command.program, "git");
        assert_eq!(command.args, vec!["commit", "-m", "first commit"]);
        assert_eq!(command.text, "git commit -m 'first commit'");

        assert!(matches!(split_command_line("   "), Err(ExecutionError::EmptyCommand)));
        assert!(matches!(
            split_command_line("echo 'unterminated"),
            Err(ExecutionError::CommandParse(_))
        ));
    }

    #[test]
    fn test_bare_program_is_tried_first() {
        let candidates = program_candidates("npm");
        assert_eq!(candidates.first().map(String::as_str), Some("npm"));

        if cfg!(target_os = "windows") {
            assert_eq!(candidates, vec!["npm", "npm.cmd"]);
            assert_eq!(program_candidates("npm.exe"), vec!["npm.exe"]);
        } else {
            assert_eq!(candidates, vec!["npm"]);
        }
    }

    #[test]
    fn test_probe_moves_on_only_when_not_found() {
        let mut tried = Vec::new();
        let result: io::Result<()> = spawn_with_probe("tool", |program| {
            tried.push(program.to_string());
            Err(io::Error::new(ErrorKind::PermissionDenied, "denied"))
        });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::PermissionDenied);
        assert_eq!(tried, vec!["tool"]);
    }

    #[test]
    fn test_missing_program_fails_to_execute() {
        let dir = tempdir().unwrap();
        let result = execute_command("definitely-not-a-real-program-4821", dir.path());
        assert!(matches!(
            result,
            Err(ExecutionError::CommandFailed(_, ref e)) if e.kind() == ErrorKind::NotFound
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_is_checked() {
        let dir = tempdir().unwrap();
        assert!(execute_command("true", dir.path()).is_ok());
        assert!(matches!(
            execute_command("false", dir.path()),
            Err(ExecutionError::NonZeroExitStatus { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_output_runs_in_cwd() {
        let dir = tempdir().unwrap();
        let output = execute_and_capture_output("pwd", dir.path()).unwrap();
        assert_eq!(
            Path::new(output.trim()).canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );

        let echoed = execute_and_capture_output("echo 'hello world'", dir.path()).unwrap();
        assert_eq!(echoed, "hello world\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_async_execution() {
        let dir = tempdir().unwrap();
        assert!(execute_command_async("true", dir.path()).await.is_ok());
        assert!(matches!(
            execute_command_async("false", dir.path()).await,
            Err(ExecutionError::NonZeroExitStatus { .. })
        ));
    }
}
