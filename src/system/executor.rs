// src/system/executor.rs

use std::io::ErrorKind;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, #[source] std::io::Error),
    #[error("Command '{0}' exited with a non-zero error code.")]
    NonZeroExitStatus(String),
}

/// Executes a system command and blocks until it finishes. Stdout and stderr
/// are inherited from the invoking process. A non-zero exit status is an
/// error unless `ignore_errors` is set.
pub fn execute_command(command_line: &str, ignore_errors: bool) -> Result<(), ExecutionError> {
    let trimmed_command = command_line.trim();
    if trimmed_command.is_empty() {
        return Ok(()); // An empty command is a success, not an error.
    }

    let parts = shlex::split(trimmed_command)
        .ok_or_else(|| ExecutionError::CommandParse(trimmed_command.to_string()))?;
    if parts.is_empty() {
        return Ok(());
    }

    let program = &parts[0];
    let args = &parts[1..];

    let mut command = StdCommand::new(program);
    command
        .args(args)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    // Fallback logic for Windows built-in commands like `echo`.
    // We try to spawn directly first. If it fails with `NotFound`, we retry with `cmd /C`.
    let status = match command.status() {
        Ok(status) => status,
        Err(e) if e.kind() == ErrorKind::NotFound && cfg!(target_os = "windows") => {
            log::debug!("Command '{}' not found. Retrying with cmd /C.", program);
            StdCommand::new("cmd")
                .arg("/C")
                .arg(trimmed_command) // Pass the full, unparsed line to cmd
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(|e| ExecutionError::CommandFailed(trimmed_command.to_string(), e))?
        }
        Err(e) => {
            return Err(ExecutionError::CommandFailed(trimmed_command.to_string(), e));
        }
    };

    if !status.success() && !ignore_errors {
        return Err(ExecutionError::NonZeroExitStatus(trimmed_command.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_a_success() {
        assert!(execute_command("   ", false).is_ok());
    }

    #[test]
    fn unbalanced_quotes_are_a_parse_error() {
        let err = execute_command("echo \"unterminated", false).unwrap_err();
        assert!(matches!(err, ExecutionError::CommandParse(_)));
    }

    #[test]
    #[cfg(unix)]
    fn non_zero_exit_is_an_error_unless_ignored() {
        assert!(matches!(
            execute_command("false", false),
            Err(ExecutionError::NonZeroExitStatus(_))
        ));
        assert!(execute_command("false", true).is_ok());
    }

    #[test]
    #[cfg(unix)]
    fn successful_command_runs() {
        assert!(execute_command("true", false).is_ok());
    }
}
