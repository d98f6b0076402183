//! Type-safe command execution
//!
//! `run_command_safe` is the only place that spawns external programs. It
//! guarantees:
//!
//! - process group isolation and PID registration (see `process_guard`)
//! - typed arguments via the `CommandArgs` trait
//! - dry-run handling for mutating commands

use crate::command_traits::{is_dry_run, CommandArgs};
use crate::process_guard::{ChildRegistry, CommandProcessGroup};
use anyhow::{Context, Result};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Execute a command described by typed arguments.
///
/// Returns `Ok` whenever the program ran, whatever its exit code; use
/// [`CommandOutput::ensure_success`] when a non-zero exit is an error.
/// Fails only when the program cannot be spawned or waited on.
pub fn run_command_safe<T: CommandArgs>(args: &T) -> Result<CommandOutput> {
    let program = args.program();
    let cli_args = args.to_cli_args();

    if args.is_mutating() && is_dry_run() {
        info!("[dry-run] would run: {} {}", program, cli_args.join(" "));
        return Ok(CommandOutput::skipped());
    }

    debug!("run_command_safe: {} args={:?}", program, cli_args);

    let child = Command::new(program)
        .args(&cli_args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .in_new_process_group()
        .spawn()
        .with_context(|| format!("Failed to spawn {}", program))?;
    let pid = child.id();

    // Poisoning only happens if a panic occurred while holding the lock
    if let Ok(mut registry) = ChildRegistry::global().lock() {
        registry.register(pid);
    }

    let output = child.wait_with_output();

    if let Ok(mut registry) = ChildRegistry::global().lock() {
        registry.unregister(pid);
    }

    let output = output.with_context(|| format!("Failed waiting for {}", program))?;
    let exit_code = output.status.code();
    debug!("{} exited with {:?}", program, exit_code);

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code,
        success: output.status.success(),
    })
}

/// Output from a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    pub success: bool,
}

impl CommandOutput {
    /// Result reported for a command skipped in dry-run mode
    pub fn skipped() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: Some(0),
            success: true,
        }
    }

    /// Error out with stderr attached if the command failed.
    pub fn ensure_success(&self, context: &str) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            anyhow::bail!(
                "{} failed (exit code {}): {}",
                context,
                self.exit_code.unwrap_or(-1),
                self.stderr.trim()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(&'static str);

    impl CommandArgs for Echo {
        fn program(&self) -> &'static str {
            "echo"
        }

        fn to_cli_args(&self) -> Vec<String> {
            vec![self.0.to_string()]
        }

        fn is_mutating(&self) -> bool {
            false
        }
    }

    struct False;

    impl CommandArgs for False {
        fn program(&self) -> &'static str {
            "false"
        }

        fn to_cli_args(&self) -> Vec<String> {
            vec![]
        }

        fn is_mutating(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_captures_stdout() {
        let output = run_command_safe(&Echo("hello")).unwrap();
        assert!(output.success);
        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.exit_code, Some(0));
        assert!(output.ensure_success("echo").is_ok());
    }

    #[test]
    fn test_failure_is_reported_not_raised() {
        let output = run_command_safe(&False).unwrap();
        assert!(!output.success);
        assert_eq!(output.exit_code, Some(1));
        let err = output.ensure_success("false").unwrap_err();
        assert!(err.to_string().contains("exit code 1"));
    }

    #[test]
    fn test_skipped_output_is_success() {
        let output = CommandOutput::skipped();
        assert!(output.success);
        assert!(output.ensure_success("noop").is_ok());
    }
}
