//! Running mount and unmount commands.

use std::io;
use std::process::Command;

/// Why a command did not succeed.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("empty command")]
    EmptyCommand,

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("exited with status {code}")]
    Exit { code: i32 },

    #[error("terminated by signal")]
    Killed,
}

/// Executes an argv list and reports whether it succeeded.
///
/// Calls block until the command finishes. The driver holds the store lock
/// across a call, so a command that never returns stalls every volume
/// operation.
pub trait CommandRunner: Send + Sync {
    fn run(&self, argv: &[String]) -> Result<(), RunError>;
}

/// Runs commands as child processes, inheriting stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> Result<(), RunError> {
        let (program, args) = argv.split_first().ok_or(RunError::EmptyCommand)?;

        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|source| RunError::Spawn {
                program: program.clone(),
                source,
            })?;
        log::debug!("{} finished with {}", program, status);

        if status.success() {
            return Ok(());
        }
        match status.code() {
            Some(code) => Err(RunError::Exit { code }),
            None => Err(RunError::Killed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn success() {
        SystemRunner.run(&argv(&["true"])).unwrap();
    }

    #[test]
    fn non_zero_exit() {
        let e = SystemRunner.run(&argv(&["sh", "-c", "exit 3"])).unwrap_err();
        assert!(matches!(e, RunError::Exit { code: 3 }));
    }

    #[test]
    fn missing_program() {
        let e = SystemRunner
            .run(&argv(&["/nonexistent/easyfuse-test-binary"]))
            .unwrap_err();
        assert!(matches!(e, RunError::Spawn { .. }));
    }

    #[test]
    fn empty_argv() {
        assert!(matches!(
            SystemRunner.run(&[]),
            Err(RunError::EmptyCommand)
        ));
    }
}
