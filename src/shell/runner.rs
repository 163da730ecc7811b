use std::io;
use std::process::{Command, Stdio};

use crate::shell::command::{Completed, ShellCommand};

/// Executes commands on behalf of the provisioner.
pub trait CommandRunner {
    fn execute(&mut self, command: &ShellCommand) -> io::Result<Completed>;
}

/// Runs commands as real child processes, blocking until each exits.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn execute(&mut self, command: &ShellCommand) -> io::Result<Completed> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }

        if !command.capture {
            let status = cmd.status()?;
            return Ok(Completed {
                status: status.code(),
                stdout: String::new(),
            });
        }

        let output = cmd.stdin(Stdio::null()).output()?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!("{}: {}", command.program, stderr.trim_end());
        }

        Ok(Completed {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

#[cfg(test)]
pub use scripted::{Reply, ScriptedRunner};
