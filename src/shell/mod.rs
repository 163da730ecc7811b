pub mod command;
pub mod runner;

pub use command::{Completed, Probe, ShellCommand};
pub use runner::{CommandRunner, SystemRunner};

use crate::error::{ProvisionError, ProvisionResult};

/// Logs and executes commands, turning exit codes into outcomes.
///
/// `run` treats a non-zero exit as fatal. `probe` reports it as a
/// [`Probe::SoftFailure`] for the caller to branch on. Both return
/// [`ProvisionError::Spawn`] when the program cannot be started.
#[derive(Debug)]
pub struct Shell<R> {
    runner: R,
    privilege_command: Option<String>,
}

impl<R: CommandRunner> Shell<R> {
    pub fn new(runner: R, privilege_command: Option<String>) -> Self {
        Self {
            runner,
            privilege_command,
        }
    }

    /// Command for `program` run with elevated privilege, if configured.
    pub fn privileged(&self, program: &str) -> ShellCommand {
        match &self.privilege_command {
            Some(sudo) => ShellCommand::new(sudo.as_str()).arg(program),
            None => ShellCommand::new(program),
        }
    }

    pub fn run(&mut self, command: ShellCommand) -> ProvisionResult<String> {
        let done = self.execute(&command)?;
        if done.success() {
            return Ok(done.stdout);
        }

        tracing::warn!(
            "command \"{command}\" exited with non-zero status {:?}",
            done.status
        );
        Err(ProvisionError::CommandFailed {
            command: command.to_string(),
            status: done.status,
        })
    }

    pub fn probe(&mut self, command: ShellCommand) -> ProvisionResult<Probe> {
        let done = self.execute(&command)?;
        if done.success() {
            return Ok(Probe::Success {
                stdout: done.stdout,
            });
        }

        tracing::debug!("probe \"{command}\" exited with status {:?}", done.status);
        Ok(Probe::SoftFailure {
            status: done.status,
        })
    }

    #[cfg(test)]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    #[cfg(test)]
    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }

    fn execute(&mut self, command: &ShellCommand) -> ProvisionResult<Completed> {
        tracing::info!("executing: {command}");
        self.runner
            .execute(command)
            .map_err(|source| ProvisionError::Spawn {
                command: command.to_string(),
                source,
            })
    }
}
