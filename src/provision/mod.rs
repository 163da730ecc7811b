mod apply;
mod deploy;
mod facts;
mod puppet;
mod source;

#[cfg(test)]
mod fixture;

use std::fs;
use std::path::Path;

use crate::error::{ProvisionError, ProvisionResult};
use crate::model::config::Settings;
use crate::model::mode::{InstallType, Mode};
use crate::shell::{CommandRunner, Shell};
use crate::step::Step;

/// Walks a host through every [`Step`] in order, stopping at the first
/// failure. Nothing is rolled back.
pub struct Provisioner<R> {
    settings: Settings,
    shell: Shell<R>,
}

impl<R: CommandRunner> Provisioner<R> {
    pub fn new(settings: Settings, runner: R) -> Self {
        let shell = Shell::new(runner, settings.privilege_command.clone());
        Self { settings, shell }
    }

    pub fn run(&mut self, requested: InstallType) -> ProvisionResult<Mode> {
        let mode = requested.resolve(&self.settings.guest_share);
        tracing::info!("Deploying installation of type {}...", mode.label());

        for step in Step::SEQUENCE {
            tracing::debug!("step: {}", step.label());
            self.update(step, mode)?;
        }

        tracing::info!("{} provisioned as {}", self.settings.site_name, mode.label());
        Ok(mode)
    }

    fn update(&mut self, step: Step, mode: Mode) -> ProvisionResult<()> {
        match step {
            Step::EnsureDeployLink => self.ensure_deploy_link(),
            Step::EnsureTool => self.ensure_tool().map(|_| ()),
            Step::ResolveSourceRepo => self.resolve_source_repo().map(|_| ()),
            Step::WriteFacts => self.write_facts(mode).map(|_| ()),
            Step::Apply => self.apply(),
        }
    }

    #[cfg(test)]
    pub fn shell(&self) -> &Shell<R> {
        &self.shell
    }

    #[cfg(test)]
    pub fn shell_mut(&mut self) -> &mut Shell<R> {
        &mut self.shell
    }
}

/// Present even as a dangling symlink.
fn path_present(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

fn ensure_dir(dir: &Path) -> ProvisionResult<()> {
    if dir.is_dir() {
        return Ok(());
    }
    tracing::info!("creating {}", dir.display());
    fs::create_dir_all(dir).map_err(|e| ProvisionError::io(dir, e))
}

fn symlink(target: &Path, link: &Path) -> ProvisionResult<()> {
    tracing::info!("linking {} -> {}", link.display(), target.display());
    std::os::unix::fs::symlink(target, link).map_err(|e| ProvisionError::io(link, e))
}
