use std::path::Path;

use crate::error::ProvisionResult;
use crate::provision::{Provisioner, ensure_dir, path_present, symlink};
use crate::shell::{CommandRunner, ShellCommand};

/// How the site source tree ended up in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceResolution {
    AlreadyPresent,
    /// Linked to a checkout on the guest share.
    Linked,
    Cloned,
}

impl<R: CommandRunner> Provisioner<R> {
    /// Prefer a checkout the host already shares with the guest over a
    /// second clone that could drift from it.
    pub fn resolve_source_repo(&mut self) -> ProvisionResult<SourceResolution> {
        let site = self.settings.site_name.clone();
        let repo_dir = self.settings.gds_dir.join(&site);

        if path_present(&repo_dir) {
            tracing::info!("{} exists, not changing existing config", repo_dir.display());
            return Ok(SourceResolution::AlreadyPresent);
        }

        let shared = self.settings.guest_share.join(&site);
        if shared.is_dir() {
            ensure_dir(&self.settings.gds_dir)?;
            symlink(&shared, &repo_dir)?;
            return Ok(SourceResolution::Linked);
        }

        self.clone_source(&site, &repo_dir)?;
        Ok(SourceResolution::Cloned)
    }

    fn clone_source(&mut self, site: &str, repo_dir: &Path) -> ProvisionResult<()> {
        let git_package = self.settings.git_package.clone();
        self.shell.run(
            self.shell
                .privileged("apt-get")
                .args(["install", "-y", git_package.as_str()]),
        )?;

        ensure_dir(&self.settings.gds_dir)?;
        self.shell.run(
            ShellCommand::new("git")
                .args(["clone", "--recursive"])
                .arg(self.settings.source_url())
                .arg(site)
                .current_dir(&self.settings.gds_dir),
        )?;
        self.shell.run(
            ShellCommand::new("git")
                .args(["submodule", "foreach", "git", "checkout"])
                .arg(self.settings.submodule_branch.as_str())
                .current_dir(repo_dir),
        )?;
        Ok(())
    }
}
