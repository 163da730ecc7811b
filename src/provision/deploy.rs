use crate::error::{ProvisionError, ProvisionResult};
use crate::provision::{Provisioner, ensure_dir, path_present, symlink};
use crate::shell::CommandRunner;

impl<R: CommandRunner> Provisioner<R> {
    /// Link the deploy checkout into puppet's directory so host and guest
    /// edit the same copy. An existing entry is left alone, even if it
    /// points somewhere else, so the deploy dir must hold the site
    /// manifest before anything is linked.
    pub fn ensure_deploy_link(&mut self) -> ProvisionResult<()> {
        let deploy_dir = &self.settings.deploy_dir;
        let manifest = deploy_dir.join(&self.settings.puppet.manifest);
        if !manifest.is_file() {
            return Err(ProvisionError::NotDeployCheckout {
                deploy_dir: deploy_dir.clone(),
                manifest,
            });
        }

        let link = self
            .settings
            .puppet_dir
            .join(self.settings.deploy_repo_name());

        if path_present(&link) {
            tracing::info!("{} exists, not changing existing config", link.display());
            return Ok(());
        }

        ensure_dir(&self.settings.puppet_dir)?;
        symlink(&self.settings.deploy_dir, &link)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::error::ProvisionError;
    use crate::model::mode::InstallType;
    use crate::provision::fixture::Fixture;
    use crate::shell::runner::ScriptedRunner;

    #[test]
    fn creates_link_to_deploy_checkout() {
        let fx = Fixture::new();
        let mut prov = fx.provisioner(ScriptedRunner::default());

        prov.ensure_deploy_link().unwrap();

        let target = fs::read_link(fx.deploy_link()).unwrap();
        assert_eq!(target, fx.settings.deploy_dir);
        assert!(prov.shell().runner().issued.is_empty());
    }

    #[test]
    fn deploy_dir_without_manifest_is_rejected() {
        let mut fx = Fixture::new();
        fx.settings.deploy_dir = fx.settings.home_dir.clone();
        let mut prov = fx.provisioner(ScriptedRunner::default());

        let err = prov.ensure_deploy_link().unwrap_err();
        assert!(matches!(err, ProvisionError::NotDeployCheckout { .. }));
        assert!(fs::symlink_metadata(fx.deploy_link()).is_err());
    }

    #[test]
    fn run_from_wrong_dir_stops_before_any_command() {
        let mut fx = Fixture::new();
        let checkout = fx.settings.deploy_dir.clone();
        fx.settings.deploy_dir = fx.settings.home_dir.clone();
        let mut prov = fx.provisioner(fx.runner_without_puppet());

        assert!(prov.run(InstallType::Production).is_err());
        assert!(prov.shell().runner().issued.is_empty());
        assert!(fs::symlink_metadata(fx.deploy_link()).is_err());

        fx.settings.deploy_dir = checkout.clone();
        let mut prov = fx.provisioner(ScriptedRunner::default());
        prov.ensure_deploy_link().unwrap();
        assert_eq!(fs::read_link(fx.deploy_link()).unwrap(), checkout);
    }

    #[test]
    fn existing_entry_wins() {
        let fx = Fixture::new();
        let elsewhere = fx.root.path().join("elsewhere");
        fs::create_dir_all(&fx.settings.puppet_dir).unwrap();
        std::os::unix::fs::symlink(&elsewhere, fx.deploy_link()).unwrap();

        let mut prov = fx.provisioner(ScriptedRunner::default());
        prov.ensure_deploy_link().unwrap();
        prov.ensure_deploy_link().unwrap();

        assert_eq!(fs::read_link(fx.deploy_link()).unwrap(), elsewhere);
    }
}
