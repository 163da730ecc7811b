use crate::error::ProvisionResult;
use crate::provision::Provisioner;
use crate::shell::CommandRunner;

const BANNER: &str = "######################################################################";

impl<R: CommandRunner> Provisioner<R> {
    /// Converge the host against the site manifest in the deploy checkout.
    pub fn apply(&mut self) -> ProvisionResult<()> {
        let deploy = &self.settings.deploy_dir;
        let module_path = deploy.join(&self.settings.puppet.module_dir);
        let manifest = deploy.join(&self.settings.puppet.manifest);

        tracing::info!("");
        tracing::info!("{BANNER}");
        tracing::info!("");

        self.shell.run(
            self.shell
                .privileged(&self.settings.puppet.program)
                .arg("apply")
                .arg(format!("--modulepath={}", module_path.display()))
                .path_arg(&manifest)
                .current_dir(&self.settings.home_dir),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProvisionError;
    use crate::provision::fixture::Fixture;
    use crate::shell::runner::{Reply, ScriptedRunner};

    #[test]
    fn applies_site_manifest_with_deploy_modules() {
        let fx = Fixture::new();
        let mut prov = fx.provisioner(ScriptedRunner::default());

        prov.apply().unwrap();

        let deploy = fx.settings.deploy_dir.display().to_string();
        let runner = prov.shell().runner();
        assert_eq!(
            runner.lines(),
            [format!(
                "sudo puppet apply --modulepath={deploy}/modules {deploy}/manifests/site.pp"
            )]
        );
        assert_eq!(runner.issued[0].cwd, Some(fx.settings.home_dir.clone()));
    }

    #[test]
    fn failed_apply_is_reported() {
        let fx = Fixture::new();
        let runner = ScriptedRunner::default().reply("sudo puppet apply", Reply::fail(6));
        let mut prov = fx.provisioner(runner);

        assert!(matches!(
            prov.apply(),
            Err(ProvisionError::CommandFailed { status: Some(6), .. })
        ));
    }
}
