use std::fs;
use std::path::PathBuf;

use crate::error::{ProvisionError, ProvisionResult};
use crate::model::facts::HostFacts;
use crate::model::mode::Mode;
use crate::provision::{Provisioner, path_present};
use crate::shell::CommandRunner;

impl<R: CommandRunner> Provisioner<R> {
    /// Stage the facts file in the home directory, then move it into
    /// facter's directory. Previous facts are replaced wholesale.
    pub fn write_facts(&mut self, mode: Mode) -> ProvisionResult<PathBuf> {
        let facts = HostFacts::new(&self.settings.site_name, &self.settings.user, mode);
        let file_name = self.settings.facts_file_name();
        let staged = self.settings.home_dir.join(&file_name);

        fs::write(&staged, facts.to_json()?).map_err(|e| ProvisionError::io(&staged, e))?;

        let facts_dir = &self.settings.puppet.facts_dir;
        if !path_present(facts_dir) {
            self.shell
                .run(self.shell.privileged("mkdir").arg("-p").path_arg(facts_dir))?;
        }

        let target = facts_dir.join(&file_name);
        self.shell.run(
            self.shell
                .privileged("mv")
                .path_arg(&staged)
                .path_arg(&target),
        )?;
        Ok(target)
    }
}
