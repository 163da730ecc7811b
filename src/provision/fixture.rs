use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::model::config::{AppConfig, Settings};
use crate::provision::Provisioner;
use crate::shell::runner::{Reply, ScriptedRunner};

pub const DPKG_INSTALLED: &str = "Package: puppet\nStatus: install ok installed\nVersion: 3.8.1-1\n";

/// A throwaway host layout: home, deploy checkout, guest share and
/// /etc paths all live under one temp dir.
pub struct Fixture {
    pub root: TempDir,
    pub settings: Settings,
}

impl Fixture {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let home = root.path().join("home/alice");
        let deploy = root.path().join("src/georef_deploy");
        let etc = root.path().join("etc");
        fs::create_dir_all(&home).unwrap();
        fs::create_dir_all(deploy.join("manifests")).unwrap();
        fs::write(deploy.join("manifests/site.pp"), "node default {}\n").unwrap();
        fs::create_dir_all(etc.join("puppet")).unwrap();

        let mut settings = AppConfig::from_toml("")
            .unwrap()
            .resolve(&home, "alice".to_string(), &deploy)
            .unwrap();
        settings.guest_share = root.path().join("vagrant");
        settings.puppet.hiera_path = etc.join("puppet/hiera.yaml");
        settings.puppet.conf_path = etc.join("puppet/puppet.conf");
        settings.puppet.facts_dir = etc.join("facter/facts.d");

        Self { root, settings }
    }

    pub fn with_shared_source(self) -> Self {
        fs::create_dir_all(self.shared_source()).unwrap();
        self
    }

    pub fn with_facts_dir(self) -> Self {
        fs::create_dir_all(&self.settings.puppet.facts_dir).unwrap();
        self
    }

    pub fn provisioner(&self, runner: ScriptedRunner) -> Provisioner<ScriptedRunner> {
        Provisioner::new(self.settings.clone(), runner)
    }

    pub fn runner_without_puppet(&self) -> ScriptedRunner {
        ScriptedRunner::default().reply("dpkg -s puppet", Reply::fail(1))
    }

    pub fn runner_with_puppet(&self, version: &str) -> ScriptedRunner {
        ScriptedRunner::default()
            .reply("dpkg -s puppet", Reply::ok(DPKG_INSTALLED))
            .reply("puppet --version", Reply::ok(&format!("{version}\n")))
    }

    pub fn shared_source(&self) -> PathBuf {
        self.settings.guest_share.join(&self.settings.site_name)
    }

    pub fn repo_dir(&self) -> PathBuf {
        self.settings.gds_dir.join(&self.settings.site_name)
    }

    pub fn deploy_link(&self) -> PathBuf {
        self.settings.puppet_dir.join("georef_deploy")
    }

    pub fn staged_facts_path(&self) -> PathBuf {
        self.settings.home_dir.join("georef.json")
    }
}
