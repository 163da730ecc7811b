use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::version::ToolVersion;

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub paths: PathsConfig,
    pub puppet: PuppetConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub git_url_prefix: String,
    pub submodule_branch: String,
}

#[derive(Debug, Deserialize)]
pub struct PathsConfig {
    pub gds_dir: String,
    pub puppet_dir: String,
    pub guest_share: String,
    #[serde(default)]
    pub deploy_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PuppetConfig {
    pub program: String,
    pub package: String,
    pub min_version: String,
    pub release_url: String,
    pub hiera_path: String,
    pub conf_path: String,
    pub facts_dir: String,
    pub manifest: String,
    pub module_dir: String,
}

#[derive(Debug, Deserialize)]
pub struct SystemConfig {
    pub privilege_command: String,
    pub git_package: String,
}

/// Everything the provisioner needs, with paths made absolute.
#[derive(Debug, Clone)]
pub struct Settings {
    pub site_name: String,
    pub git_url_prefix: String,
    pub submodule_branch: String,
    pub user: String,
    pub home_dir: PathBuf,
    pub gds_dir: PathBuf,
    pub puppet_dir: PathBuf,
    pub guest_share: PathBuf,
    pub deploy_dir: PathBuf,
    pub puppet: PuppetSettings,
    pub privilege_command: Option<String>,
    pub git_package: String,
}

#[derive(Debug, Clone)]
pub struct PuppetSettings {
    pub program: String,
    pub package: String,
    pub min_version: ToolVersion,
    pub release_url: String,
    pub hiera_path: PathBuf,
    pub conf_path: PathBuf,
    pub facts_dir: PathBuf,
    pub manifest: PathBuf,
    pub module_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config → `--config`.
    pub fn load(extra: Option<&Path>) -> Result<Self> {
        let user_config = directories::ProjectDirs::from("", "", "site-provision")
            .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
            .filter(|path| path.exists());

        Self::load_layers(user_config.as_deref(), extra)
    }

    fn load_layers(user_config: Option<&Path>, extra: Option<&Path>) -> Result<Self> {
        let mut merged = parse_layer(DEFAULTS)?;

        for path in [user_config, extra].into_iter().flatten() {
            merge(&mut merged, read_layer(path)?);
        }

        merged
            .try_into()
            .context("invalid site-provision configuration")
    }

    #[cfg(test)]
    pub fn from_toml(overrides: &str) -> Result<Self> {
        let mut merged = parse_layer(DEFAULTS)?;
        merge(&mut merged, parse_layer(overrides)?);
        Ok(merged.try_into()?)
    }

    /// Pin every path: `~` against `home`, relative paths against `cwd`.
    /// `cwd` also stands in for an unset deploy dir. Manifest and module
    /// dir stay relative to the deploy dir.
    pub fn resolve(&self, home: &Path, user: String, cwd: &Path) -> Result<Settings> {
        let min_version = self
            .puppet
            .min_version
            .parse::<ToolVersion>()
            .with_context(|| format!("puppet.min_version {:?}", self.puppet.min_version))?;

        let pin = |path: &str| absolutize(path, home, cwd);
        let deploy_dir = match self.paths.deploy_dir.as_deref() {
            Some(dir) => pin(dir),
            None => cwd.to_path_buf(),
        };

        let privilege_command = Some(self.system.privilege_command.trim())
            .filter(|cmd| !cmd.is_empty())
            .map(str::to_string);

        Ok(Settings {
            site_name: self.site.name.clone(),
            git_url_prefix: self.site.git_url_prefix.clone(),
            submodule_branch: self.site.submodule_branch.clone(),
            user,
            home_dir: home.to_path_buf(),
            gds_dir: pin(&self.paths.gds_dir),
            puppet_dir: pin(&self.paths.puppet_dir),
            guest_share: pin(&self.paths.guest_share),
            deploy_dir,
            puppet: PuppetSettings {
                program: self.puppet.program.clone(),
                package: self.puppet.package.clone(),
                min_version,
                release_url: self.puppet.release_url.clone(),
                hiera_path: pin(&self.puppet.hiera_path),
                conf_path: pin(&self.puppet.conf_path),
                facts_dir: pin(&self.puppet.facts_dir),
                manifest: PathBuf::from(&self.puppet.manifest),
                module_dir: PathBuf::from(&self.puppet.module_dir),
            },
            privilege_command,
            git_package: self.system.git_package.clone(),
        })
    }
}

impl Settings {
    pub fn facts_file_name(&self) -> String {
        format!("{}.json", self.site_name)
    }

    pub fn deploy_repo_name(&self) -> String {
        format!("{}_deploy", self.site_name)
    }

    pub fn source_url(&self) -> String {
        format!(
            "{}/{}",
            self.git_url_prefix.trim_end_matches('/'),
            self.site_name
        )
    }
}

pub fn home_dir() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or_else(|| anyhow!("cannot determine home directory"))
}

pub fn current_user() -> Result<String> {
    ["USER", "LOGNAME"]
        .iter()
        .find_map(|key| std::env::var(key).ok().filter(|value| !value.is_empty()))
        .ok_or_else(|| anyhow!("cannot determine user name from $USER or $LOGNAME"))
}

fn read_layer(path: &Path) -> Result<toml::Value> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_layer(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn parse_layer(raw: &str) -> Result<toml::Value> {
    Ok(toml::Value::Table(toml::from_str::<toml::Table>(raw)?))
}

/// Overlay `layer` onto `base`, descending into tables and replacing leaves.
fn merge(base: &mut toml::Value, layer: toml::Value) {
    match (base, layer) {
        (toml::Value::Table(base), toml::Value::Table(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

/// Only a bare `~` or a `~/` prefix names the home directory; `~user`
/// forms are left as written.
fn expand_tilde(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        return home.to_path_buf();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest.trim_start_matches('/')),
        None => PathBuf::from(path),
    }
}

fn absolutize(path: &str, home: &Path, cwd: &Path) -> PathBuf {
    let expanded = expand_tilde(path, home);
    if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    }
}
