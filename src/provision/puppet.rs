use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ProvisionError, ProvisionResult};
use crate::model::version::{ToolVersion, meets_minimum};
use crate::provision::{Provisioner, path_present};
use crate::shell::{CommandRunner, Probe, ShellCommand};

static TEMPLATEDIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*templatedir\s*=").expect("valid templatedir regex"));

/// Where the installed puppet stands against the configured minimum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolState {
    Absent,
    Outdated(Option<ToolVersion>),
    Current(ToolVersion),
}

impl ToolState {
    pub fn classify(installed: bool, version: Option<ToolVersion>, minimum: &ToolVersion) -> Self {
        match version {
            _ if !installed => ToolState::Absent,
            Some(version) if meets_minimum(Some(&version), minimum) => ToolState::Current(version),
            other => ToolState::Outdated(other),
        }
    }
}

impl<R: CommandRunner> Provisioner<R> {
    /// Install or upgrade puppet as needed, then quiet its two spurious
    /// startup warnings.
    pub fn ensure_tool(&mut self) -> ProvisionResult<ToolState> {
        let package = self.settings.puppet.package.clone();
        let installed = self.is_package_installed(&package)?;
        let version = if installed {
            self.probe_tool_version()?
        } else {
            None
        };

        let state = ToolState::classify(installed, version, &self.settings.puppet.min_version);
        match &state {
            ToolState::Current(version) => {
                tracing::info!("recent puppet is already installed ({version})");
            }
            ToolState::Outdated(_) => self.install_tool(&package, true)?,
            ToolState::Absent => self.install_tool(&package, false)?,
        }

        self.ensure_hiera_config()?;
        self.strip_templatedir()?;
        Ok(state)
    }

    /// Any failure to confirm the package counts as "not installed".
    pub fn is_package_installed(&mut self, package: &str) -> ProvisionResult<bool> {
        let probe = self.shell.probe(
            ShellCommand::new("dpkg")
                .args(["-s", package])
                .captured(),
        )?;

        Ok(match probe {
            Probe::Success { stdout } => dpkg_reports_installed(&stdout),
            Probe::SoftFailure { .. } => false,
        })
    }

    /// `None` when puppet cannot be run or its version cannot be read.
    pub fn probe_tool_version(&mut self) -> ProvisionResult<Option<ToolVersion>> {
        let program = self.settings.puppet.program.clone();
        let probe = self
            .shell
            .probe(ShellCommand::new(program.as_str()).arg("--version").captured());

        match probe {
            Ok(Probe::Success { stdout }) => match stdout.parse::<ToolVersion>() {
                Ok(version) => Ok(Some(version)),
                Err(err) => {
                    tracing::warn!("{program}: {err}; treating it as outdated");
                    Ok(None)
                }
            },
            Ok(Probe::SoftFailure { status }) => {
                tracing::warn!("{program} --version failed with status {status:?}");
                Ok(None)
            }
            Err(ProvisionError::Spawn { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("{program} is not on PATH");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn install_tool(&mut self, package: &str, upgrade: bool) -> ProvisionResult<()> {
        let url = self.settings.puppet.release_url.clone();
        let download = tempfile::Builder::new()
            .suffix("puppet")
            .tempdir()
            .map_err(|e| ProvisionError::io(std::env::temp_dir(), e))?;
        let deb = download.path().join(release_file_name(&url));

        self.shell.run(
            ShellCommand::new("curl")
                .arg("-fsSL")
                .arg("-o")
                .path_arg(&deb)
                .arg(url.as_str()),
        )?;
        self.shell
            .run(self.shell.privileged("dpkg").arg("-i").path_arg(&deb))?;
        self.shell
            .run(self.shell.privileged("apt-get").arg("update"))?;

        let action = if upgrade { "upgrade" } else { "install" };
        self.shell
            .run(self.shell.privileged("apt-get").args([action, "-y", package]))?;
        Ok(())
    }

    fn ensure_hiera_config(&mut self) -> ProvisionResult<()> {
        let hiera = &self.settings.puppet.hiera_path;
        if path_present(hiera) {
            return Ok(());
        }
        self.shell
            .run(self.shell.privileged("touch").path_arg(hiera))?;
        Ok(())
    }

    /// Drop deprecated `templatedir` settings from puppet.conf. The first
    /// rewrite keeps a `.orig` backup, later ones start from it.
    fn strip_templatedir(&mut self) -> ProvisionResult<()> {
        let conf = self.settings.puppet.conf_path.clone();
        let Ok(current) = fs::read_to_string(&conf) else {
            tracing::debug!("{} not readable, leaving it alone", conf.display());
            return Ok(());
        };

        if !has_templatedir(&current) {
            return Ok(());
        }

        let backup = backup_path(&conf);
        let original = if path_present(&backup) {
            tracing::info!("{} exists, not changing it", backup.display());
            fs::read_to_string(&backup).map_err(|e| ProvisionError::io(&backup, e))?
        } else {
            self.shell
                .run(self.shell.privileged("cp").path_arg(&conf).path_arg(&backup))?;
            current
        };

        let mut staged =
            tempfile::NamedTempFile::new().map_err(|e| ProvisionError::io(std::env::temp_dir(), e))?;
        staged
            .write_all(without_templatedir(&original).as_bytes())
            .map_err(|e| ProvisionError::io(staged.path(), e))?;

        self.shell
            .run(self.shell.privileged("cp").path_arg(staged.path()).path_arg(&conf))?;
        Ok(())
    }
}

fn dpkg_reports_installed(status_output: &str) -> bool {
    status_output
        .lines()
        .filter_map(|line| line.strip_prefix("Status:"))
        .any(|status| status.split_whitespace().last() == Some("installed"))
}

fn release_file_name(url: &str) -> &str {
    url.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("puppet-release.deb")
}

fn backup_path(conf: &Path) -> PathBuf {
    let mut name = OsString::from(conf.as_os_str());
    name.push(".orig");
    PathBuf::from(name)
}

fn has_templatedir(text: &str) -> bool {
    text.lines().any(|line| TEMPLATEDIR_RE.is_match(line))
}

fn without_templatedir(text: &str) -> String {
    let mut out: String = text
        .lines()
        .filter(|line| !TEMPLATEDIR_RE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n");
    if text.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }
    out
}
