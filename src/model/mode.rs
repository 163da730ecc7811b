use std::path::Path;

use clap::ValueEnum;

/// Installation type requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InstallType {
    Development,
    Production,
    /// Development inside a provisioned guest, production elsewhere.
    #[default]
    Auto,
}

/// Installation mode after `auto` has been settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Development,
    Production,
}

impl InstallType {
    /// Settle `auto` by looking for the guest share directory.
    pub fn resolve(self, guest_marker: &Path) -> Mode {
        match self {
            InstallType::Development => Mode::Development,
            InstallType::Production => Mode::Production,
            InstallType::Auto if guest_marker.is_dir() => Mode::Development,
            InstallType::Auto => Mode::Production,
        }
    }
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Mode::Development)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_is_development_inside_guest() {
        let share = tempfile::tempdir().unwrap();
        assert_eq!(InstallType::Auto.resolve(share.path()), Mode::Development);
    }

    #[test]
    fn auto_is_production_without_guest_share() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("vagrant");
        assert_eq!(InstallType::Auto.resolve(&missing), Mode::Production);
    }

    #[test]
    fn auto_ignores_plain_file_marker() {
        let root = tempfile::tempdir().unwrap();
        let marker = root.path().join("vagrant");
        std::fs::write(&marker, "").unwrap();
        assert_eq!(InstallType::Auto.resolve(&marker), Mode::Production);
    }

    #[test]
    fn explicit_type_overrides_detection() {
        let share = tempfile::tempdir().unwrap();
        let missing = share.path().join("absent");
        assert_eq!(
            InstallType::Production.resolve(share.path()),
            Mode::Production
        );
        assert_eq!(InstallType::Development.resolve(&missing), Mode::Development);
    }

    #[test]
    fn labels_match_cli_values() {
        assert_eq!(Mode::Development.label(), "development");
        assert_eq!(Mode::Production.label(), "production");
        assert!(Mode::Development.is_development());
    }
}
