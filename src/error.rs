use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("command `{command}` exited with {}", describe_status(.status))]
    CommandFailed {
        command: String,
        status: Option<i32>,
    },

    #[error("could not start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a deploy checkout: missing {}", deploy_dir.display(), manifest.display())]
    NotDeployCheckout {
        deploy_dir: PathBuf,
        manifest: PathBuf,
    },

    #[error("could not serialize host facts: {0}")]
    Facts(#[from] serde_json::Error),
}

pub type ProvisionResult<T> = Result<T, ProvisionError>;

impl ProvisionError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match *status {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failure_names_command_and_status() {
        let err = ProvisionError::CommandFailed {
            command: "sudo apt-get update".into(),
            status: Some(100),
        };
        assert_eq!(
            err.to_string(),
            "command `sudo apt-get update` exited with status 100"
        );
    }

    #[test]
    fn signal_termination_is_described() {
        let err = ProvisionError::CommandFailed {
            command: "puppet apply".into(),
            status: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}
