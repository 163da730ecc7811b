use std::fmt;
use std::path::{Path, PathBuf};

/// One external command: program, arguments, and where to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Collect stdout instead of passing it through to the terminal.
    pub capture: bool,
}

impl ShellCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            capture: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy())
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn captured(mut self) -> Self {
        self.capture = true;
        self
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dir) = &self.cwd {
            write!(f, "cd {} && ", quote(&dir.to_string_lossy()))?;
        }
        f.write_str(&quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(word: &str) -> String {
    if !word.is_empty() && !word.contains(|c: char| c.is_whitespace() || c == '\'') {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', r"'\''"))
}

/// Exit status and captured stdout of a finished command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Completed {
    pub status: Option<i32>,
    pub stdout: String,
}

impl Completed {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Result of a command run in probe mode: a non-zero exit is an answer,
/// not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Success { stdout: String },
    SoftFailure { status: Option<i32> },
}
