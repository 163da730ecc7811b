use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::model::mode::Mode;

/// Host facts handed to facter. Fields are declared in key order so the
/// serialized form is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostFacts {
    pub dev_instance: bool,
    pub site: String,
    pub user: String,
}

impl HostFacts {
    pub fn new(site: impl Into<String>, user: impl Into<String>, mode: Mode) -> Self {
        Self {
            dev_instance: mode.is_development(),
            site: site.into(),
            user: user.into(),
        }
    }

    /// Four-space indented JSON with a trailing newline.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut out = Vec::new();
        let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;
        out.push(b'\n');
        // serde_json only ever emits UTF-8
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}
