/// Provisioning steps, in the order they run. Mode resolution happens
/// before the first of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    // -- Configuration repo
    EnsureDeployLink,

    // -- Puppet itself
    EnsureTool,

    // -- Site source tree
    ResolveSourceRepo,

    // -- Facter input and convergence
    WriteFacts,
    Apply,
}

impl Step {
    pub const SEQUENCE: [Step; 5] = [
        Step::EnsureDeployLink,
        Step::EnsureTool,
        Step::ResolveSourceRepo,
        Step::WriteFacts,
        Step::Apply,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Step::EnsureDeployLink => "link deploy repo",
            Step::EnsureTool => "install puppet",
            Step::ResolveSourceRepo => "resolve source repo",
            Step::WriteFacts => "write facts",
            Step::Apply => "apply manifest",
        }
    }
}
