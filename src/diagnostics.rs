// ABOUTME: Non-fatal findings gathered while a command runs and reported once it ends.
// ABOUTME: Routing drift, hook failures past the point of no return, and lock cleanup problems.

use std::fmt;

use crate::output::Output;

/// What a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concern {
    /// The lock file could not be removed.
    Lock,
    /// A post-switch or on-error hook failed.
    Hook,
    /// The proxy config and the state file name different colors.
    Routing,
}

impl Concern {
    fn label(self) -> &'static str {
        match self {
            Concern::Lock => "lock",
            Concern::Hook => "hook",
            Concern::Routing => "routing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub concern: Concern,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.concern.label(), self.message)
    }
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    findings: Vec<Finding>,
}

impl Diagnostics {
    /// Log a finding now and keep it for [`Diagnostics::report`].
    pub fn note(&mut self, concern: Concern, message: impl Into<String>) {
        let finding = Finding {
            concern,
            message: message.into(),
        };
        tracing::warn!("{}", finding);
        self.findings.push(finding);
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Routing drift must be fixed by hand before the next switch.
    pub fn routing_drift(&self) -> bool {
        self.findings.iter().any(|f| f.concern == Concern::Routing)
    }

    pub fn report(&self, output: &Output) {
        for finding in &self.findings {
            output.warning(&finding.to_string());
        }
    }
}
