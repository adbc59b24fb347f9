use crate::types::{Finding, FormDescriptor, Verdict, VulnerabilityKind};
use log::debug;

/// Append-only collection of findings for one scan.
///
/// Nothing is merged or deduplicated: the same parameter hit by two
/// techniques yields two findings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindingLog {
    findings: Vec<Finding>,
}

impl FindingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        debug!("Recording {} finding: {}", finding.kind, finding.evidence);
        self.findings.push(finding);
    }

    /// Appends a finding only when the verdict is positive. Returns whether
    /// one was added.
    pub fn record(&mut self, parameter: &str, kind: VulnerabilityKind, verdict: &Verdict) -> bool {
        match &verdict.evidence {
            Some(evidence) => {
                self.push(Finding::for_parameter(parameter, kind, evidence.clone()));
                true
            }
            None => false,
        }
    }

    pub fn record_form(&mut self, form: FormDescriptor) {
        self.push(Finding::for_form(form));
    }

    pub fn extend(&mut self, other: FindingLog) {
        self.findings.extend(other.findings);
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter()
    }

    pub fn for_parameter<'a>(&'a self, parameter: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings
            .iter()
            .filter(move |f| f.parameter.as_deref() == Some(parameter))
    }

    pub fn into_vec(self) -> Vec<Finding> {
        self.findings
    }
}
