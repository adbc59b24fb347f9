//! Rprobe - Parameter-Level Web Vulnerability Probing Engine
//!
//! Injects crafted payloads into request parameters and classifies the
//! responses to detect SQL injection (error-based, blind, out-of-band),
//! reflected cross-site scripting, HTML forms without anti-CSRF tokens and
//! the structure of a site's Content-Security-Policy.
//!
//! # Warning
//! This tool is designed for ethical penetration testing and security assessment
//! purposes only. Users are responsible for ensuring they have proper authorization
//! before probing any web application.

pub mod cli;
pub mod config;
pub mod csp;
pub mod csrf;
pub mod display;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod findings;
pub mod mutator;
pub mod oob;
pub mod payloads;
pub mod reporting;
pub mod sqli;
pub mod utils;
pub mod xss;

pub use error::{Result, ScanError};

/// Common types shared by the oracles, the engine and the reporters
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use std::fmt;

    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum Severity {
        Critical,
        High,
        Medium,
    }

    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    pub enum VulnerabilityKind {
        ClassicSqlInjection,
        BlindSqlInjection,
        OutOfBandSqlInjection,
        ReflectedXss,
        MissingCsrfToken,
    }

    impl VulnerabilityKind {
        pub const ALL: [VulnerabilityKind; 5] = [
            VulnerabilityKind::ClassicSqlInjection,
            VulnerabilityKind::BlindSqlInjection,
            VulnerabilityKind::OutOfBandSqlInjection,
            VulnerabilityKind::ReflectedXss,
            VulnerabilityKind::MissingCsrfToken,
        ];

        pub fn name(&self) -> &'static str {
            match self {
                VulnerabilityKind::ClassicSqlInjection => "Classic SQL Injection",
                VulnerabilityKind::BlindSqlInjection => "Blind SQL Injection (Inference)",
                VulnerabilityKind::OutOfBandSqlInjection => "Out-of-Band SQL Injection",
                VulnerabilityKind::ReflectedXss => "Reflected XSS",
                VulnerabilityKind::MissingCsrfToken => "Missing CSRF Token",
            }
        }

        pub fn severity(&self) -> Severity {
            match self {
                VulnerabilityKind::ClassicSqlInjection
                | VulnerabilityKind::OutOfBandSqlInjection => Severity::Critical,
                VulnerabilityKind::BlindSqlInjection => Severity::High,
                VulnerabilityKind::ReflectedXss => Severity::High,
                VulnerabilityKind::MissingCsrfToken => Severity::Medium,
            }
        }
    }

    impl fmt::Display for VulnerabilityKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.name())
        }
    }

    /// A `<form>` as seen by the CSRF oracle. Immutable once extracted.
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
    pub struct FormDescriptor {
        pub action: Option<String>,
        pub method: Option<String>,
        pub inputs: Vec<String>,
    }

    impl FormDescriptor {
        pub fn new(action: Option<&str>, method: Option<&str>, inputs: &[&str]) -> Self {
            Self {
                action: action.map(str::to_string),
                method: method.map(str::to_string),
                inputs: inputs.iter().map(|name| name.to_string()).collect(),
            }
        }

        /// Exact name equality, never a substring match.
        pub fn has_input(&self, name: &str) -> bool {
            self.inputs.iter().any(|input| input == name)
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
    pub enum Evidence {
        Payload(String),
        PayloadPair {
            true_payload: String,
            false_payload: String,
        },
        Form(FormDescriptor),
    }

    impl fmt::Display for Evidence {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Evidence::Payload(payload) => f.write_str(payload),
                Evidence::PayloadPair { true_payload, false_payload } => {
                    write!(f, "{} / {}", true_payload, false_payload)
                }
                Evidence::Form(form) => write!(
                    f,
                    "action={} method={}",
                    form.action.as_deref().unwrap_or("-"),
                    form.method.as_deref().unwrap_or("-")
                ),
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
    pub struct Finding {
        /// `None` for CSRF findings, whose evidence is the form itself.
        pub parameter: Option<String>,
        pub kind: VulnerabilityKind,
        pub evidence: Evidence,
    }

    impl Finding {
        pub fn for_parameter(parameter: &str, kind: VulnerabilityKind, evidence: Evidence) -> Self {
            Self {
                parameter: Some(parameter.to_string()),
                kind,
                evidence,
            }
        }

        pub fn for_form(form: FormDescriptor) -> Self {
            Self {
                parameter: None,
                kind: VulnerabilityKind::MissingCsrfToken,
                evidence: Evidence::Form(form),
            }
        }
    }

    /// Counts of outbound probes, so that "found nothing" can be told apart
    /// from "every probe failed".
    #[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
    pub struct ProbeTally {
        pub attempted: usize,
        pub succeeded: usize,
        pub failed: usize,
    }

    impl ProbeTally {
        pub fn record_success(&mut self) {
            self.attempted += 1;
            self.succeeded += 1;
        }

        pub fn record_failure(&mut self) {
            self.attempted += 1;
            self.failed += 1;
        }

        pub fn merge(&mut self, other: ProbeTally) {
            self.attempted += other.attempted;
            self.succeeded += other.succeeded;
            self.failed += other.failed;
        }

        pub fn all_failed(&self) -> bool {
            self.attempted > 0 && self.succeeded == 0
        }
    }

    /// Outcome of one oracle invocation for one (parameter, technique) pair.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Verdict {
        pub evidence: Option<Evidence>,
        pub tally: ProbeTally,
    }

    impl Verdict {
        pub fn positive(evidence: Evidence, tally: ProbeTally) -> Self {
            Self { evidence: Some(evidence), tally }
        }

        pub fn negative(tally: ProbeTally) -> Self {
            Self { evidence: None, tally }
        }

        pub fn is_positive(&self) -> bool {
            self.evidence.is_some()
        }
    }

    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum ScanType {
        SqlInjection,
        Xss,
        Csrf,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ScanReport {
        pub scan_id: String,
        pub target: String,
        pub scan_type: ScanType,
        pub findings: Vec<Finding>,
        pub probes: ProbeTally,
        pub started_at: DateTime<Utc>,
        pub completed_at: Option<DateTime<Utc>>,
    }

    impl ScanReport {
        pub fn count_of(&self, kind: VulnerabilityKind) -> usize {
            self.findings.iter().filter(|f| f.kind == kind).count()
        }
    }
}
