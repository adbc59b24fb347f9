//! Content-Security-Policy retrieval and structural parsing.
//!
//! The parser reports what a policy declares; it does not judge it.

use crate::fetcher::Fetch;
use crate::types::ProbeTally;
use crate::Result;
use serde::{Deserialize, Serialize};

pub const CSP_HEADER: &str = "Content-Security-Policy";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CspDirective {
    pub name: String,
    pub sources: Vec<String>,
}

/// Directives in header declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CspPolicy {
    pub directives: Vec<CspDirective>,
}

impl CspPolicy {
    /// `directive source source ...; directive source ...`
    ///
    /// Tokens are whitespace-separated and empty clauses (a trailing `;`,
    /// `;;`) are discarded. Directive names keep their original case.
    pub fn parse(header: &str) -> Self {
        let directives = header
            .split(';')
            .filter_map(|clause| {
                let mut tokens = clause.split_whitespace();
                let name = tokens.next()?;
                Some(CspDirective {
                    name: name.to_string(),
                    sources: tokens.map(str::to_string).collect(),
                })
            })
            .collect();

        Self { directives }
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// First directive with this name, compared case-insensitively.
    pub fn directive(&self, name: &str) -> Option<&CspDirective> {
        self.directives
            .iter()
            .find(|directive| directive.name.eq_ignore_ascii_case(name))
    }

    pub fn to_pairs(&self) -> Vec<(String, Vec<String>)> {
        self.directives
            .iter()
            .map(|directive| (directive.name.clone(), directive.sources.clone()))
            .collect()
    }
}

/// Outcome of a CSP scan. `header` is `None` when the response carried no
/// policy at all, which is different from an empty policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CspReport {
    pub target: String,
    pub header: Option<String>,
    pub policy: Option<CspPolicy>,
    pub probes: ProbeTally,
}

/// Fetches `url` once and returns the raw policy header, if any.
pub async fn fetch_csp_header(fetcher: &dyn Fetch, url: &str) -> Result<Option<String>> {
    let response = fetcher.fetch(url).await?;
    Ok(response.header(CSP_HEADER))
}
