//! Out-of-band confirmation channel.
//!
//! Out-of-band payloads make the target's database reach out to a host the
//! tester controls. The collector service behind that host records every
//! callback; polling its request log tells us whether a payload fired.

use crate::config::OobConfig;
use crate::fetcher::Fetch;
use crate::{Result, ScanError};
use log::debug;
use serde::{Deserialize, Serialize};

/// Credentials and callback domain for one out-of-band scan. Read-only
/// once the scan starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OobSession {
    pub bin_id: String,
    pub api_key: String,
    pub domain: String,
}

impl OobSession {
    pub fn new(bin_id: &str, api_key: &str, domain: &str) -> Result<Self> {
        for (field, value) in [("bin id", bin_id), ("api key", api_key), ("domain", domain)] {
            if value.trim().is_empty() {
                return Err(ScanError::InvalidInput(format!("Out-of-band {} must not be empty", field)));
            }
        }

        Ok(Self {
            bin_id: bin_id.trim().to_string(),
            api_key: api_key.trim().to_string(),
            domain: domain.trim().trim_end_matches('.').to_string(),
        })
    }

    pub fn callback_host(&self, suffix: &str) -> String {
        let suffix = suffix.trim_matches('.');
        if suffix.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.domain, suffix)
        }
    }
}

pub struct CollectorClient<'a> {
    fetcher: &'a dyn Fetch,
    base_url: String,
}

impl<'a> CollectorClient<'a> {
    pub fn new(fetcher: &'a dyn Fetch, config: &OobConfig) -> Self {
        Self {
            fetcher,
            base_url: config.collector_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn requests_url(&self, session: &OobSession) -> String {
        format!("{}/v1/bins/{}/requests", self.base_url, session.bin_id)
    }

    /// Polls the bin's request log. `Ok(true)` when at least one callback
    /// has been recorded.
    ///
    /// A non-200 status or a body that is not a JSON array is an
    /// [`ScanError::ExternalService`] error.
    pub async fn has_callbacks(&self, session: &OobSession) -> Result<bool> {
        let url = self.requests_url(session);
        let response = self
            .fetcher
            .fetch_with_headers(&url, &[("X-Master-Key", session.api_key.as_str())])
            .await?;

        if response.status != 200 {
            return Err(ScanError::ExternalService(format!(
                "collector returned status {}",
                response.status
            )));
        }

        let entries: Vec<serde_json::Value> = serde_json::from_str(&response.body)
            .map_err(|e| ScanError::ExternalService(format!("unexpected collector body: {}", e)))?;

        debug!("Collector bin {} holds {} requests", session.bin_id, entries.len());
        Ok(!entries.is_empty())
    }
}
