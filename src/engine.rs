//! Scan drivers tying the fetcher, the oracles and the finding log together.
//!
//! Within one parameter every technique runs in order and every payload
//! loop stops at its first hit. Different parameters may be probed
//! concurrently up to `scan.concurrency`; findings still come out in
//! parameter order.

use crate::config::Config;
use crate::csp::{self, CspPolicy, CspReport};
use crate::csrf::{self, CsrfOracle};
use crate::fetcher::{Fetch, RateLimitedFetcher};
use crate::findings::FindingLog;
use crate::mutator::query_parameters;
use crate::oob::{CollectorClient, OobSession};
use crate::payloads::{self, PayloadSet};
use crate::types::{ProbeTally, ScanReport, ScanType, VulnerabilityKind};
use crate::utils::time::now_utc;
use crate::{sqli, xss, Result, ScanError};
use futures::stream::{self, StreamExt};
use log::{info, log, warn};
use std::sync::Arc;
use url::Url;

/// Result of a CSRF scan: the usual report plus how many forms the page had,
/// so "no forms" and "no vulnerable forms" can be told apart.
#[derive(Debug, Clone)]
pub struct CsrfScan {
    pub report: ScanReport,
    pub forms_found: usize,
}

pub struct ProbeEngine {
    config: Config,
    fetcher: Arc<dyn Fetch>,
    payloads: PayloadSet,
}

impl ProbeEngine {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = RateLimitedFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            config,
            fetcher,
            payloads: PayloadSet::default(),
        }
    }

    pub fn with_payloads(mut self, payloads: PayloadSet) -> Self {
        self.payloads = payloads;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn payloads(&self) -> &PayloadSet {
        &self.payloads
    }

    /// Classic, blind and (when a session is given) out-of-band SQL
    /// injection against each parameter.
    pub async fn scan_sql(
        &self,
        target: &str,
        params: &[String],
        session: Option<&OobSession>,
    ) -> Result<ScanReport> {
        let started_at = now_utc();
        let url = parse_target(target)?;
        let params = resolve_parameters(&url, params)?;

        info!("SQL injection scan of {} over {} parameters", url, params.len());
        if session.is_none() {
            info!("No out-of-band session; channel-based checks skipped");
        }

        let results: Vec<(FindingLog, ProbeTally)> = stream::iter(params.iter())
            .map(|param| self.probe_sql_parameter(&url, param, session))
            .buffered(self.config.concurrency())
            .collect()
            .await;

        Ok(self.assemble(target, ScanType::SqlInjection, results, started_at))
    }

    async fn probe_sql_parameter(
        &self,
        url: &Url,
        param: &str,
        session: Option<&OobSession>,
    ) -> (FindingLog, ProbeTally) {
        let fetcher = self.fetcher.as_ref();
        let mut log = FindingLog::new();
        let mut tally = ProbeTally::default();

        let classic = sqli::detect_classic(fetcher, url, param, &self.payloads.classic).await;
        tally.merge(classic.tally);
        log.record(param, VulnerabilityKind::ClassicSqlInjection, &classic);

        let blind = sqli::detect_blind(
            fetcher,
            url,
            param,
            &self.payloads.blind_true,
            &self.payloads.blind_false,
        )
        .await;
        tally.merge(blind.tally);
        log.record(param, VulnerabilityKind::BlindSqlInjection, &blind);

        if let Some(session) = session {
            let collector = CollectorClient::new(fetcher, &self.config.oob);
            let callback_host = session.callback_host(&self.config.oob.callback_suffix);
            let oob_payloads = payloads::out_of_band_sqli(&callback_host);

            let oob = sqli::detect_out_of_band(fetcher, &collector, session, url, param, &oob_payloads).await;
            tally.merge(oob.tally);
            log.record(param, VulnerabilityKind::OutOfBandSqlInjection, &oob);
        }

        (log, tally)
    }

    pub async fn scan_xss(&self, target: &str, params: &[String]) -> Result<ScanReport> {
        let started_at = now_utc();
        let url = parse_target(target)?;
        let params = resolve_parameters(&url, params)?;

        info!("Reflected XSS scan of {} over {} parameters", url, params.len());

        let results: Vec<(FindingLog, ProbeTally)> = stream::iter(params.iter())
            .map(|param| self.probe_xss_parameter(&url, param))
            .buffered(self.config.concurrency())
            .collect()
            .await;

        Ok(self.assemble(target, ScanType::Xss, results, started_at))
    }

    async fn probe_xss_parameter(&self, url: &Url, param: &str) -> (FindingLog, ProbeTally) {
        let mut log = FindingLog::new();
        let verdict = xss::detect_reflected(self.fetcher.as_ref(), url, param, &self.payloads.xss).await;
        log.record(param, VulnerabilityKind::ReflectedXss, &verdict);
        (log, verdict.tally)
    }

    /// Fetches the page once and flags every form lacking a recognised token.
    pub async fn scan_csrf(&self, target: &str, oracle: &CsrfOracle) -> Result<CsrfScan> {
        let started_at = now_utc();
        let url = parse_target(target)?;
        let mut tally = ProbeTally::default();
        let mut log = FindingLog::new();

        let forms = match self.fetcher.fetch(url.as_str()).await {
            Ok(response) => {
                tally.record_success();
                csrf::extract_forms(&response.body)
            }
            Err(e) => {
                tally.record_failure();
                log!(e.skip_level(), "Could not fetch {} for form analysis: {}", url, e);
                Vec::new()
            }
        };

        let forms_found = forms.len();
        for form in oracle.vulnerable_forms(&forms) {
            log.record_form(form);
        }

        info!("{} of {} forms on {} lack a CSRF token", log.len(), forms_found, url);

        Ok(CsrfScan {
            report: self.assemble(target, ScanType::Csrf, vec![(log, tally)], started_at),
            forms_found,
        })
    }

    pub async fn scan_csp(&self, target: &str) -> Result<CspReport> {
        let url = parse_target(target)?;
        let mut probes = ProbeTally::default();

        let header = match csp::fetch_csp_header(self.fetcher.as_ref(), url.as_str()).await {
            Ok(header) => {
                probes.record_success();
                header
            }
            Err(e) => {
                probes.record_failure();
                log!(e.skip_level(), "Could not fetch {} for CSP analysis: {}", url, e);
                None
            }
        };

        let policy = header.as_deref().map(CspPolicy::parse);

        Ok(CspReport {
            target: target.to_string(),
            header,
            policy,
            probes,
        })
    }

    fn assemble(
        &self,
        target: &str,
        scan_type: ScanType,
        results: Vec<(FindingLog, ProbeTally)>,
        started_at: chrono::DateTime<chrono::Utc>,
    ) -> ScanReport {
        let mut findings = FindingLog::new();
        let mut probes = ProbeTally::default();

        for (log, tally) in results {
            findings.extend(log);
            probes.merge(tally);
        }

        if probes.all_failed() {
            warn!("Every probe against {} failed; results are inconclusive", target);
        }

        ScanReport {
            scan_id: uuid::Uuid::new_v4().to_string(),
            target: target.to_string(),
            scan_type,
            findings: findings.into_vec(),
            probes,
            started_at,
            completed_at: Some(now_utc()),
        }
    }
}

fn parse_target(target: &str) -> Result<Url> {
    let url = Url::parse(target.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ScanError::InvalidInput(format!("Unsupported scheme '{}' in {}", other, target))),
    }
}

/// Trimmed, non-empty parameter names; the target's own query parameters
/// when none are given.
fn resolve_parameters(url: &Url, params: &[String]) -> Result<Vec<String>> {
    let mut resolved: Vec<String> = params
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    if resolved.is_empty() {
        resolved = query_parameters(url);
    }

    if resolved.is_empty() {
        return Err(ScanError::InvalidInput(format!("No parameters to test on {}", url)));
    }

    Ok(resolved)
}
