//! SQL injection oracles.
//!
//! Each oracle walks its payload list in order and stops at the first
//! positive verdict. A failed fetch is counted and skipped; it is never
//! read as "not vulnerable".

use crate::fetcher::Fetch;
use crate::mutator::mutate_url;
use crate::oob::{CollectorClient, OobSession};
use crate::payloads::find_sql_error;
use crate::types::{Evidence, ProbeTally, Verdict};
use log::{debug, info, log};
use url::Url;

/// Status the true-condition request must return for a blind hit.
pub const BLIND_TRUE_STATUS: u16 = 200;
/// Status the false-condition request must return for a blind hit.
pub const BLIND_FALSE_STATUS: u16 = 404;

/// Error-based detection: positive on the first payload whose response body
/// contains a known SQL error signature.
pub async fn detect_classic<P: AsRef<str>>(
    fetcher: &dyn Fetch,
    url: &Url,
    param: &str,
    payloads: &[P],
) -> Verdict {
    let mut tally = ProbeTally::default();

    for payload in payloads {
        let payload = payload.as_ref();
        let target = mutate_url(url, param, payload);

        match fetcher.fetch(target.as_str()).await {
            Ok(response) => {
                tally.record_success();
                if let Some(signature) = find_sql_error(&response.body) {
                    info!("Classic SQLi on '{}' with {:?} (matched {:?})", param, payload, signature);
                    return Verdict::positive(Evidence::Payload(payload.to_string()), tally);
                }
            }
            Err(e) => {
                tally.record_failure();
                log!(e.skip_level(), "Skipping classic payload {:?} on '{}': {}", payload, param, e);
            }
        }
    }

    Verdict::negative(tally)
}

/// Boolean/time-based detection over index-aligned true/false payload lists.
///
/// Each pair issues the true variant, then the false variant. A pair is
/// positive when the statuses are [`BLIND_TRUE_STATUS`] and
/// [`BLIND_FALSE_STATUS`]. If the true half fails the false half is not sent.
pub async fn detect_blind<P: AsRef<str>>(
    fetcher: &dyn Fetch,
    url: &Url,
    param: &str,
    true_payloads: &[P],
    false_payloads: &[P],
) -> Verdict {
    let mut tally = ProbeTally::default();

    for (true_payload, false_payload) in true_payloads.iter().zip(false_payloads) {
        let (true_payload, false_payload) = (true_payload.as_ref(), false_payload.as_ref());

        let true_status = match fetcher.fetch(mutate_url(url, param, true_payload).as_str()).await {
            Ok(response) => {
                tally.record_success();
                response.status
            }
            Err(e) => {
                tally.record_failure();
                log!(e.skip_level(), "Skipping blind pair {:?} on '{}': {}", true_payload, param, e);
                continue;
            }
        };

        let false_status = match fetcher.fetch(mutate_url(url, param, false_payload).as_str()).await {
            Ok(response) => {
                tally.record_success();
                response.status
            }
            Err(e) => {
                tally.record_failure();
                log!(e.skip_level(), "Skipping blind pair {:?} on '{}': {}", false_payload, param, e);
                continue;
            }
        };

        debug!("Blind pair on '{}': true={} false={}", param, true_status, false_status);

        if true_status == BLIND_TRUE_STATUS && false_status == BLIND_FALSE_STATUS {
            info!("Blind SQLi on '{}' with {:?} / {:?}", param, true_payload, false_payload);
            return Verdict::positive(
                Evidence::PayloadPair {
                    true_payload: true_payload.to_string(),
                    false_payload: false_payload.to_string(),
                },
                tally,
            );
        }
    }

    Verdict::negative(tally)
}

/// Channel-based detection: fire each payload at the target, ignore the
/// response, then ask the collector whether a callback arrived.
///
/// The tally counts target requests only; collector polls are not probes
/// of the target.
pub async fn detect_out_of_band<P: AsRef<str>>(
    fetcher: &dyn Fetch,
    collector: &CollectorClient<'_>,
    session: &OobSession,
    url: &Url,
    param: &str,
    payloads: &[P],
) -> Verdict {
    let mut tally = ProbeTally::default();

    for payload in payloads {
        let payload = payload.as_ref();
        let target = mutate_url(url, param, payload);

        if let Err(e) = fetcher.fetch(target.as_str()).await {
            tally.record_failure();
            log!(e.skip_level(), "Skipping out-of-band payload {:?} on '{}': {}", payload, param, e);
            continue;
        }
        tally.record_success();

        match collector.has_callbacks(session).await {
            Ok(true) => {
                info!("Out-of-band SQLi on '{}' confirmed by collector", param);
                return Verdict::positive(Evidence::Payload(payload.to_string()), tally);
            }
            Ok(false) => debug!("No callback yet for {:?} on '{}'", payload, param),
            Err(e) => log!(e.skip_level(), "Collector check failed for '{}': {}", param, e),
        }
    }

    Verdict::negative(tally)
}
