use crate::fetcher::Fetch;
use crate::mutator::mutate_url;
use crate::types::{Evidence, ProbeTally, Verdict};
use log::{info, log};
use url::Url;

/// Reflected XSS: positive on the first payload that comes back verbatim
/// in the response body. No HTML context analysis.
pub async fn detect_reflected<P: AsRef<str>>(
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
                if is_reflected(&response.body, payload) {
                    info!("Reflected XSS on '{}' with {:?}", param, payload);
                    return Verdict::positive(Evidence::Payload(payload.to_string()), tally);
                }
            }
            Err(e) => {
                tally.record_failure();
                log!(e.skip_level(), "Skipping XSS payload {:?} on '{}': {}", payload, param, e);
            }
        }
    }

    Verdict::negative(tally)
}

pub fn is_reflected(body: &str, payload: &str) -> bool {
    !payload.is_empty() && body.contains(payload)
}
