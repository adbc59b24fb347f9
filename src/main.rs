use clap::Parser;
use env_logger::Env;
use rprobe::{
    cli::{Cli, Module},
    config::Config,
    csrf::CsrfOracle,
    display::DisplayManager,
    engine::ProbeEngine,
    oob::OobSession,
    payloads::PayloadSet,
    reporting::ReportGenerator,
    types::ScanReport,
    Result,
};
use std::process;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_secs()
        .init();

    let display = DisplayManager::with_quiet(cli.quiet);

    if !cli.quiet {
        display.print_banner(
            "🔒 RPROBE - Web Vulnerability Prober",
            Some("Authorized Testing Only")
        );
        display.print_warning("Ensure you have proper permission before probing any application.");
        println!();
    }

    let mut config = if let Some(config_path) = &cli.config {
        match Config::load_from_file(&config_path.to_string_lossy()) {
            Ok(config) => {
                display.print_success(&format!("Loaded configuration from {}", config_path.display()));
                config
            },
            Err(e) => {
                display.print_warning(&format!("Failed to load configuration: {}, using defaults", e));
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    // Apply CLI overrides to config
    if let Some(timeout) = cli.timeout {
        config.scan.request_timeout = timeout;
    }
    if let Some(delay) = cli.delay {
        config.scan.rate_limit_delay = delay;
    }
    if let Some(concurrency) = cli.concurrency {
        config.scan.concurrency = concurrency;
    }
    if let Some(output) = &cli.output {
        config.reporting.output_dir = output.clone();
    }
    if !cli.format.is_empty() {
        config.reporting.formats = cli.format.iter().map(|f| (*f).into()).collect();
    }

    let start_time = Instant::now();

    let result = match cli.module {
        Module::Csp => execute_csp_scan(&config, &display, &cli).await,
        Module::Csrf => execute_csrf_scan(&config, &display, &cli).await,
        Module::Sql => execute_sql_scan(&config, &display, &cli).await,
        Module::Xss => execute_xss_scan(&config, &display, &cli).await,
    };

    match result {
        Ok(_) => {
            display.print_success(&format!(
                "Scan completed in {}",
                rprobe::utils::time::format_duration(start_time.elapsed())
            ));
        }
        Err(e) => {
            display.print_error(&format!("Scan failed: {}", e));
            process::exit(1);
        }
    }
}

async fn build_engine(config: &Config) -> Result<ProbeEngine> {
    let payloads = PayloadSet::from_config(config).await?;
    Ok(ProbeEngine::new(config.clone())?.with_payloads(payloads))
}

async fn execute_csp_scan(config: &Config, display: &DisplayManager, cli: &Cli) -> Result<()> {
    display.print_section_header("🛡️  CONTENT SECURITY POLICY");

    let engine = build_engine(config).await?;
    let report = engine.scan_csp(&cli.url).await?;
    display.print_csp_report(&report);

    if cli.report && report.policy.is_some() {
        let files = ReportGenerator::new(config.clone()).generate_csp_report(&report).await?;
        print_report_files(display, &files);
    }

    Ok(())
}

async fn execute_csrf_scan(config: &Config, display: &DisplayManager, cli: &Cli) -> Result<()> {
    display.print_section_header("📝 CSRF FORM ANALYSIS");

    let mut oracle = CsrfOracle::default();
    if let Some(token_name) = &cli.csrf_token_name {
        oracle = oracle.with_extra_token(token_name);
    }

    let engine = build_engine(config).await?;
    let scan = engine.scan_csrf(&cli.url, &oracle).await?;

    if scan.forms_found == 0 {
        if scan.report.probes.all_failed() {
            display.print_warning(&format!("Could not fetch {}", cli.url));
        } else {
            display.print_info(&format!("No forms found on {}", cli.url));
        }
        return Ok(());
    }

    if scan.report.findings.is_empty() {
        display.print_success(&format!("All {} forms on {} carry a CSRF token", scan.forms_found, cli.url));
        return Ok(());
    }

    display.print_warning(&format!("Vulnerable forms found on {}:", cli.url));
    finish_scan(config, display, &scan.report).await
}

async fn execute_sql_scan(config: &Config, display: &DisplayManager, cli: &Cli) -> Result<()> {
    display.print_section_header("💉 SQL INJECTION");

    let session = match (&cli.bin_id, &cli.api_key, &cli.domain) {
        (Some(bin_id), Some(api_key), Some(domain)) => Some(OobSession::new(bin_id, api_key, domain)?),
        (None, None, None) => {
            display.print_info("No collector credentials given; out-of-band checks disabled");
            None
        }
        _ => {
            display.print_warning("Out-of-band checks need --bin-id, --api-key and --domain; skipping them");
            None
        }
    };

    let engine = build_engine(config).await?;
    let payloads = engine.payloads();
    let per_parameter = payloads.classic.len()
        + 2 * payloads.blind_true.len().min(payloads.blind_false.len())
        + if session.is_some() { 2 * rprobe::payloads::out_of_band_sqli("").len() } else { 0 };
    print_estimate(config, display, planned_parameters(&cli.url, &cli.sql_params) * per_parameter);

    let spinner = (!cli.quiet).then(|| rprobe::utils::progress::create_spinner("Probing parameters..."));
    let report = engine.scan_sql(&cli.url, &cli.sql_params, session.as_ref()).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    finish_scan(config, display, &report?).await
}

async fn execute_xss_scan(config: &Config, display: &DisplayManager, cli: &Cli) -> Result<()> {
    display.print_section_header("🧪 REFLECTED XSS");

    let engine = build_engine(config).await?;
    print_estimate(config, display, planned_parameters(&cli.url, &cli.xss_params) * engine.payloads().xss.len());

    let spinner = (!cli.quiet).then(|| rprobe::utils::progress::create_spinner("Probing parameters..."));
    let report = engine.scan_xss(&cli.url, &cli.xss_params).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    finish_scan(config, display, &report?).await
}

async fn finish_scan(config: &Config, display: &DisplayManager, report: &ScanReport) -> Result<()> {
    for finding in &report.findings {
        display.print_finding(finding);
    }
    display.print_scan_summary(report);

    if !report.findings.is_empty() {
        let files = ReportGenerator::new(config.clone()).generate_report(report).await?;
        print_report_files(display, &files);
    }

    Ok(())
}

/// Parameters the engine will probe: the given list, else the URL's query.
fn planned_parameters(target: &str, params: &[String]) -> usize {
    let given = params.iter().filter(|p| !p.trim().is_empty()).count();
    if given > 0 {
        return given;
    }
    url::Url::parse(target)
        .map(|url| rprobe::mutator::query_parameters(&url).len())
        .unwrap_or(0)
}

fn print_estimate(config: &Config, display: &DisplayManager, requests: usize) {
    if requests == 0 {
        return;
    }
    let delay = config.rate_limit_delay();
    let estimate = rprobe::utils::time::estimate_scan_duration(requests, delay, config.concurrency());
    display.print_info(&format!(
        "Up to {} requests at {}ms spacing, about {}",
        requests,
        delay.as_millis(),
        rprobe::utils::time::format_duration(estimate)
    ));
}

fn print_report_files(display: &DisplayManager, files: &[std::path::PathBuf]) {
    for file in files {
        display.print_success(&format!("Report written: {}", file.display()));
    }
}
