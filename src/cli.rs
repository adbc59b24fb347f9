use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rprobe")]
#[command(about = "Parameter-level web vulnerability probing engine")]
#[command(long_about = r#"
Rprobe injects crafted payloads into request parameters and classifies the
responses to detect SQL injection, reflected XSS, forms without anti-CSRF
tokens and the structure of a site's Content-Security-Policy.

WARNING: This tool should only be used on applications you own or have
explicit permission to test. Unauthorized testing may be illegal.

Usage Examples:
  rprobe -m csp https://example.com --report
  rprobe -m csrf https://example.com/login
  rprobe -m xss "https://example.com/search?q=test" --xss-params q
  rprobe -m sql "https://example.com/item?id=1" --sql-params id
  rprobe -m sql "https://example.com/item?id=1" --sql-params id \
         --bin-id abc123 --api-key KEY --domain probe
"#)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Scan module to run
    #[arg(short, long, value_enum)]
    pub module: Module,

    /// Target URL
    #[arg(value_name = "URL")]
    pub url: String,

    /// Write report files (always on for sql, xss and csrf findings)
    #[arg(long)]
    pub report: bool,

    /// Extra CSRF token field name to recognise
    #[arg(long, value_name = "NAME")]
    pub csrf_token_name: Option<String>,

    /// Comma-separated parameters for SQL injection testing (default: the URL's query parameters)
    #[arg(long, value_name = "PARAMS", value_delimiter = ',')]
    pub sql_params: Vec<String>,

    /// Collector bin id for out-of-band SQL injection
    #[arg(long, env = "RPROBE_BIN_ID")]
    pub bin_id: Option<String>,

    /// Collector API key for out-of-band SQL injection
    #[arg(long, env = "RPROBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Domain used to build the out-of-band callback host
    #[arg(long)]
    pub domain: Option<String>,

    /// Comma-separated parameters for XSS testing (default: the URL's query parameters)
    #[arg(long, value_name = "PARAMS", value_delimiter = ',')]
    pub xss_params: Vec<String>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Delay after every request in milliseconds
    #[arg(long)]
    pub delay: Option<u64>,

    /// Number of parameters probed concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Output directory for reports
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format (repeatable; default: every configured format)
    #[arg(long, value_enum)]
    pub format: Vec<ReportFormat>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Module {
    Csp,
    Csrf,
    Sql,
    Xss,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
    Html,
}

impl From<ReportFormat> for crate::config::OutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Json => crate::config::OutputFormat::Json,
            ReportFormat::Csv => crate::config::OutputFormat::Csv,
            ReportFormat::Html => crate::config::OutputFormat::Html,
        }
    }
}
