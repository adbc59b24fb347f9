use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Every section, and every field inside one, falls back to its default
/// when missing from the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub http: HttpConfig,
    pub oob: OobConfig,
    pub payloads: PayloadConfig,
    pub reporting: ReportingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub request_timeout: u64, // seconds
    pub rate_limit_delay: u64, // milliseconds
    pub concurrency: usize, // parameters probed at once
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub verify_ssl: bool,
    pub custom_headers: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OobConfig {
    /// Base URL of the request collector, without a trailing slash.
    pub collector_url: String,
    /// Appended to the scan domain to build the callback host.
    pub callback_suffix: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadConfig {
    pub sqli_classic: Option<PathBuf>,
    pub xss: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    pub output_dir: PathBuf,
    pub formats: Vec<OutputFormat>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Html,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            request_timeout: 10,
            rate_limit_delay: 3000,
            concurrency: 1,
            user_agent: "Rprobe/0.1".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            max_redirects: 5,
            verify_ssl: false,
            custom_headers: HashMap::new(),
        }
    }
}

impl Default for OobConfig {
    fn default() -> Self {
        Self {
            collector_url: "https://api.requestbin.com".to_string(),
            callback_suffix: "example.com".to_string(),
        }
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./reports"),
            formats: vec![OutputFormat::Json, OutputFormat::Csv, OutputFormat::Html],
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> crate::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn save_to_file(&self, path: &str) -> crate::Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| crate::ScanError::InvalidInput(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.scan.request_timeout)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.scan.rate_limit_delay)
    }

    /// Never zero; a zero in the file means "sequential".
    pub fn concurrency(&self) -> usize {
        self.scan.concurrency.max(1)
    }
}
