use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timeout occurred during {operation}")]
    Timeout { operation: String },

    #[error("Collector error: {0}")]
    ExternalService(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reporting error: {0}")]
    Reporting(String),
}

impl ScanError {
    /// Errors that mean "no evidence obtained" for a single probe.
    ///
    /// Oracles skip the current payload on these and move on; they never
    /// abort a scan.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ScanError::Network(_)
                | ScanError::Http(_)
                | ScanError::Timeout { .. }
                | ScanError::ExternalService(_)
        )
    }

    /// Level a skipped probe is logged at. Transport trouble is routine
    /// during a scan; anything else means the probe itself was malformed.
    pub fn skip_level(&self) -> log::Level {
        if self.is_network() {
            log::Level::Warn
        } else {
            log::Level::Error
        }
    }
}
