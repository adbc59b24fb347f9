use crate::config::{Config, OutputFormat};
use crate::csp::CspReport;
use crate::types::{Evidence, ScanReport, ScanType};
use crate::{Result, ScanError};
use log::{debug, info};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// One table row shared by the CSV and HTML writers.
#[derive(Debug, Clone)]
struct Row {
    columns: Vec<String>,
}

pub struct ReportGenerator {
    config: Config,
}

impl ReportGenerator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Writes the findings table in every configured format.
    pub async fn generate_report(&self, report: &ScanReport) -> Result<Vec<PathBuf>> {
        let (header, rows) = finding_table(report);
        let base = format!(
            "rprobe_{}_{}_{}",
            scan_label(report.scan_type),
            host_label(&report.target),
            report.started_at.format("%Y%m%d_%H%M%S")
        );
        self.write_all(&base, report, &header, &rows).await
    }

    pub async fn generate_csp_report(&self, report: &CspReport) -> Result<Vec<PathBuf>> {
        let header = vec!["Directive".to_string(), "Sources".to_string()];
        let rows: Vec<Row> = report
            .policy
            .iter()
            .flat_map(|policy| policy.directives.iter())
            .map(|directive| Row {
                columns: vec![directive.name.clone(), directive.sources.join(" ")],
            })
            .collect();

        let base = format!(
            "rprobe_csp_{}_{}",
            host_label(&report.target),
            crate::utils::time::now_utc().format("%Y%m%d_%H%M%S")
        );
        self.write_all(&base, report, &header, &rows).await
    }

    async fn write_all<T: Serialize>(
        &self,
        base_filename: &str,
        data: &T,
        header: &[String],
        rows: &[Row],
    ) -> Result<Vec<PathBuf>> {
        let output_dir = &self.config.reporting.output_dir;
        fs::create_dir_all(output_dir)
            .await
            .map_err(|e| ScanError::Reporting(format!("Failed to create output directory: {}", e)))?;

        let mut generated_files = Vec::new();

        for format in &self.config.reporting.formats {
            let path = match format {
                OutputFormat::Json => {
                    let path = output_dir.join(format!("{}.json", base_filename));
                    write_file(&path, serde_json::to_string_pretty(data)?.into_bytes()).await?;
                    path
                }
                OutputFormat::Csv => {
                    let path = output_dir.join(format!("{}.csv", base_filename));
                    write_file(&path, render_csv(header, rows)?).await?;
                    path
                }
                OutputFormat::Html => {
                    let path = output_dir.join(format!("{}.html", base_filename));
                    write_file(&path, render_html(base_filename, header, rows).into_bytes()).await?;
                    path
                }
            };
            generated_files.push(path);
        }

        info!("Generated {} report files", generated_files.len());
        Ok(generated_files)
    }
}

fn finding_table(report: &ScanReport) -> (Vec<String>, Vec<Row>) {
    match report.scan_type {
        ScanType::Csrf => {
            let rows = report
                .findings
                .iter()
                .filter_map(|finding| match &finding.evidence {
                    Evidence::Form(form) => Some(Row {
                        columns: vec![
                            form.action.clone().unwrap_or_default(),
                            form.method.clone().unwrap_or_default(),
                        ],
                    }),
                    _ => None,
                })
                .collect();
            (vec!["Form Action".to_string(), "Method".to_string()], rows)
        }
        _ => {
            let rows = report
                .findings
                .iter()
                .map(|finding| Row {
                    columns: vec![
                        finding.parameter.clone().unwrap_or_default(),
                        finding.kind.name().to_string(),
                        finding.evidence.to_string(),
                    ],
                })
                .collect();
            (
                vec!["Parameter".to_string(), "Vulnerability".to_string(), "Payload".to_string()],
                rows,
            )
        }
    }
}

fn render_csv(header: &[String], rows: &[Row]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row.columns)?;
    }
    writer
        .into_inner()
        .map_err(|e| ScanError::Reporting(format!("Failed to finish CSV report: {}", e)))
}

fn render_html(title: &str, header: &[String], rows: &[Row]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    html.push_str(
        "<style>table{border-collapse:collapse}th{background:#808080;color:#f5f5f5}\
         td{background:#f5f5dc}th,td{border:1px solid #000;padding:4px 12px;text-align:center}</style>\n",
    );
    html.push_str("</head>\n<body>\n<table>\n<tr>");
    for column in header {
        html.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    html.push_str("</tr>\n");
    for row in rows {
        html.push_str("<tr>");
        for column in &row.columns {
            html.push_str(&format!("<td>{}</td>", escape_html(column)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n</body>\n</html>\n");
    html
}

/// Payloads are hostile markup; they must never render as HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

async fn write_file(path: &Path, content: Vec<u8>) -> Result<()> {
    debug!("Writing report: {}", path.display());
    fs::write(path, content)
        .await
        .map_err(|e| ScanError::Reporting(format!("Failed to write {}: {}", path.display(), e)))
}

fn scan_label(scan_type: ScanType) -> &'static str {
    match scan_type {
        ScanType::SqlInjection => "sql",
        ScanType::Xss => "xss",
        ScanType::Csrf => "csrf",
    }
}

fn host_label(target: &str) -> String {
    let host = url::Url::parse(target)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "target".to_string());
    host.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}
