use crate::csp::CspReport;
use crate::types::{Evidence, Finding, ProbeTally, ScanReport, Severity, VulnerabilityKind};
use colored::*;

/// Coloured terminal output for findings, forms and CSP policies
pub struct DisplayManager {
    use_colors: bool,
    quiet_mode: bool,
}

impl DisplayManager {
    pub fn new() -> Self {
        Self::with_quiet(false)
    }

    pub fn with_quiet(quiet: bool) -> Self {
        let use_colors = std::env::var("NO_COLOR").is_err() &&
                        std::env::var("TERM").map_or(true, |term| term != "dumb");

        Self {
            use_colors,
            quiet_mode: quiet,
        }
    }

    /// Print one finding: kind, parameter and the triggering payload
    pub fn print_finding(&self, finding: &Finding) {
        if self.quiet_mode { return; }

        let severity = finding.kind.severity();
        let location = match &finding.evidence {
            Evidence::Form(form) => format!(
                "form {} [{}]",
                form.action.as_deref().unwrap_or("(no action)"),
                form.method.as_deref().unwrap_or("GET")
            ),
            _ => format!("parameter {}", finding.parameter.as_deref().unwrap_or("-")),
        };

        if self.use_colors {
            println!("  {} {} {}",
                self.get_severity_icon(&severity).color(self.get_severity_color(&severity)),
                finding.kind.name().bright_white().bold(),
                format!("({})", location).bright_black()
            );
            match &finding.evidence {
                Evidence::Form(form) => {
                    println!("    └─ {}: {}", "Inputs".blue().bold(), form.inputs.join(", ").cyan());
                }
                evidence => {
                    println!("    └─ {}: {}", "Payload".blue().bold(), evidence.to_string().cyan());
                }
            }
        } else {
            println!("  [{}] {} ({})",
                format!("{:?}", severity).to_uppercase(),
                finding.kind.name(),
                location
            );
            match &finding.evidence {
                Evidence::Form(form) => println!("    Inputs: {}", form.inputs.join(", ")),
                evidence => println!("    Payload: {}", evidence),
            }
        }
    }

    /// Print per-kind counts and the probe tally of a finished scan
    pub fn print_scan_summary(&self, report: &ScanReport) {
        if self.quiet_mode { return; }

        println!();
        self.print_section_header("📊 SCAN RESULTS SUMMARY");
        self.print_probe_tally(&report.probes);

        if report.findings.is_empty() {
            if report.probes.all_failed() {
                self.print_warning("Every probe failed; the target could not be assessed");
            } else if self.use_colors {
                println!("  ✨ {}", "No vulnerabilities found!".bright_green().bold());
            } else {
                println!("No vulnerabilities found!");
            }
            return;
        }

        for kind in VulnerabilityKind::ALL {
            let count = report.count_of(kind);
            if count == 0 {
                continue;
            }
            if self.use_colors {
                let color = self.get_severity_color(&kind.severity());
                println!("  {} {:<34} {}",
                    self.get_severity_icon(&kind.severity()),
                    kind.name().color(color).bold(),
                    count.to_string().color(color).bold()
                );
            } else {
                println!("  {:<34} {}", kind.name(), count);
            }
        }
        println!();
    }

    fn print_probe_tally(&self, tally: &ProbeTally) {
        if self.use_colors {
            println!("  📡 {}: {} sent, {} answered, {} failed",
                "Probes".bright_white().bold(),
                tally.attempted.to_string().cyan().bold(),
                tally.succeeded.to_string().green(),
                tally.failed.to_string().red()
            );
        } else {
            println!("Probes: {} sent, {} answered, {} failed", tally.attempted, tally.succeeded, tally.failed);
        }
    }

    /// Print the directives of a CSP scan, or why there are none
    pub fn print_csp_report(&self, report: &CspReport) {
        if self.quiet_mode { return; }

        match (&report.header, &report.policy) {
            (Some(header), Some(policy)) => {
                self.print_info(&format!("CSP header: {}", header));
                if policy.is_empty() {
                    self.print_warning("Content-Security-Policy header is present but empty");
                }
                for directive in &policy.directives {
                    if self.use_colors {
                        println!("    {} {}: {}",
                            "→".bright_green(),
                            directive.name.yellow().bold(),
                            directive.sources.join(", ").cyan()
                        );
                    } else {
                        println!("    → {}: {}", directive.name, directive.sources.join(", "));
                    }
                }
            }
            _ if report.probes.all_failed() => {
                self.print_warning("Target could not be fetched; CSP unknown");
            }
            _ => self.print_warning("No Content-Security-Policy header found"),
        }
    }

    /// Print a clean section header
    pub fn print_section_header(&self, title: &str) {
        if self.quiet_mode { return; }

        if self.use_colors {
            println!("{}", title.bright_cyan().bold());
            println!("{}", "─".repeat(title.chars().count()).bright_cyan());
        } else {
            println!("{}", title);
            println!("{}", "=".repeat(title.len()));
        }
    }

    /// Print a clean success message
    pub fn print_success(&self, message: &str) {
        if self.quiet_mode { return; }

        if self.use_colors {
            println!("  {} {}", "✓".bright_green().bold(), message.green());
        } else {
            println!("[✓] {}", message);
        }
    }

    /// Print a clean warning message
    pub fn print_warning(&self, message: &str) {
        if self.quiet_mode { return; }

        if self.use_colors {
            println!("  {} {}", "!".bright_yellow().bold(), message.yellow());
        } else {
            println!("[!] {}", message);
        }
    }

    /// Print a clean error message
    pub fn print_error(&self, message: &str) {
        if self.use_colors {
            eprintln!("  {} {}", "✗".bright_red().bold(), message.red().bold());
        } else {
            eprintln!("[✗] {}", message);
        }
    }

    /// Print a clean info message
    pub fn print_info(&self, message: &str) {
        if self.quiet_mode { return; }

        if self.use_colors {
            println!("  {} {}", "i".bright_blue().bold(), message.blue());
        } else {
            println!("[i] {}", message);
        }
    }

    fn get_severity_icon(&self, severity: &Severity) -> &'static str {
        match severity {
            Severity::Critical => "🔥",
            Severity::High => "⚠️",
            Severity::Medium => "⚡",
        }
    }

    fn get_severity_color(&self, severity: &Severity) -> Color {
        match severity {
            Severity::Critical => Color::BrightRed,
            Severity::High => Color::Red,
            Severity::Medium => Color::Yellow,
        }
    }

    /// Print a clean banner with enhanced styling
    pub fn print_banner(&self, title: &str, subtitle: Option<&str>) {
        if self.quiet_mode { return; }

        let width = title.chars().count();
        if self.use_colors {
            println!();
            println!("  {}", "┌─".bright_cyan().to_string() + &"─".repeat(width + 2) + "─┐");
            println!("  {} {} {}",
                "│".bright_cyan(),
                title.bright_white().bold(),
                "│".bright_cyan()
            );
            if let Some(sub) = subtitle {
                println!("  {} {} {}",
                    "│".bright_cyan(),
                    format!("{:^width$}", sub, width = width).bright_black(),
                    "│".bright_cyan()
                );
            }
            println!("  {}", "└─".bright_cyan().to_string() + &"─".repeat(width + 2) + "─┘");
            println!();
        } else {
            let border = "=".repeat(width + 4);
            println!("\n{}", border);
            println!("  {}  ", title);
            if let Some(sub) = subtitle {
                println!("  {}  ", sub);
            }
            println!("{}\n", border);
        }
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}
