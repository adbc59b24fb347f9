/// Progress reporting utilities
pub mod progress {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Duration;

    pub fn create_spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();

        let style = ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        pb.set_style(style);

        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

/// Time and formatting utilities
pub mod time {
    use chrono::{DateTime, Utc};
    use std::time::Duration;

    pub fn now_utc() -> DateTime<Utc> {
        Utc::now()
    }

    /// Format duration as human readable string
    pub fn format_duration(duration: Duration) -> String {
        let secs = duration.as_secs();
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        let seconds = secs % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Rough wall-clock cost of `requests` probes at a fixed delay each,
    /// spread over `workers` concurrent parameter streams.
    pub fn estimate_scan_duration(requests: usize, delay: Duration, workers: usize) -> Duration {
        let total = delay.saturating_mul(u32::try_from(requests).unwrap_or(u32::MAX));
        total / u32::try_from(workers.max(1)).unwrap_or(u32::MAX)
    }
}
