//! Utility functions for the bot population manager

use chrono::{DateTime, Utc};

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Render a duration in milliseconds with two decimals, for log lines
pub fn format_millis(duration: std::time::Duration) -> String {
    format!("{:.2}ms", duration.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_timestamps_advance() {
        let first = current_timestamp();
        let second = current_timestamp();
        assert!(second >= first);
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(Duration::from_micros(1500)), "1.50ms");
        assert_eq!(format_millis(Duration::ZERO), "0.00ms");
    }
}
