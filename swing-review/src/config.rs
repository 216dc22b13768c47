//! Configuration for the swing-review runtime.
//!
//! Every tunable has a compile-time default and can be overridden through a
//! dedicated environment variable. Command-line flags take precedence over
//! both.

use std::path::PathBuf;
use std::time::Duration;

/// Default base URL of the game service.
const DEFAULT_GATEWAY_URL: &str = "http://localhost:8000";

/// Default directory for daily-rolling log files.
const DEFAULT_LOG_DIR: &str = "logs";

/// Default request timeout for the game service (in seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Get the base URL of the game service.
///
/// Priority:
/// 1. `SWING_REVIEW_GATEWAY_URL` env variable if set
/// 2. `http://localhost:8000` as fallback
pub fn get_gateway_url() -> String {
    if let Ok(url) = std::env::var("SWING_REVIEW_GATEWAY_URL") {
        return url;
    }

    DEFAULT_GATEWAY_URL.to_string()
}

/// Get the directory holding the session cache files.
///
/// Priority:
/// 1. `SWING_REVIEW_CACHE_DIR` env variable if set
/// 2. `~/.swing-review/cache` as fallback
pub fn get_cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SWING_REVIEW_CACHE_DIR") {
        return PathBuf::from(dir);
    }

    default_cache_dir()
}

fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".swing-review")
        .join("cache")
}

/// Get the directory for log files.
///
/// Priority:
/// 1. `SWING_REVIEW_LOG_DIR` env variable if set
/// 2. `logs` (relative to the working directory) as fallback
pub fn get_log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SWING_REVIEW_LOG_DIR") {
        return PathBuf::from(dir);
    }

    PathBuf::from(DEFAULT_LOG_DIR)
}

/// Get the materiality threshold for notable swing points.
///
/// Priority:
/// 1. `SWING_REVIEW_SWING_THRESHOLD` env variable if set (falls back to the
///    default if it is not a finite, non-negative number)
/// 2. `1.0` as fallback
pub fn get_swing_threshold() -> f64 {
    if let Ok(value) = std::env::var("SWING_REVIEW_SWING_THRESHOLD") {
        return parse_threshold(&value).unwrap_or(review::DEFAULT_SWING_THRESHOLD);
    }

    review::DEFAULT_SWING_THRESHOLD
}

fn parse_threshold(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite() && *t >= 0.0)
}

/// Get the game service request timeout.
///
/// Priority:
/// 1. `SWING_REVIEW_TIMEOUT_SECS` env variable if set (falls back to default
///    if the value cannot be parsed as a `u64`)
/// 2. `30` seconds as fallback
pub fn get_timeout() -> Duration {
    if let Ok(timeout) = std::env::var("SWING_REVIEW_TIMEOUT_SECS") {
        return Duration::from_secs(timeout.parse().unwrap_or(DEFAULT_TIMEOUT_SECS));
    }

    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_gateway_url() {
        let url = get_gateway_url();
        match std::env::var("SWING_REVIEW_GATEWAY_URL") {
            Ok(val) => assert_eq!(url, val),
            Err(_) => assert_eq!(url, DEFAULT_GATEWAY_URL),
        }
    }

    #[test]
    fn test_get_cache_dir() {
        let dir = get_cache_dir();
        match std::env::var("SWING_REVIEW_CACHE_DIR") {
            Ok(val) => assert_eq!(dir, PathBuf::from(val)),
            Err(_) => assert!(dir.ends_with(".swing-review/cache")),
        }
    }

    #[test]
    fn test_get_log_dir() {
        let dir = get_log_dir();
        match std::env::var("SWING_REVIEW_LOG_DIR") {
            Ok(val) => assert_eq!(dir, PathBuf::from(val)),
            Err(_) => assert_eq!(dir, PathBuf::from(DEFAULT_LOG_DIR)),
        }
    }

    #[test]
    fn test_get_timeout_default() {
        if std::env::var("SWING_REVIEW_TIMEOUT_SECS").is_err() {
            assert_eq!(get_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        }
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("1.5"), Some(1.5));
        assert_eq!(parse_threshold(" 0 "), Some(0.0));
        assert_eq!(parse_threshold("-1"), None);
        assert_eq!(parse_threshold("NaN"), None);
        assert_eq!(parse_threshold("lots"), None);
    }

    #[test]
    fn test_get_swing_threshold_default() {
        if std::env::var("SWING_REVIEW_SWING_THRESHOLD").is_err() {
            assert_eq!(get_swing_threshold(), review::DEFAULT_SWING_THRESHOLD);
        }
    }
}
