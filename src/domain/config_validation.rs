//! Configuration validation.
//!
//! Checks every recognised key before any network or storage access.

use crate::domain::error::ScreenerError;
use crate::ports::config_port::ConfigPort;

pub const PROVIDER_KINDS: &[&str] = &["alphavantage", "csv"];
pub const STORE_KINDS: &[&str] = &["memory", "csv", "sqlite"];
pub const HISTORY_SIZES: &[&str] = &["compact", "full"];
pub const API_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    validate_provider(config)?;
    validate_watchlist_store(config)?;
    validate_screen_thresholds(config)?;
    validate_listen(config)?;
    Ok(())
}

pub fn provider_kind(config: &dyn ConfigPort) -> String {
    config
        .get_non_empty("provider", "kind")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "alphavantage".to_string())
}

pub fn store_kind(config: &dyn ConfigPort) -> String {
    config
        .get_non_empty("watchlist", "store")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "memory".to_string())
}

fn validate_provider(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let kind = provider_kind(config);
    one_of("provider", "kind", &kind, PROVIDER_KINDS)?;

    match kind.as_str() {
        "alphavantage" => {
            let from_env = std::env::var(API_KEY_ENV)
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false);
            if config.get_non_empty("provider", "api_key").is_none() && !from_env {
                return Err(ScreenerError::ConfigMissing {
                    section: "provider".to_string(),
                    key: "api_key".to_string(),
                });
            }
            if let Some(history) = config.get_non_empty("provider", "history") {
                one_of("provider", "history", &history.to_lowercase(), HISTORY_SIZES)?;
            }
            let timeout = parse_number::<i64>(config, "provider", "timeout_secs")?.unwrap_or(10);
            if !(1..=300).contains(&timeout) {
                return Err(invalid(
                    "provider",
                    "timeout_secs",
                    "timeout_secs must be between 1 and 300",
                ));
            }
            if let Some(url) = config.get_non_empty("provider", "base_url") {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(invalid(
                        "provider",
                        "base_url",
                        "base_url must start with http:// or https://",
                    ));
                }
            }
        }
        _ => {
            if config.get_non_empty("csv", "dir").is_none() {
                return Err(ScreenerError::ConfigMissing {
                    section: "csv".to_string(),
                    key: "dir".to_string(),
                });
            }
        }
    }
    Ok(())
}

fn validate_watchlist_store(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let kind = store_kind(config);
    one_of("watchlist", "store", &kind, STORE_KINDS)?;
    if kind != "memory" && config.get_non_empty("watchlist", "path").is_none() {
        return Err(ScreenerError::ConfigMissing {
            section: "watchlist".to_string(),
            key: "path".to_string(),
        });
    }
    Ok(())
}

fn validate_screen_thresholds(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let multiplier =
        parse_number::<f64>(config, "screen", "volume_multiplier")?.unwrap_or(1.5);
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(invalid(
            "screen",
            "volume_multiplier",
            "volume_multiplier must be positive",
        ));
    }
    let atr = parse_number::<f64>(config, "screen", "atr_threshold")?.unwrap_or(0.02);
    if !(0.0..1.0).contains(&atr) {
        return Err(invalid(
            "screen",
            "atr_threshold",
            "atr_threshold must be a fraction between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_listen(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    if let Some(listen) = config.get_non_empty("web", "listen") {
        if listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(invalid(
                "web",
                "listen",
                "listen must be an address such as 127.0.0.1:3000",
            ));
        }
    }
    Ok(())
}

/// An unset key is `None`; a value that does not parse is an error rather
/// than a silent fallback to the default.
fn parse_number<T: std::str::FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, ScreenerError> {
    match config.get_non_empty(section, key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            invalid(section, key, &format!("{key} must be a number, got {raw:?}"))
        }),
    }
}

fn one_of(section: &str, key: &str, value: &str, allowed: &[&str]) -> Result<(), ScreenerError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(invalid(
            section,
            key,
            &format!("expected one of {}, got {:?}", allowed.join(", "), value),
        ))
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> ScreenerError {
    ScreenerError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn csv_provider_with_memory_store_is_valid() {
        let c = config("[provider]\nkind = csv\n[csv]\ndir = data\n");
        assert!(validate_config(&c).is_ok());
    }

    #[test]
    fn alphavantage_with_key_is_valid() {
        let c = config("[provider]\nkind = alphavantage\napi_key = demo\nhistory = compact\n");
        assert!(validate_config(&c).is_ok());
    }

    #[test]
    fn unknown_provider_rejected() {
        let c = config("[provider]\nkind = bloomberg\n");
        assert!(matches!(
            validate_config(&c),
            Err(ScreenerError::ConfigInvalid { key, .. }) if key == "kind"
        ));
    }

    #[test]
    fn csv_provider_needs_dir() {
        let c = config("[provider]\nkind = csv\n");
        assert!(matches!(
            validate_config(&c),
            Err(ScreenerError::ConfigMissing { section, .. }) if section == "csv"
        ));
    }

    #[test]
    fn bad_history_rejected() {
        let c = config("[provider]\napi_key = demo\nhistory = weekly\n");
        assert!(validate_config(&c).is_err());
    }

    #[test]
    fn bad_base_url_rejected() {
        let c = config("[provider]\napi_key = demo\nbase_url = ftp://x\n");
        assert!(validate_config(&c).is_err());
    }

    #[test]
    fn file_store_needs_path() {
        let c = config("[provider]\nkind = csv\n[csv]\ndir = d\n[watchlist]\nstore = csv\n");
        assert!(matches!(
            validate_config(&c),
            Err(ScreenerError::ConfigMissing { key, .. }) if key == "path"
        ));
    }

    #[test]
    fn negative_multiplier_rejected() {
        let c = config("[provider]\nkind = csv\n[csv]\ndir = d\n[screen]\nvolume_multiplier = -1\n");
        assert!(validate_config(&c).is_err());
    }

    #[test]
    fn nan_multiplier_rejected() {
        let c = config("[provider]\nkind = csv\n[csv]\ndir = d\n[screen]\nvolume_multiplier = NaN\n");
        assert!(matches!(
            validate_config(&c),
            Err(ScreenerError::ConfigInvalid { key, .. }) if key == "volume_multiplier"
        ));
    }

    #[test]
    fn non_numeric_multiplier_rejected() {
        let c = config("[provider]\nkind = csv\n[csv]\ndir = d\n[screen]\nvolume_multiplier = abc\n");
        match validate_config(&c) {
            Err(ScreenerError::ConfigInvalid { key, reason, .. }) => {
                assert_eq!(key, "volume_multiplier");
                assert!(reason.contains("must be a number"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn non_numeric_atr_threshold_rejected() {
        let c = config("[provider]\nkind = csv\n[csv]\ndir = d\n[screen]\natr_threshold = 2%\n");
        assert!(matches!(
            validate_config(&c),
            Err(ScreenerError::ConfigInvalid { key, .. }) if key == "atr_threshold"
        ));
    }

    #[test]
    fn non_numeric_timeout_rejected() {
        let c = config("[provider]\napi_key = demo\ntimeout_secs = soon\n");
        assert!(matches!(
            validate_config(&c),
            Err(ScreenerError::ConfigInvalid { key, .. }) if key == "timeout_secs"
        ));
    }

    #[test]
    fn atr_threshold_must_be_fraction() {
        let c = config("[provider]\nkind = csv\n[csv]\ndir = d\n[screen]\natr_threshold = 2\n");
        assert!(validate_config(&c).is_err());
    }

    #[test]
    fn bad_listen_rejected() {
        let c = config("[provider]\nkind = csv\n[csv]\ndir = d\n[web]\nlisten = localhost\n");
        assert!(validate_config(&c).is_err());
    }
}
