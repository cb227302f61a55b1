//! Connection-scoped type conversion configuration
//!
//! The configuration is fixed when a connection is opened and handed to the
//! type registry, which passes it to every handler call. It can be built in
//! code or parsed from the `Key=Value;...` options of a connection string:
//!
//! ```rust
//! use pg_typecodec::Config;
//!
//! let config: Config = "Host=db;ConvertInfinityDateTime=true".parse().unwrap();
//! assert!(config.convert_infinity_datetime);
//! ```

use std::str::FromStr;

use crate::error::{Error, Result};

/// Connection string key for [`Config::convert_infinity_datetime`]
pub const CONVERT_INFINITY_DATETIME: &str = "convertinfinitydatetime";

/// Type conversion settings for one connection.
///
/// # Examples
///
/// ```rust
/// use pg_typecodec::Config;
///
/// let config = Config::new().convert_infinity_datetime(true);
/// assert!(config.convert_infinity_datetime);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// Map `infinity`/`-infinity` to the maximum/minimum of the regular
    /// date/time types instead of failing, and map those extremes back to the
    /// infinity sentinels on write.
    pub convert_infinity_datetime: bool,
}

impl Config {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set infinity conversion
    pub fn convert_infinity_datetime(mut self, enabled: bool) -> Self {
        self.convert_infinity_datetime = enabled;
        self
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(Error::InvalidConfig(format!(
            "invalid boolean for {}: {}",
            key, value
        ))),
    }
}

impl FromStr for Config {
    type Err = Error;

    /// Parse the type conversion options out of a connection string
    ///
    /// Keys are case-insensitive and may contain spaces. Options that do not
    /// concern type conversion (host, port, credentials) are skipped.
    fn from_str(s: &str) -> Result<Self> {
        let mut config = Config::default();

        for part in s.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (key, value) = part.split_once('=').ok_or_else(|| {
                Error::InvalidConfig(format!("expected key=value, got: {}", part))
            })?;

            let normalized: String = key
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| c.to_ascii_lowercase())
                .collect();

            match normalized.as_str() {
                CONVERT_INFINITY_DATETIME => {
                    config.convert_infinity_datetime = parse_bool(key.trim(), value.trim())?;
                }
                _ => {
                    tracing::debug!(key = key.trim(), "Ignoring connection option");
                }
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_does_not_convert() {
        assert!(!Config::default().convert_infinity_datetime);
    }

    #[test]
    fn test_builder() {
        let config = Config::new().convert_infinity_datetime(true);
        assert!(config.convert_infinity_datetime);
    }

    #[test]
    fn test_parse_connection_string() {
        let config: Config = "Host=localhost;Port=5432;Convert Infinity DateTime = True"
            .parse()
            .unwrap();
        assert!(config.convert_infinity_datetime);
    }

    #[test]
    fn test_parse_false_and_empty_parts() {
        let config: Config = "ConvertInfinityDateTime=false;;".parse().unwrap();
        assert!(!config.convert_infinity_datetime);
    }

    #[test]
    fn test_parse_invalid_bool() {
        let err = "ConvertInfinityDateTime=maybe".parse::<Config>().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_parse_missing_equals() {
        assert!("Host".parse::<Config>().is_err());
    }
}
