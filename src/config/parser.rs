//! Configuration file parser
//!
//! Same grammar as a Redis configuration file: one `parameter value` pair
//! per line, `#` comments and blank lines ignored.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use super::Config;

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigParseError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Invalid line format
    #[error("Invalid line format at line {0}: {1}")]
    Format(usize, String),

    /// Invalid parameter value
    #[error("Invalid value for parameter '{0}' at line {1}: {2}")]
    Value(String, usize, String),

    /// Unknown parameter
    #[error("Unknown parameter '{0}' at line {1}")]
    UnknownParam(String, usize),

    /// Malformed connection URL
    #[error("Invalid URL: {0}")]
    Url(String),
}

/// Parse a configuration file
pub fn parse_config_file(path: &Path) -> Result<Config, ConfigParseError> {
    let file = File::open(path)?;
    parse_lines(BufReader::new(file).lines())
}

/// Parse configuration text
pub fn parse_config_str(text: &str) -> Result<Config, ConfigParseError> {
    parse_lines(text.lines().map(|line| Ok(line.to_string())))
}

fn parse_lines<I>(lines: I) -> Result<Config, ConfigParseError>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut config = Config::default();

    for (line_num, line_result) in lines.enumerate() {
        let line = line_result?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.splitn(2, char::is_whitespace).collect();
        if parts.len() != 2 {
            return Err(ConfigParseError::Format(line_num + 1, line.to_string()));
        }

        let param = parts[0].trim().to_lowercase();
        let value = parts[1].trim().trim_matches('"');

        apply_config_param(&mut config, &param, value, line_num + 1)?;
    }

    Ok(config)
}

/// Apply a configuration parameter to the config
fn apply_config_param(
    config: &mut Config,
    param: &str,
    value: &str,
    line_num: usize,
) -> Result<(), ConfigParseError> {
    match param {
        "host" | "bind" => {
            config.host = value.to_string();
        }
        "port" => {
            config.port = parse_value(param, value, line_num)?;
        }
        "db" | "database" => {
            config.db = parse_value(param, value, line_num)?;
        }
        "requirepass" | "password" => {
            config.password = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        }
        "connect-timeout" => {
            config.connect_timeout = Duration::from_millis(parse_value(param, value, line_num)?);
        }
        "timeout" => {
            config.io_timeout = Duration::from_millis(parse_value(param, value, line_num)?);
        }
        "temp-key-prefix" => {
            if value.is_empty() {
                return Err(ConfigParseError::Value(
                    param.to_string(),
                    line_num,
                    "prefix must not be empty".to_string(),
                ));
            }
            config.temp_key_prefix = value.to_string();
        }
        _ => return Err(ConfigParseError::UnknownParam(param.to_string(), line_num)),
    }

    Ok(())
}

fn parse_value<T: std::str::FromStr>(
    param: &str,
    value: &str,
    line_num: usize,
) -> Result<T, ConfigParseError> {
    value.parse::<T>().map_err(|_| {
        ConfigParseError::Value(param.to_string(), line_num, value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_config_text() {
        let config = parse_config_str(
            "# collections client\n\
             host 10.0.0.5\n\
             port 6380\n\
             db 2\n\
             \n\
             requirepass \"s3cret\"\n\
             timeout 250\n\
             temp-key-prefix __scratch__\n",
        )
        .unwrap();

        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 6380);
        assert_eq!(config.db, 2);
        assert_eq!(config.password.as_deref(), Some("s3cret"));
        assert_eq!(config.io_timeout, Duration::from_millis(250));
        assert_eq!(config.temp_key_prefix, "__scratch__");
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let err = parse_config_str("port 1\nbogus yes\n").unwrap_err();
        assert!(matches!(err, ConfigParseError::UnknownParam(ref p, 2) if p == "bogus"));

        let err = parse_config_str("port nope\n").unwrap_err();
        assert!(matches!(err, ConfigParseError::Value(_, 1, _)));

        let err = parse_config_str("port\n").unwrap_err();
        assert!(matches!(err, ConfigParseError::Format(1, _)));
    }

    #[test]
    fn test_parse_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port 7000").unwrap();
        writeln!(file, "connect-timeout 100").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.port, 7000);
        assert_eq!(config.connect_timeout, Duration::from_millis(100));
    }
}
