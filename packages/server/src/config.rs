//! Command line configuration.

use clap::{Parser, builder::TypedValueParser};

use crate::domain::DEFAULT_MAX_VIEWERS;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "greenroom-server")]
#[command(about = "Signaling relay for host/viewer streaming rooms", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = 8080)]
    pub port: u16,

    /// Maximum number of viewers per room
    #[arg(long, default_value_t = DEFAULT_MAX_VIEWERS, value_parser = clap::value_parser!(u64).range(1..).map(|n| n as usize))]
    pub max_viewers: usize,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_viewers: DEFAULT_MAX_VIEWERS,
            log_level: "debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // テスト項目: 引数なしではデフォルト値になる
        // given (前提条件):
        let args = ["greenroom-server"];

        // when (操作):
        let config = ServerConfig::try_parse_from(args).unwrap();

        // then (期待する結果):
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        // テスト項目: 各フラグでデフォルト値を上書きできる
        // given (前提条件):
        let args = [
            "greenroom-server",
            "-H",
            "0.0.0.0",
            "-p",
            "3000",
            "--max-viewers",
            "4",
            "--log-level",
            "info",
        ];

        // when (操作):
        let config = ServerConfig::try_parse_from(args).unwrap();

        // then (期待する結果):
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_viewers, 4);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        // テスト項目: 視聴者数の上限 0 は受け付けない
        // given (前提条件):
        let args = ["greenroom-server", "--max-viewers", "0"];

        // when (操作):
        let result = ServerConfig::try_parse_from(args);

        // then (期待する結果):
        assert!(result.is_err());
    }
}
