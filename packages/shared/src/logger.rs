//! Logging setup for the greenroom binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Both the greenroom crates and the binary itself log at `default_log_level`
/// unless `RUST_LOG` says otherwise.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "greenroom-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use greenroom_shared::logger::setup_logger;
///
/// setup_logger("greenroom-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the filter directive used when `RUST_LOG` is not set.
fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "greenroom_server={level},greenroom_shared={level},{bin}={level},tower_http={level}",
        level = default_log_level,
        bin = binary_name.replace('-', "_"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_all_crates() {
        // テスト項目: RUST_LOG 未設定時のフィルタに全クレートが含まれる
        // given (前提条件):
        let binary_name = "greenroom-server";

        // when (操作):
        let filter = default_filter(binary_name, "info");

        // then (期待する結果):
        assert!(filter.contains("greenroom_server=info"));
        assert!(filter.contains("greenroom_shared=info"));
        assert!(filter.contains("tower_http=info"));
    }
}
