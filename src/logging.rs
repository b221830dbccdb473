//! Logging setup
//!
//! Logs go to stderr so `--print-once` output on stdout stays clean.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Map CLI level spellings onto tracing directives
fn normalize_level(level: &str) -> &'static str {
    match level.to_ascii_lowercase().as_str() {
        "trace" | "verbose" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" | "critical" => "error",
        _ => "info",
    }
}

/// Filter directive used when `RUST_LOG` is not set
fn default_directive(verbose: bool, level: Option<&str>) -> &'static str {
    match level {
        Some(level) => normalize_level(level),
        None if verbose => "debug",
        None => "info",
    }
}

/// Install the global subscriber
pub fn init(verbose: bool, json: bool, level: Option<&str>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, level)));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_precedence() {
        assert_eq!(default_directive(false, None), "info");
        assert_eq!(default_directive(true, None), "debug");
        assert_eq!(default_directive(true, Some("error")), "error");
        assert_eq!(default_directive(false, Some("Warning")), "warn");
        assert_eq!(default_directive(false, Some("verbose")), "trace");
        assert_eq!(default_directive(false, Some("nonsense")), "info");
    }
}
