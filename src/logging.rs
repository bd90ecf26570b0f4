//! Logging setup for the sas2mongo binary.
//!
//! Progress and diagnostics go to stderr so stdout stays free for the
//! dry-run document stream.

use tracing_subscriber::EnvFilter;

use crate::error::{Result, Sas2MongoError};

fn default_directive(debug: bool) -> &'static str {
    if debug {
        "warn,sas2mongo=debug"
    } else {
        "warn,sas2mongo=info"
    }
}

/// Initializes the global subscriber. `RUST_LOG` overrides the default level.
pub fn init_logging(debug: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Sas2MongoError::configuration(format!("Failed to initialize logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // The subscriber can only be installed once per process, so only the
    // directive selection is checked here.
    #[test]
    fn test_default_directives_parse() {
        for debug in [false, true] {
            let directive = default_directive(debug);
            assert!(directive.parse::<EnvFilter>().is_ok(), "{}", directive);
        }
        assert!(default_directive(true).ends_with("debug"));
        assert!(default_directive(false).ends_with("info"));
    }
}
