//! Diagnostic logging setup for the binary.
//!
//! User-facing progress goes through the transcript; `tracing` events carry
//! internal detail (skipped entries, rule hits, timings) to stderr.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "atomize=debug" } else { "atomize=warn" }
}

/// Installs a stderr fmt subscriber. `--verbose` wins over `RUST_LOG`.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(default_directive(true))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(false)))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(true), "atomize=debug");
        assert_eq!(default_directive(false), "atomize=warn");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_tracing(false);
        init_tracing(true);
    }
}
