//! Process-wide `tracing` setup.

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "rtprec=trace,rtprec_media=trace,rtprec_rtp=debug"
    } else {
        "rtprec=info,rtprec_media=info,rtprec_rtp=info"
    }
}

/// Install a fmt subscriber.
///
/// Respects `RUST_LOG` if set. Does nothing when a global subscriber is
/// already installed, so calling it more than once is harmless.
pub fn init(verbose: bool) {
    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter(verbose).to_string());

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter.as_str())
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert!(default_filter(false).contains("rtprec_media=info"));
        assert!(default_filter(true).contains("rtprec_media=trace"));
    }

    #[test]
    fn test_init_twice() {
        init(false);
        init(true);
    }
}
