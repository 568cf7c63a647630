//! Tracing setup for the provider process

use tracing::Level;

/// Maps Terraform's `TF_LOG` setting to a tracing level, defaulting to INFO
pub fn level_from_tf_log(value: Option<&str>) -> Level {
    match value.map(|v| v.trim().to_ascii_uppercase()).as_deref() {
        Some("TRACE") => Level::TRACE,
        Some("DEBUG") => Level::DEBUG,
        Some("WARN") => Level::WARN,
        Some("ERROR") => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Installs a stderr fmt subscriber. Does nothing if one is already set.
pub fn init_tracing() {
    let level = level_from_tf_log(std::env::var("TF_LOG").ok().as_deref());
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tf_log_levels() {
        assert_eq!(level_from_tf_log(Some("TRACE")), Level::TRACE);
        assert_eq!(level_from_tf_log(Some("debug")), Level::DEBUG);
        assert_eq!(level_from_tf_log(Some(" warn ")), Level::WARN);
        assert_eq!(level_from_tf_log(Some("ERROR")), Level::ERROR);
        assert_eq!(level_from_tf_log(Some("JSON")), Level::INFO);
        assert_eq!(level_from_tf_log(None), Level::INFO);
    }

    #[test]
    fn init_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
