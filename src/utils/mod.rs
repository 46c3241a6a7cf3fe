pub mod build_info;
pub mod paths;

use std::sync::Once;

use tracing_subscriber::{
    filter::{Directive, LevelFilter},
    fmt, EnvFilter,
};

static TRACING_INIT: Once = Once::new();

pub const DEFAULT_LOG_DIRECTIVE: &str = "tally=info";

/// Installs the global fmt subscriber once.
///
/// `RUST_LOG` is honoured; `directive` (or `tally=info`) is layered on top. An
/// unparsable directive falls back to the default.
pub fn init_tracing(directive: Option<&str>) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::from_default_env().add_directive(parse_directive(directive));
        // Another subscriber may already be installed by the host; keep it.
        let _ = fmt().with_env_filter(filter).try_init();
    });
}

fn parse_directive(directive: Option<&str>) -> Directive {
    directive
        .and_then(|raw| raw.parse().ok())
        .or_else(|| DEFAULT_LOG_DIRECTIVE.parse().ok())
        .unwrap_or_else(|| LevelFilter::INFO.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_directives_fall_back_to_default() {
        assert_eq!(
            parse_directive(Some("tally=loudest")).to_string(),
            DEFAULT_LOG_DIRECTIVE
        );
        assert_eq!(
            parse_directive(Some("tally_core=debug")).to_string(),
            "tally_core=debug"
        );
    }
}
