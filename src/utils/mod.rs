pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVES: [&str; 3] = ["invest_budget=info", "ivb_core=warn", "ivb_storage_json=warn"];

/// Initializes the global tracing subscriber. `RUST_LOG` is honoured, then the
/// defaults, then `extra` (ignored when it does not parse). Only the first
/// call has any effect.
pub fn init_tracing(extra: Option<&str>) {
    TRACING_INIT.call_once(|| {
        let mut directives: Vec<&str> = DEFAULT_DIRECTIVES.to_vec();
        directives.extend(extra);

        let mut filter = EnvFilter::from_default_env();
        for directive in directives
            .into_iter()
            .filter_map(|raw| raw.parse::<Directive>().ok())
        {
            filter = filter.add_directive(directive);
        }

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .ok();
        tracing::info!("Invest Budget tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_tracing_is_idempotent() {
        super::init_tracing(None);
        super::init_tracing(Some("invest_budget=debug"));
    }
}
