use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_directives(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "slotplan_core=debug,slotplan_ingest=debug,slotplan=debug,info",
        _ => "trace",
    }
}

/// Install the stderr subscriber. `RUST_LOG` overrides `-v`.
pub fn init_logging(verbose: u8) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(verbose)))
        .map_err(|err| anyhow!("invalid log filter: {err}"))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init()
        .map_err(|err| anyhow!("logging already initialised: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_parseable_directives() {
        for v in 0..3 {
            assert!(EnvFilter::try_new(default_directives(v)).is_ok());
        }
    }
}
