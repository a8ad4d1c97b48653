use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the stderr subscriber. `RUST_LOG` overrides the default `info`
/// level.
pub fn init_tracing() -> anyhow::Result<()> {
  let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
  let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

  tracing_subscriber::registry()
    .with(fmt_layer)
    .with(env_filter)
    .try_init()
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

  Ok(())
}
