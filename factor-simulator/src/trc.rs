//! Tracing configuration and initialization.

use tracing_subscriber::{
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

/// Name of the variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "FACTOR_SIM_LOG";

pub struct Trc {
    env_filter: EnvFilter,
    verbose: bool,
}

impl Default for Trc {
    fn default() -> Self {
        let maybe_env_filter =
            EnvFilter::try_from_env(LOG_ENV).or_else(|_| EnvFilter::try_from_default_env());

        match maybe_env_filter {
            // An explicit filter gets the plain format with targets and times.
            Ok(env_filter) => Self {
                env_filter,
                verbose: true,
            },
            Err(_) => Self {
                env_filter: EnvFilter::new("info"),
                verbose: false,
            },
        }
    }
}

impl Trc {
    pub fn init(self) -> Result<(), TryInitError> {
        let registry = tracing_subscriber::registry().with(self.env_filter);

        if self.verbose {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .without_time()
                        .compact(),
                )
                .try_init()
        }
    }
}
