//! Global logging system.

use std::env;
use tracing_subscriber::{
    fmt::{self, time::uptime},
    prelude::*,
    EnvFilter, Registry,
};

/// Default logging environment filter. Our crates are info, everything else is warn.
const DEFAULT_FILTER: &str = "warn,atomsim=info,atomsim_core=info";

/// Initializes a `tracing` logging backend which outputs to stderr. Accepts
/// ecosystem-standard `RUST_LOG` env filters, appended to the defaults.
pub fn init_logging() {
    let format = fmt::format()
        .compact()
        .with_timer(uptime())
        .with_line_number(true);
    let stderr_log = fmt::layer()
        .event_format(format)
        .with_writer(std::io::stderr);

    let mut filter = DEFAULT_FILTER.to_owned();
    if let Ok(env_filter) = env::var(EnvFilter::DEFAULT_ENV) {
        filter.push(',');
        filter.push_str(&env_filter);
    }

    let subscriber = Registry::default()
        .with(EnvFilter::new(filter))
        .with(stderr_log);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("log subscriber already installed");
    }
}
