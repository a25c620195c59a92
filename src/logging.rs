//! Tracing setup shared by the binaries
//!
//! The level comes from `RUST_LOG` and defaults to `info` for this crate and
//! `warn` for dependencies. Output goes to stderr so the client's stdout
//! stays readable.

use std::sync::OnceLock;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

const DEFAULT_FILTER: &str =
    "rust_l402=info,l402_server=info,l402_gateway=info,l402_client=info,tower_http=info,warn";

/// Initialize the global tracing subscriber
///
/// Calls after the first are ignored.
pub fn init_tracing(format: LogFormat) {
    if TRACING_INITIALIZED.get().is_some() {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
    };

    // another subscriber may already be installed, e.g. by a test harness
    let _ = tracing_subscriber::registry().with(layer).try_init();
    let _ = TRACING_INITIALIZED.set(());
}
