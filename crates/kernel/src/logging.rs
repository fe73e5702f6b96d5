//! Diagnostic tracing for hosts embedding the kernel.
//!
//! The kernel only emits `tracing` events; it never installs a subscriber
//! on its own. Hosts that have no subscriber of their own can call
//! [`init`].

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a stderr subscriber filtered by `RUST_LOG`.
///
/// Defaults to `warn` when `RUST_LOG` is unset, which still reports
/// dependency specifiers missing from a module's dependency map.
///
/// ```bash
/// RUST_LOG=kernel=debug,endowments=debug ./host
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
