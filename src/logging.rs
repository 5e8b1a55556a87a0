//! Log setup for the `vxl` binary.
//!
//! Logs always go to stderr so that reports on stdout stay parseable. Robot
//! mode gets JSON lines, a terminal gets the default formatter, anything else
//! gets compact lines without color codes.

use std::io::{self, IsTerminal};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Filter directive for the requested verbosity.
fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "vxl=error"
    } else {
        match verbose {
            0 => "vxl=warn",
            1 => "vxl=debug",
            _ => "vxl=trace",
        }
    }
}

/// Install the global subscriber.
///
/// `verbose` maps 0/1/2+ to warn/debug/trace and `quiet` wins over it with
/// errors only. `RUST_LOG` replaces the computed filter entirely, e.g.
/// `RUST_LOG=vxl=info,vxl::deploy=trace`.
pub fn init_logging(json: bool, verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let base = fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(io::stderr);

    let layer: Box<dyn Layer<Registry> + Send + Sync> = if json {
        base.json().with_target(true).boxed()
    } else if io::stderr().is_terminal() {
        base.with_target(false).boxed()
    } else {
        base.with_ansi(false).with_target(false).compact().boxed()
    };

    tracing_subscriber::registry().with(layer).with(filter).init();
}
