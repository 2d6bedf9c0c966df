//! Test support: tracing setup and doc comment fixtures

use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();

/// Install the global tracing subscriber once per test binary.
///
/// Honors `RUST_LOG`; defaults to `hierardoc=trace`.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = env::var("RUST_LOG")
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new("hierardoc=trace"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Build a multi-line doc comment with ` * ` prefixed lines.
///
/// `docblock(&["@a b", "", "@c-d"])` yields
/// `"/**\n * @a b\n *\n * @c-d\n */"`.
pub fn docblock(lines: &[&str]) -> String {
    let mut doc = String::from("/**\n");
    for line in lines {
        if line.is_empty() {
            doc.push_str(" *\n");
        } else {
            doc.push_str(" * ");
            doc.push_str(line);
            doc.push('\n');
        }
    }
    doc.push_str(" */");
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
        init_test_setup();
    }

    #[test]
    fn test_docblock_fixture() {
        assert_eq!(
            docblock(&["@a b", "", "@c-d"]),
            "/**\n * @a b\n *\n * @c-d\n */"
        );
        assert_eq!(docblock(&[]), "/**\n */");
    }
}
