use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();

/// Install a global tracing subscriber once per test binary.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "debug");
        }
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
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

/// Small classification tree used across tests.
///
/// Two categories; the first has three dated children, one of them nested.
pub const SAMPLE_TREE: &str = r#"{
  "Mobility": {
    "_date": "2025-01-15",
    "Walking": {"_date": "2025-07-01"},
    "Stairs": {},
    "Driving": {
      "_date": "2025-10-02",
      "Manual gearbox": {}
    }
  },
  "Vision": {
    "Reading": {"_date": "1970-01-01"}
  }
}"#;

/// Parsed form of [`SAMPLE_TREE`].
pub fn sample_tree() -> crate::domain::TreeNode {
    let value: serde_json::Value =
        serde_json::from_str(SAMPLE_TREE).expect("sample tree is valid JSON");
    crate::domain::TreeNode::from_json(&value).expect("sample tree is a valid tree")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_setup_when_called_twice_then_initializes_once() {
        init_test_setup();
        init_test_setup();
    }

    #[test]
    fn given_sample_tree_then_has_two_categories() {
        let tree = sample_tree();
        assert_eq!(tree.children().map(|c| c.len()), Some(2));
    }
}
