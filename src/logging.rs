//! Tracing setup for the generator binary.
//!
//! ```bash
//! # default: info-level text on stderr
//! screen-bindgen
//!
//! # skip reasons, phase transitions, resolved property sets
//! SCREEN_BINDGEN_LOG=debug screen-bindgen
//!
//! # one JSON object per event
//! SCREEN_BINDGEN_LOG_FORMAT=json screen-bindgen
//! ```

use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SCREEN_BINDGEN_LOG";
const LOG_FORMAT_ENV: &str = "SCREEN_BINDGEN_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV)
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// `SCREEN_BINDGEN_LOG` wins over `RUST_LOG`; neither set means `info`.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var(LOG_ENV) {
        EnvFilter::builder().parse_lossy(val)
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new("info")
    }
}

/// Installs the global subscriber. All output goes to stderr.
pub fn init_tracing() {
    let filter = build_filter();

    match LogFormat::from_env() {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
