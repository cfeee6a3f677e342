//! Log output setup.
//!
//! The subscriber is installed only when `TYB_LOG` or `RUST_LOG` is set, or
//! when `--verbose` is passed. Output goes to stderr so bundle text written
//! to stdout stays clean.
//!
//! ```bash
//! TYB_LOG=debug tyb bundle -i src/user.ts -t User
//! TYB_LOG=tybundle_engine=trace TYB_LOG_FORMAT=json tyb batch -c tyb.toml
//! ```

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var("TYB_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// `TYB_LOG` wins over `RUST_LOG`; `--verbose` alone means `debug`.
fn build_filter(verbose: bool) -> Option<EnvFilter> {
    if let Ok(value) = std::env::var("TYB_LOG") {
        return Some(EnvFilter::builder().parse_lossy(value));
    }
    if std::env::var("RUST_LOG").is_ok() {
        return Some(EnvFilter::from_default_env());
    }
    verbose.then(|| EnvFilter::new("debug"))
}

/// Install the global subscriber if logging was asked for.
pub fn init(verbose: bool) {
    let Some(filter) = build_filter(verbose) else {
        return;
    };

    match LogFormat::from_env() {
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
