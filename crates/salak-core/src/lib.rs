//! Salak Core
//!
//! Shareable ESLint-style rule configuration for JavaScript projects.
//! This crate provides the built-in salak presets, loading of layer
//! definitions, and the resolver that flattens `extends` chains into the
//! effective configuration a lint engine consumes.

pub mod config;
pub mod error;
pub mod presets;
pub mod result;
pub mod schema;

// Re-export commonly used types
pub use config::{
    ConfigLayer, EffectiveConfig, LayerDefinition, LayerFormat, LayerGraph, LayerLoader,
    LayerRegistry, LoaderOptions, RuleDirective, RuleSeverity, resolve,
};
pub use error::{ConfigError, ErrorKind, SalakError};
pub use result::Result;

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("salak_core=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
