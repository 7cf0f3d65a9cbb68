//! Error types for the typed side of the hero client.
//!
//! The fail-soft operations on [`crate::core::HeroService`] never return these;
//! they log the error and hand back a fallback value instead.

/// Errors surfaced by the `try_*` operations and by configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum HeroError {
    /// Transport failure, non-2xx status, or a body that did not decode.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// A configuration value is missing or malformed.
    #[error("config error: {0}")]
    Config(String),
}
