//! Adapter error types.

use thiserror::Error;

use crate::hot::factory::BoxError;

/// Fatal errors raised while wiring the adapter up.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("hot router must be installed from within a Tokio runtime")]
    NoRuntime,

    #[error("host application has no identity to register the entry point against")]
    MissingHostId,

    #[error("initial router build failed: {0}")]
    InitialBuild(#[source] RebuildError),
}

/// Recoverable errors from a single rebuild. The previous router stays active.
#[derive(Debug, Error)]
pub enum RebuildError {
    #[error("router has not been initialized with a context yet")]
    Uninitialized,

    #[error("router factory failed: {0}")]
    Factory(#[source] BoxError),

    #[error("router factory panicked: {0}")]
    Panicked(String),
}
