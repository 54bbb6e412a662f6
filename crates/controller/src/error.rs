//! Controller-layer errors.

use thiserror::Error;
use tracedeck_engine::EngineError;

/// Result alias for controller operations.
pub type Result<T> = std::result::Result<T, ControllerError>;

/// Errors surfaced by controller ticks.
///
/// These are invariant violations or propagated engine failures; the
/// reconciliation loop treats them as fatal for the tick.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// A controller observed store state that violates its
    /// preconditions (e.g. a trace controller whose engine config
    /// disappeared).
    #[error("invalid controller state: {0}")]
    InvalidState(String),

    /// An engine call failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors aborting one trace load.
///
/// Any of these is fatal for the load: the error is logged, surfaced
/// as a status line, and the engine stays not-ready. No retry.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the local trace file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote fetch could not be issued or its body stream broke.
    #[error("fetch failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote server answered with a non-200 status.
    #[error("HTTP error {0}")]
    Http(u16),

    /// A derivation query or ingestion call failed mid-chain.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
