//! Unified error type for the facade.

use thiserror::Error;

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// All tracedeck errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A controller tick failed.
    #[error(transparent)]
    Controller(#[from] tracedeck_controller::ControllerError),

    /// An engine call failed outside a controller.
    #[error(transparent)]
    Engine(#[from] tracedeck_engine::EngineError),
}
