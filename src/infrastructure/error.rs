//! Infrastructure-level errors (external processes)

use thiserror::Error;

/// Failures reported by external tools.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("renderer failed: {message}")]
    Renderer {
        message: String,
        exit_code: Option<i32>,
    },
}
