//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("unrecognized option(s): {}", .0.join(" "))]
    UnknownFlags(Vec<String>),

    #[error("{} view(s) failed: {}", failed.len(), failed.join(", "))]
    IncompleteBatch { failed: Vec<String> },
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::UnknownFlags(_) => exitcode::USAGE,
            CliError::IncompleteBatch { .. } => exitcode::SOFTWARE,
            CliError::Application(e) => application_exit_code(e),
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(DomainError::MalformedDate(_))
        | ApplicationError::Domain(DomainError::InvalidTree { .. }) => exitcode::DATAERR,
        ApplicationError::MissingInput(_) => exitcode::NOINPUT,
        ApplicationError::ExternalTool { .. } => exitcode::UNAVAILABLE,
        ApplicationError::Config { .. } => exitcode::CONFIG,
        ApplicationError::OperationFailed { source, .. } => {
            match source.downcast_ref::<std::io::Error>() {
                Some(io) if io.kind() == std::io::ErrorKind::NotFound => exitcode::NOINPUT,
                Some(_) => exitcode::IOERR,
                None if source.is::<serde_json::Error>() => exitcode::DATAERR,
                None => exitcode::SOFTWARE,
            }
        }
    }
}
