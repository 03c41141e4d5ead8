//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("nothing changed: {0}")]
    Rejected(DomainError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Rejected(_) => crate::exitcode::DATAERR,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Import(_) | ApplicationError::CorruptStorage { .. } => {
                        crate::exitcode::DATAERR
                    }
                    ApplicationError::Storage { .. } => crate::exitcode::IOERR,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::Domain(_) | ApplicationError::OperationFailed { .. } => {
                        crate::exitcode::SOFTWARE
                    }
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ImportError;
    use crate::domain::NodeId;

    #[test]
    fn given_errors_then_map_to_sysexits() {
        assert_eq!(CliError::Usage("x".into()).exit_code(), crate::exitcode::USAGE);
        assert_eq!(
            CliError::Rejected(DomainError::NodeNotFound(NodeId::from("a"))).exit_code(),
            crate::exitcode::DATAERR
        );
        let import = ApplicationError::Import(ImportError::InvalidStructure {
            reason: "x".into(),
        });
        assert_eq!(CliError::from(import).exit_code(), crate::exitcode::DATAERR);
        let config = ApplicationError::Config { message: "x".into() };
        assert_eq!(CliError::from(config).exit_code(), crate::exitcode::CONFIG);
    }
}
