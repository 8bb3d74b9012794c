//! CLI-level errors (wraps infrastructure errors)

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("cannot create {}: {source}", path.display())]
    CannotCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        ApplicationError::from(e).into()
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => exitcode::USAGE,
            CliError::CannotCreate { .. } => exitcode::CANTCREAT,
            CliError::Infra(InfraError::Io { .. }) => exitcode::IOERR,
            CliError::Infra(InfraError::Application(e)) => application_exit_code(e),
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(DomainError::InvalidTree { .. }) => exitcode::DATAERR,
        ApplicationError::Domain(DomainError::InvalidArity(_)) => exitcode::CONFIG,
        ApplicationError::Domain(DomainError::NotLoaded) => exitcode::SOFTWARE,
        ApplicationError::Decode { .. } => exitcode::DATAERR,
        ApplicationError::MemberNotFound(_) | ApplicationError::EmptySlot(_) => exitcode::USAGE,
        ApplicationError::Config { .. } => exitcode::CONFIG,
        ApplicationError::OperationFailed { source, .. } => match source.downcast_ref::<io::Error>()
        {
            Some(io_err) if io_err.kind() == io::ErrorKind::NotFound => exitcode::NOINPUT,
            _ => exitcode::IOERR,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MemberId, TreeViolation};
    use rstest::rstest;

    fn decode_error() -> ApplicationError {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        ApplicationError::Decode {
            path: PathBuf::from("tree.json"),
            source,
        }
    }

    fn io_failure(kind: io::ErrorKind) -> ApplicationError {
        ApplicationError::OperationFailed {
            context: "read tree file: tree.json".to_string(),
            source: Box::new(io::Error::new(kind, "boom")),
        }
    }

    #[rstest]
    #[case::invalid_tree(
        ApplicationError::Domain(DomainError::InvalidTree {
            id: MemberId::from("x"),
            violation: TreeViolation::DuplicateId,
        }),
        exitcode::DATAERR
    )]
    #[case::decode(decode_error(), exitcode::DATAERR)]
    #[case::missing_file(io_failure(io::ErrorKind::NotFound), exitcode::NOINPUT)]
    #[case::unreadable_file(io_failure(io::ErrorKind::PermissionDenied), exitcode::IOERR)]
    #[case::config(ApplicationError::Config { message: "bad".into() }, exitcode::CONFIG)]
    #[case::unknown_member(ApplicationError::MemberNotFound(MemberId::from("nobody")), exitcode::USAGE)]
    fn given_application_error_when_exit_code_then_maps_to_sysexits(
        #[case] error: ApplicationError,
        #[case] expected: i32,
    ) {
        assert_eq!(CliError::from(error).exit_code(), expected);
    }

    #[test]
    fn given_usage_error_when_exit_code_then_usage() {
        assert_eq!(CliError::Usage("nope".into()).exit_code(), exitcode::USAGE);
    }

    #[test]
    fn given_unwritable_config_target_when_exit_code_then_cantcreat() {
        let err = CliError::CannotCreate {
            path: PathBuf::from("/ro/.matrixnet.toml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        };

        assert_eq!(err.exit_code(), exitcode::CANTCREAT);
        assert_eq!(err.to_string(), "cannot create /ro/.matrixnet.toml: read-only");
    }

    #[test]
    fn given_domain_error_when_converting_then_message_is_preserved() {
        let err = CliError::from(DomainError::NotLoaded);
        assert_eq!(err.to_string(), "tree not loaded");
    }
}
