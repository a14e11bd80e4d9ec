use thiserror::Error;

use crate::error::AnnotateError;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowIdExitCode {
    Good           = 0,
    Bad            = 1,
    IncorrectUsage = 2,
}

impl From<RowIdExitCode> for std::process::ExitCode {
    fn from(code: RowIdExitCode) -> Self {
        Self::from(code as u8)
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Flag(#[from] docopt::Error),
    #[error(transparent)]
    Annotate(#[from] AnnotateError),
    #[error("usage error: {0}")]
    IncorrectUsage(String),
    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub fn exit_code(&self) -> RowIdExitCode {
        match self {
            Self::Flag(err) if !err.fatal() => RowIdExitCode::Good,
            Self::Flag(_) | Self::IncorrectUsage(_) => RowIdExitCode::IncorrectUsage,
            Self::Annotate(_) | Self::Other(_) => RowIdExitCode::Bad,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(err.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[macro_export]
macro_rules! fail_incorrectusage_clierror {
    ($($t:tt)*) => {{
        use $crate::clitypes::CliError;
        let err = format!($($t)*);
        Err(CliError::IncorrectUsage(err))
    }};
}
