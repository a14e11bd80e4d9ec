use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures of the read → stamp → write pipeline.
///
/// Every variant that touches the filesystem carries the offending path so the
/// message printed by the binary identifies what failed and why.
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("input file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("could not read {}: {source}", path.display())]
    Read {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path:   PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} has no header row", path.display())]
    MissingHeader { path: PathBuf },

    #[error("could not write {}: {source}", path.display())]
    Write {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("identifier overflowed at row {row} (start {start}, increment {increment})")]
    SequenceOverflow {
        row:       u64,
        start:     u64,
        increment: u64,
    },
}

impl AnnotateError {
    /// Classify a csv error raised while reading `path`.
    ///
    /// The csv crate reports plain I/O failures through the same error type as
    /// malformed content; only the latter are parse errors.
    pub(crate) fn from_read(path: impl Into<PathBuf>, err: csv::Error) -> Self {
        let path = path.into();
        if !err.is_io_error() {
            return Self::Parse { path, source: err };
        }
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Self::from_io(path, source),
            kind => Self::Read {
                path,
                source: io::Error::other(format!("{kind:?}")),
            },
        }
    }

    /// Classify an I/O error raised while opening or reading `path`.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Read { path, source }
        }
    }

    /// Classify a csv error raised while writing `path`.
    pub(crate) fn from_write(path: impl Into<PathBuf>, err: csv::Error) -> Self {
        let source = match err.into_kind() {
            csv::ErrorKind::Io(source) => source,
            kind => io::Error::other(format!("{kind:?}")),
        };
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// True for the parse family: malformed rows, bad encoding, missing header.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::MissingHeader { .. })
    }
}
