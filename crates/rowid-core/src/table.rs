use std::{
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use csv::StringRecord;

use crate::{config::Config, error::AnnotateError};

pub const DEFAULT_ID_COLUMN: &str = "ID";

/// How the identifier column is named and numbered.
///
/// Row `i` (0-based) is stamped with `start + i * increment`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdColumn {
    pub name:      String,
    pub start:     u64,
    pub increment: u64,
}

impl Default for IdColumn {
    fn default() -> Self {
        Self {
            name:      DEFAULT_ID_COLUMN.to_string(),
            start:     1,
            increment: 1,
        }
    }
}

impl IdColumn {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Identifier for the 0-based row `row`, or `None` on overflow.
    pub fn value_at(&self, row: u64) -> Option<u64> {
        row.checked_mul(self.increment)
            .and_then(|offset| self.start.checked_add(offset))
    }
}

/// Where the identifier column ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// A new leading column was added.
    Inserted,
    /// An existing column was overwritten in place.
    Overwritten { index: usize },
}

/// A fully materialized delimited table: one header record and the data
/// records in file order, each with the same number of fields as the header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    headers: StringRecord,
    rows:    Vec<StringRecord>,
}

impl Table {
    pub fn new(headers: StringRecord, rows: Vec<StringRecord>) -> Self {
        Self { headers, rows }
    }

    /// Read the header and every record.
    ///
    /// The reader must be non-flexible so ragged rows surface as errors
    /// instead of being padded or truncated.
    pub fn from_reader<R: io::Read>(rdr: &mut csv::Reader<R>) -> csv::Result<Self> {
        let headers = rdr.headers()?.clone();
        let rows = rdr.records().collect::<csv::Result<Vec<_>>>()?;
        Ok(Self { headers, rows })
    }

    /// Load the table at `conf.path`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the file is missing, `Read` when it cannot be opened,
    /// `MissingHeader` for an empty file and `Parse` for malformed content.
    pub fn read(conf: &Config) -> Result<Self, AnnotateError> {
        let path = &conf.path;
        let mut rdr = conf
            .reader_file()
            .map_err(|e| AnnotateError::from_io(path, e))?;
        let table = Self::from_reader(&mut rdr).map_err(|e| AnnotateError::from_read(path, e))?;
        if table.headers.is_empty() {
            return Err(AnnotateError::MissingHeader { path: path.clone() });
        }
        tracing::debug!(
            "read {} columns x {} rows from {}",
            table.headers.len(),
            table.rows.len(),
            path.display()
        );
        Ok(table)
    }

    pub const fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Stamp every row with its identifier.
    ///
    /// An existing column with the same name keeps its position and has all of
    /// its values replaced; otherwise the column is inserted first. The whole
    /// sequence is checked for overflow before anything is modified.
    pub fn set_id_column(&mut self, spec: &IdColumn) -> Result<Placement, AnnotateError> {
        let nrows = self.rows.len() as u64;
        if nrows > 0 && spec.value_at(nrows - 1).is_none() {
            return Err(AnnotateError::SequenceOverflow {
                row:       nrows,
                start:     spec.start,
                increment: spec.increment,
            });
        }

        let placement = match self.column_index(&spec.name) {
            Some(index) => Placement::Overwritten { index },
            None => Placement::Inserted,
        };

        let mut buf = itoa::Buffer::new();
        let mut value = spec.start;
        for row in &mut self.rows {
            *row = stamp(row, placement, buf.format(value));
            // the overflow check above covers every value that gets written
            value = value.wrapping_add(spec.increment);
        }
        if placement == Placement::Inserted {
            self.headers = stamp(&self.headers, placement, &spec.name);
        }
        Ok(placement)
    }

    pub fn write_to<W: io::Write>(&self, wtr: &mut csv::Writer<W>) -> csv::Result<()> {
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the table to `conf.path`.
    ///
    /// The records go to a temporary file next to the destination which is
    /// then renamed over it, so a failed run never leaves partial output.
    /// When `conf.path` is a symlink the file it points to is replaced and the
    /// link is left in place.
    ///
    /// # Errors
    ///
    /// `Write` when the destination cannot be resolved or the temporary file
    /// cannot be created, written, synced or renamed.
    pub fn write(&self, conf: &Config) -> Result<(), AnnotateError> {
        let path = &conf.path;
        let write_err = |source: io::Error| AnnotateError::Write {
            path: path.clone(),
            source,
        };

        let target = resolve_target(path).map_err(write_err)?;
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut builder = tempfile::Builder::new();
        builder.prefix(".rowid-").suffix(".tmp");
        #[cfg(unix)]
        builder.permissions(output_permissions(&target));
        let tmp = builder.tempfile_in(dir).map_err(write_err)?;

        let mut wtr = conf.from_writer(tmp);
        self.write_to(&mut wtr)
            .map_err(|e| AnnotateError::from_write(path, e))?;
        let mut tmp = wtr
            .into_inner()
            .map_err(|e| write_err(io::Error::new(e.error().kind(), e.error().to_string())))?;
        tmp.flush().map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&target).map_err(|e| write_err(e.error))?;

        tracing::debug!("wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

fn stamp(record: &StringRecord, placement: Placement, value: &str) -> StringRecord {
    match placement {
        Placement::Inserted => {
            let mut stamped =
                StringRecord::with_capacity(record.as_slice().len() + value.len(), record.len() + 1);
            stamped.push_field(value);
            stamped.extend(record.iter());
            stamped
        },
        Placement::Overwritten { index } => record
            .iter()
            .enumerate()
            .map(|(i, field)| if i == index { value } else { field })
            .collect(),
    }
}

/// The file a write to `path` should land on.
///
/// Existing paths are canonicalized so symlinks are followed. A dangling
/// symlink resolves to its (not yet existing) target; anything else that
/// does not exist yet is returned as given.
fn resolve_target(path: &Path) -> io::Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(target) => return Ok(target),
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        Err(_) => {},
    }

    let mut target = path.to_path_buf();
    for _ in 0..MAX_SYMLINK_HOPS {
        match fs::symlink_metadata(&target) {
            Ok(md) if md.file_type().is_symlink() => {
                let link = fs::read_link(&target)?;
                target = match target.parent() {
                    Some(parent) => parent.join(link),
                    None => link,
                };
            },
            _ => return Ok(target),
        }
    }
    Err(io::Error::other(format!(
        "too many levels of symbolic links: {}",
        path.display()
    )))
}

const MAX_SYMLINK_HOPS: usize = 40;

/// Keep the mode of a file being replaced; new files get the usual 0666
/// (before umask) instead of the private mode temp files are created with.
#[cfg(unix)]
fn output_permissions(path: &Path) -> std::fs::Permissions {
    use std::os::unix::fs::PermissionsExt as _;

    fs::metadata(path)
        .map(|md| md.permissions())
        .unwrap_or_else(|_| fs::Permissions::from_mode(0o666))
}
