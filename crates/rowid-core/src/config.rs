use std::{
    env,
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use serde::de::{Deserialize, Deserializer, Error};

pub const DEFAULT_RDR_BUFFER_CAPACITY: usize = 128 * (1 << 10);
pub const DEFAULT_WTR_BUFFER_CAPACITY: usize = 512 * (1 << 10);

/// Field separator. Deserializes from docopt flags like `--delimiter ';'`
/// and the literal two-character escape `\t`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delimiter(pub u8);

impl Delimiter {
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// Parse a delimiter the way it is typed on a command line.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            r"\t" => Ok(Self(b'\t')),
            s => match s.as_bytes() {
                [b] if b.is_ascii() => Ok(Self(*b)),
                _ => Err(format!(
                    "Could not convert '{s}' to a single ASCII character."
                )),
            },
        }
    }
}

impl<'de> Deserialize<'de> for Delimiter {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::parse(&s).map_err(D::Error::custom)
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub path:  PathBuf,
    delimiter: u8,
}

impl Config {
    /// Reader/writer settings for `path`.
    ///
    /// The delimiter is sniffed from the extension, then overridden by
    /// `ROWID_DEFAULT_DELIMITER` when that is set to a valid delimiter.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut delimiter = match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("tsv" | "tab") => b'\t',
            Some("ssv") => b';',
            _ => b',',
        };
        if let Ok(env_delim) = env::var("ROWID_DEFAULT_DELIMITER") {
            match Delimiter::parse(&env_delim) {
                Ok(d) => delimiter = d.as_byte(),
                Err(e) => tracing::warn!("ignoring ROWID_DEFAULT_DELIMITER: {e}"),
            }
        }
        Self { path, delimiter }
    }

    /// Writer settings for `path`: always comma-separated, whatever the
    /// extension or `ROWID_DEFAULT_DELIMITER` say.
    pub fn output(path: impl AsRef<Path>) -> Self {
        Self {
            path:      path.as_ref().to_path_buf(),
            delimiter: b',',
        }
    }

    #[must_use]
    pub const fn delimiter(mut self, d: Option<Delimiter>) -> Self {
        if let Some(d) = d {
            self.delimiter = d.0;
        }
        self
    }

    pub const fn get_delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn reader_file(&self) -> io::Result<csv::Reader<BufReader<File>>> {
        let file = File::open(&self.path)?;
        Ok(self.from_reader(BufReader::with_capacity(
            DEFAULT_RDR_BUFFER_CAPACITY,
            file,
        )))
    }

    pub fn from_reader<R: io::Read>(&self, rdr: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .flexible(false)
            .delimiter(self.delimiter)
            .has_headers(true)
            .quote(b'"')
            .double_quote(true)
            .buffer_capacity(DEFAULT_RDR_BUFFER_CAPACITY)
            .from_reader(rdr)
    }

    pub fn from_writer<W: io::Write>(&self, wtr: W) -> csv::Writer<W> {
        csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote(b'"')
            .quote_style(csv::QuoteStyle::Necessary)
            .double_quote(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .buffer_capacity(DEFAULT_WTR_BUFFER_CAPACITY)
            .from_writer(wtr)
    }
}
