static USAGE: &str = r#"
Adds a sequential identifier column to a CSV file and writes the result
to a new file.

If the input has no column named ID (see --column), one is inserted as the
first column. If it already has one, that column keeps its position and
every value in it is replaced. Row i (counting from 1 after the header)
gets the value i. All other columns and values are copied unchanged and
row order is preserved.

The whole input is read before anything is written. The output is written
to a temporary file beside it and renamed into place, so a failed run never
leaves a partial file behind. Input and output may be the same file.

Examples:

  $ rowid scores.csv scores_with_id.csv

  Name,Score          ID,Name,Score
  Alice,90      =>    1,Alice,90
  Bob,85              2,Bob,85

  # number from 1000 in steps of 10, into a column called "row_key"
  $ rowid --column row_key --start 1000 --increment 10 in.csv out.csv

Usage:
    rowid [options] <input> <output>
    rowid --help
    rowid --version

rowid options:
    -c, --column <name>    Name of the identifier column. [default: ID]
    --start <n>            The first identifier value. [default: 1]
    --increment <n>        The step between consecutive identifiers.
                           Must be greater than zero. [default: 1]

Common options:
    -h, --help             Display this message
    -V, --version          Print version information
    -d, --delimiter <arg>  The field delimiter for reading the input.
                           Must be a single character. Defaults to the
                           file extension (.tsv/.tab: tab, .ssv: semicolon,
                           otherwise comma) or ROWID_DEFAULT_DELIMITER.
                           The output is always comma-separated.
    -q, --quiet            Do not print the completion message.
"#;

use std::{
    io::{self, Write as _},
    path::Path,
};

use serde::Deserialize;

use crate::{
    CliResult,
    config::{Config, Delimiter},
    error::AnnotateError,
    table::{DEFAULT_ID_COLUMN, IdColumn, Placement, Table},
    util,
};

#[derive(Deserialize)]
struct Args {
    arg_input:      String,
    arg_output:     String,
    flag_column:    String,
    flag_start:     u64,
    flag_increment: u64,
    flag_delimiter: Option<Delimiter>,
    flag_quiet:     bool,
}

/// What an annotation run did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub rows:      u64,
    pub placement: Placement,
}

/// Read `input`, stamp the identifier column described by `spec` and write
/// the table to `output`.
///
/// Nothing is written unless the input was read and stamped in full.
///
/// # Errors
///
/// `NotFound`, `Read`, `MissingHeader` or `Parse` for the input,
/// `SequenceOverflow` for an identifier range that does not fit in a `u64`,
/// and `Write` for the output.
pub fn annotate_file(
    input: &Config,
    output: &Config,
    spec: &IdColumn,
) -> Result<Summary, AnnotateError> {
    let mut table = Table::read(input)?;
    let placement = table.set_id_column(spec)?;
    table.write(output)?;

    let summary = Summary {
        rows: table.len() as u64,
        placement,
    };
    match placement {
        Placement::Inserted => tracing::info!(
            "inserted '{}' as first column, {} rows: {} -> {}",
            spec.name,
            summary.rows,
            input.path.display(),
            output.path.display()
        ),
        Placement::Overwritten { index } => tracing::info!(
            "overwrote '{}' at column {index}, {} rows: {} -> {}",
            spec.name,
            summary.rows,
            input.path.display(),
            output.path.display()
        ),
    }
    Ok(summary)
}

/// [`annotate_file`] with the default `ID` column, the input delimiter taken
/// from its extension and comma-separated output.
///
/// # Errors
///
/// See [`annotate_file`].
pub fn annotate_paths(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<Summary, AnnotateError> {
    annotate_file(
        &Config::new(input),
        &Config::output(output),
        &IdColumn::default(),
    )
}

pub fn completion_message(column: &str, output: &str) -> String {
    if column == DEFAULT_ID_COLUMN {
        format!("Auto-incrementing ID column added and written to {output}")
    } else {
        format!("Auto-incrementing {column} column added and written to {output}")
    }
}

pub fn run(argv: &[&str]) -> CliResult<()> {
    let args: Args = util::get_args(USAGE, argv)?;

    if args.flag_increment == 0 {
        return fail_incorrectusage_clierror!("--increment must be greater than zero.");
    }
    if args.flag_column.is_empty() {
        return fail_incorrectusage_clierror!("--column must not be empty.");
    }

    let rconfig = Config::new(&args.arg_input).delimiter(args.flag_delimiter);
    let wconfig = Config::output(&args.arg_output);
    let spec = IdColumn {
        start:     args.flag_start,
        increment: args.flag_increment,
        ..IdColumn::named(args.flag_column)
    };

    annotate_file(&rconfig, &wconfig, &spec)?;

    if !args.flag_quiet {
        writeln!(
            io::stdout().lock(),
            "{}",
            completion_message(&spec.name, &args.arg_output)
        )?;
    }
    Ok(())
}
