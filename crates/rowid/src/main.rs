use std::{env, io::Write as _, process::ExitCode, time::Instant};

use rowid_core::{CliError, RowIdExitCode, annotate, util};

fn main() -> ExitCode {
    let now = Instant::now();
    let (rowid_args, _logger_guard) = match util::init_logger() {
        Ok(logger) => logger,
        Err(e) => {
            let _ = writeln!(std::io::stderr(), "{e:#}");
            return RowIdExitCode::Bad.into();
        },
    };

    let argv: Vec<String> = env::args().collect();
    let argv: Vec<&str> = argv.iter().map(String::as_str).collect();

    let exit_code = match annotate::run(&argv) {
        Ok(()) => RowIdExitCode::Good,
        Err(CliError::Flag(err)) => {
            // --help and --version land here too and go to stdout
            if err.fatal() {
                let _ = writeln!(std::io::stderr(), "{err}");
            } else {
                let _ = writeln!(std::io::stdout(), "{err}");
            }
            CliError::Flag(err).exit_code()
        },
        Err(err) => {
            tracing::error!("{err}");
            let _ = writeln!(std::io::stderr(), "{err}");
            err.exit_code()
        },
    };

    util::log_end(rowid_args, now);
    exit_code.into()
}
