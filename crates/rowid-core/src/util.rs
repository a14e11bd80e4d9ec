use std::{env, fs, time::Instant};

use anyhow::anyhow;
use docopt::Docopt;
use serde::de::DeserializeOwned;
use tracing_subscriber::layer::SubscriberExt as _;

const BIN_NAME: &str = "rowid";

const TARGET: &str = match option_env!("TARGET") {
    Some(target) => target,
    None => "Unknown_target",
};

pub fn version() -> String {
    format!(
        "{BIN_NAME} {} ({TARGET})",
        env!("CARGO_PKG_VERSION")
    )
}

/// Parse `argv` (program name first) against a docopt usage string.
pub fn get_args<T>(usage: &str, argv: &[&str]) -> Result<T, docopt::Error>
where
    T: DeserializeOwned,
{
    Docopt::new(usage).and_then(|d| {
        d.argv(argv.iter().copied())
            .version(Some(version()))
            .deserialize()
    })
}

/// True when the environment variable is set to `1`, `true` or `yes`.
pub fn get_envvar_flag(key: &str) -> bool {
    env::var(key).is_ok_and(|val| {
        matches!(
            val.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        )
    })
}

/// Install the global tracing subscriber.
///
/// Logging is off unless `ROWID_LOG_LEVEL` is set. Records go to a daily
/// rolling `rowid.log` in `ROWID_LOG_DIR` (default: the current directory),
/// through a background writer unless `ROWID_LOG_UNBUFFERED` is set. The
/// returned guard must be held until the process is about to exit so the
/// background writer gets flushed.
pub fn init_logger() -> anyhow::Result<(String, Option<tracing_appender::non_blocking::WorkerGuard>)>
{
    use tracing_log::LogTracer;
    use tracing_subscriber::{EnvFilter, fmt};

    let level = env::var("ROWID_LOG_LEVEL").unwrap_or_else(|_| "off".to_string());
    if level.eq_ignore_ascii_case("off") {
        let _ = LogTracer::init();
        return Ok((String::new(), None));
    }

    let log_dir = env::var("ROWID_LOG_DIR").unwrap_or_else(|_| ".".to_string());
    fs::create_dir_all(&log_dir)
        .map_err(|e| anyhow!("Failed to create ROWID_LOG_DIR '{log_dir}': {e}"))?;

    // route `log` records from dependencies into tracing
    let _ = LogTracer::init();

    let env_filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    let appender = tracing_appender::rolling::daily(&log_dir, format!("{BIN_NAME}.log"));
    let (make_writer, guard_opt) = if get_envvar_flag("ROWID_LOG_UNBUFFERED") {
        (fmt::writer::BoxMakeWriter::new(appender), None)
    } else {
        let (nb, guard) = tracing_appender::non_blocking(appender);
        (fmt::writer::BoxMakeWriter::new(nb), Some(guard))
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_ansi(false)
            .with_writer(make_writer)
            .with_level(true)
            .with_target(true),
    );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to set global tracing subscriber: {e}"))?;

    let rowid_args = if tracing::enabled!(tracing::Level::INFO) {
        env::args().skip(1).collect::<Vec<_>>().join(" ")
    } else {
        String::new()
    };

    tracing::info!("START: {rowid_args}");
    Ok((rowid_args, guard_opt))
}

pub fn log_end(mut rowid_args: String, now: Instant) {
    if tracing::enabled!(tracing::Level::INFO) {
        let ellipsis = if rowid_args.len() > 24 {
            utf8_truncate(&mut rowid_args, 24);
            "..."
        } else {
            ""
        };
        tracing::info!(
            "END \"{rowid_args}{ellipsis}\" elapsed: {}",
            now.elapsed().as_secs_f32()
        );
    }
}

/// Truncate `input` to at most `maxsize` bytes without splitting a UTF-8
/// character.
pub fn utf8_truncate(input: &mut String, maxsize: usize) {
    if input.len() <= maxsize {
        return;
    }
    let mut cut = maxsize;
    while !input.is_char_boundary(cut) {
        cut -= 1;
    }
    input.truncate(cut);
}
