//! `env_logger` wiring for the CLI. Parse warnings and graph/slice
//! diagnostics go through `log::warn!`/`log::debug!` rather
//! than `eprintln!`, so callers driving this crate as a library can
//! capture them with their own subscriber.

use std::io::Write;

use owo_colors::OwoColorize;

/// Initializes the global logger. `verbose` bumps the default filter from
/// `warn` to `debug`; `RUST_LOG` always wins if set, matching the usual
/// `env_logger` convention.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let level = record.level();
            let styled = match level {
                log::Level::Error => level.to_string().red().to_string(),
                log::Level::Warn => level.to_string().yellow().to_string(),
                log::Level::Info => level.to_string().green().to_string(),
                log::Level::Debug | log::Level::Trace => level.to_string().dimmed().to_string(),
            };
            writeln!(buf, "{styled}: {}", record.args())
        })
        .init();
}
