// src/cli/logging.rs

use crate::context::Context;
use anyhow::{Context as _, Result};
use log::LevelFilter;
use std::fs::File;

/// Initializes the global logger from the parsed CLI context. Called exactly
/// once, before anything else runs.
///
/// Without `-logLevel` this is a stock `env_logger` honoring `RUST_LOG`, at
/// `info` by default. With `-logLevel` the level comes from the CLI, and the
/// sink is redirected to `-logFile` (its lazily resolved default included).
pub fn init(context: &Context) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    );
    if let Some(level) = context.get("logLevel") {
        builder.filter_level(parse_level(level));
        if let Some(path) = super::log_file_option().value(context) {
            let file = File::create(&path)
                .with_context(|| format!("Cannot open log file {}", path))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }
    builder.init();
    Ok(())
}

/// Maps the documented level names onto [`LevelFilter`]. `FATAL` has no
/// direct counterpart and maps to `Error`; so does an unrecognized name,
/// which [`super::check_global_options`] rejects before any run starts.
fn parse_level(level: &str) -> LevelFilter {
    match level {
        "TRACE" => LevelFilter::Trace,
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARN" => LevelFilter::Warn,
        _ => LevelFilter::Error,
    }
}
