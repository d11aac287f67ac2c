use std::{path::Path, str::FromStr};

use fern::colors::{Color, ColoredLevelConfig};
use thiserror::Error;

use crate::env::{get_env, get_optional_env};

const WORKSPACE_TARGETS: [&str; 3] = ["meme_launch_rs", "meme_launch_utils", "provider_utils"];

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("CARGO_LOG_LEVEL {0:?} invalid")]
    InvalidLevel(String),
    #[error("cannot open log file {path:?}: {source}")]
    LogFile {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    SetLogger(#[from] log::SetLoggerError),
}

/// Install the global logger.
///
/// Records go to stdout with colored levels. When `LOG_FILE` is set the same
/// records are appended, uncolored, to that file (parent directories are created).
pub fn setup_logger(levels: Option<Vec<(String, log::LevelFilter)>>) -> Result<(), LoggerError> {
    let colors = ColoredLevelConfig {
        trace: Color::Cyan,
        debug: Color::Magenta,
        info: Color::Green,
        warn: Color::Yellow,
        error: Color::BrightRed,
    };

    let cargo_log_level_str = get_env("CARGO_LOG_LEVEL", Some("INFO".to_string()));
    let level = log::LevelFilter::from_str(&cargo_log_level_str)
        .map_err(|_| LoggerError::InvalidLevel(cargo_log_level_str.clone()))?;

    let mut dispatch = fern::Dispatch::new()
        .level(log::LevelFilter::Warn)
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!(
                        "{}[{}] {}",
                        chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                        colors.color(record.level()),
                        message
                    ))
                })
                .chain(std::io::stdout()),
        );

    if let Some(log_file) = get_optional_env("LOG_FILE") {
        if let Some(parent) = Path::new(&log_file).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| LoggerError::LogFile {
                    path: log_file.clone(),
                    source,
                })?;
            }
        }
        let file = fern::log_file(&log_file).map_err(|source| LoggerError::LogFile {
            path: log_file.clone(),
            source,
        })?;
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{}[{}][{}] {}",
                        chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                        record.level(),
                        record.target(),
                        message
                    ))
                })
                .chain(file),
        );
    }

    for target in WORKSPACE_TARGETS {
        dispatch = dispatch.level_for(target, level);
    }
    if let Some(bin_name) = current_bin_name() {
        dispatch = dispatch.level_for(bin_name, level);
    }
    if let Some(levels) = levels {
        for (module, level) in levels {
            dispatch = dispatch.level_for(module, level);
        }
    }

    dispatch.apply()?;
    Ok(())
}

fn current_bin_name() -> Option<String> {
    std::env::current_exe()
        .ok()?
        .file_stem()?
        .to_str()?
        .to_owned()
        .into()
}
