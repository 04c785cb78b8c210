use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Initialise logging. Without `debug` the level is forced to `info`
/// regardless of `RUST_LOG`; with `debug` the default is `debug` and
/// `RUST_LOG` may override it.
///
/// When `log_file` is given, output goes to that file instead of stderr. If
/// the file cannot be opened, stderr is used and a warning is logged. Only
/// the first call in a process installs a subscriber.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let writer = match log_file.as_deref().map(file_appender) {
        Some(Ok(writer)) => Ok(Some(writer)),
        Some(Err(err)) => Err(err),
        None => Ok(None),
    };

    match writer {
        Ok(Some(writer)) => {
            let _ = builder.with_ansi(false).with_writer(writer).try_init();
        }
        Ok(None) => {
            let _ = builder.try_init();
        }
        Err(err) => {
            let _ = builder.try_init();
            tracing::warn!(?err, "unable to open log file, logging to stderr");
        }
    }
}

fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("log path has no file name: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy().into_owned())
        .build(dir)
        .with_context(|| format!("open log file {}", path.display()))
}
