use std::env;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";
const DEFAULT_LOG_FILE: &str = "logs/app.log";

/// Where log output goes. Read from the environment by [`LogSettings::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directive string, e.g. `info,diorama=debug`.
    pub filter: String,
    /// Daily-rolling log file. `None` disables file output.
    pub file: Option<PathBuf>,
}

impl LogSettings {
    /// `RUST_LOG` for the filter, `RUST_LOG_FILE` for the file (empty string disables it).
    pub fn from_env() -> Self {
        let filter = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());
        let file = match env::var("RUST_LOG_FILE") {
            Ok(path) if path.is_empty() => None,
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => Some(PathBuf::from(DEFAULT_LOG_FILE)),
        };
        Self { filter, file }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}

/// Install the global subscriber using settings from the environment.
pub fn init() {
    init_with(LogSettings::from_env());
}

pub fn init_with(settings: LogSettings) {
    let filter = EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    // Console (stderr) layer with file/line
    let console_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .compact();

    let file_layer = settings.file.as_deref().map(|log_path| {
        let (dir, name) = split_log_path(log_path);
        let (nb_writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
        let _ = FILE_GUARD.set(guard);

        fmt::layer()
            .with_writer(nb_writer)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_level(true)
            .compact()
    });

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        // A subscriber is already set (tests, or a second demo in-process).
        return;
    }

    install_panic_hook();
}

fn split_log_path(path: &Path) -> (&Path, &OsStr) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path.file_name().unwrap_or(OsStr::new("app.log"));
    (dir, name)
}

/// Route panics through `tracing` with a captured backtrace.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let mut msg = String::new();
        if let Some(loc) = info.location() {
            msg.push_str(&format!("panic at {}:{}:{} ", loc.file(), loc.line(), loc.column()));
        }
        if let Some(s) = info.payload().downcast_ref::<&str>() {
            msg.push_str(s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            msg.push_str(s);
        } else {
            msg.push_str("<non-string panic>");
        }
        let bt = std::backtrace::Backtrace::force_capture();
        tracing::error!("{}\nBacktrace:\n{:?}", msg, bt);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_without_directory_uses_cwd() {
        let (dir, name) = split_log_path(Path::new("demo.log"));
        assert_eq!(dir, Path::new("."));
        assert_eq!(name, OsStr::new("demo.log"));
    }

    #[test]
    fn log_path_keeps_parent_directory() {
        let (dir, name) = split_log_path(Path::new("logs/fetch.log"));
        assert_eq!(dir, Path::new("logs"));
        assert_eq!(name, OsStr::new("fetch.log"));
    }

    #[test]
    fn default_settings_log_to_file() {
        let settings = LogSettings::default();
        assert_eq!(settings.file.as_deref(), Some(Path::new("logs/app.log")));
        assert!(settings.filter.starts_with("info"));
    }
}
