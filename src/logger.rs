//! Per-session log file for MatPack.
//!
//! One file, truncated at launch:
//!   Windows:  `%APPDATA%\MatPack\matpack.log`
//!   Linux:    `~/.local/share/MatPack/matpack.log`
//!   macOS:    `~/Library/Application Support/MatPack/matpack.log`
//!
//! Log through `log_info!` / `log_warn!` / `log_err!`. Until [`init`] runs
//! (unit tests, early CLI parsing) lines only reach stderr, and only when
//! echo is on.

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

struct Session {
    path: PathBuf,
    file: Mutex<File>,
}

static SESSION: OnceLock<Session> = OnceLock::new();
/// Mirror lines to stderr (CLI `--verbose`).
static ECHO: AtomicBool = AtomicBool::new(false);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        })
    }
}

/// Folder holding the session log; `None` before [`init`] succeeded.
pub fn log_dir() -> Option<PathBuf> {
    SESSION.get().and_then(|s| s.path.parent()).map(Path::to_path_buf)
}

pub fn set_echo(enabled: bool) {
    ECHO.store(enabled, Ordering::Relaxed);
}

/// Backend of the logging macros. I/O errors are swallowed.
pub fn write(level: Level, args: fmt::Arguments<'_>) {
    append(&format_line(clock(), level, args));
}

fn append(line: &str) {
    if ECHO.load(Ordering::Relaxed) {
        eprintln!("{}", line);
    }
    if let Some(session) = SESSION.get()
        && let Ok(mut file) = session.file.lock()
    {
        let _ = writeln!(file, "{}", line);
    }
}

fn format_line(clock: String, level: Level, args: fmt::Arguments<'_>) -> String {
    format!("[{}] [{:<5}] {}", clock, level, args)
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Info, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Warn, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Error, format_args!($($arg)*))
    };
}

/// Open (truncating) the session log and hook panics into it.
/// A log file that cannot be created is reported on stderr and skipped.
pub fn init() {
    let path = data_dir().join("MatPack").join("matpack.log");
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let file = match File::create(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("MatPack: cannot open log file {}: {}", path.display(), e);
            return;
        }
    };
    let _ = SESSION.set(Session {
        path: path.clone(),
        file: Mutex::new(file),
    });

    append(&format!("MatPack {} log: {}", env!("CARGO_PKG_VERSION"), path.display()));

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        append(&format!("[{}] [PANIC] {}", clock(), info));
        prev(info);
    }));
}

/// Platform data directory (without the app sub-folder).
fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(appdata) = std::env::var("APPDATA") {
        return PathBuf::from(appdata);
    }
    #[cfg(target_os = "macos")]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join("Library").join("Application Support");
    }
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".local").join("share"),
        Err(_) => PathBuf::from("."),
    }
}

/// UTC time of day, `HH:MM:SS`.
fn clock() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{:02}:{:02}:{:02}", (secs % 86400) / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_time_of_day() {
        let c = clock();
        assert_eq!(c.len(), 8);
        assert_eq!(&c[2..3], ":");
        assert_eq!(&c[5..6], ":");
    }

    #[test]
    fn lines_carry_padded_level_tag() {
        let line = format_line("12:00:00".into(), Level::Warn, format_args!("{} maps", 3));
        assert_eq!(line, "[12:00:00] [WARN ] 3 maps");
        let line = format_line("12:00:00".into(), Level::Error, format_args!("x"));
        assert_eq!(line, "[12:00:00] [ERROR] x");
    }

    #[test]
    fn logging_before_init_is_harmless() {
        crate::log_warn!("not initialised: {}", 1);
        assert!(log_dir().is_none());
    }
}
