use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::utils::timestamp;

#[derive(Debug, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
}

impl LogOutput {
    /// Parse `stdout`/`stderr`; `none` or `off` disables console output
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "stdout" => Some(LogOutput::Stdout),
            "none" | "off" => None,
            _ => Some(LogOutput::Stderr),
        }
    }
}

pub struct Logger {
    pub write_to_std: Option<LogOutput>,
    pub severity: Level,
    pub file: Option<Arc<Mutex<File>>>,
    pub enable_colors: bool,
}

impl Logger {
    /// Create a new logger. File output is enabled when `file_path` is given and can be opened.
    pub fn new(
        file_path: Option<PathBuf>,
        severity: Option<Level>,
        write_to_std: Option<LogOutput>,
        enable_colors: bool,
    ) -> Self {
        let file = file_path.and_then(|path| {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .ok()
                .map(|f| Arc::new(Mutex::new(f)))
        });

        Logger {
            write_to_std,
            severity: severity.unwrap_or(Level::Info),
            file,
            enable_colors,
        }
    }

    /// Get color code for log level
    fn get_color(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1b[31m", // Red
            Level::Warn => "\x1b[33m",  // Yellow
            Level::Info => "\x1b[36m",  // Cyan
            Level::Debug => "\x1b[35m", // Magenta
            Level::Trace => "\x1b[37m", // White
        }
    }

    /// Get reset color code
    fn get_reset() -> &'static str {
        "\x1b[0m"
    }

    fn format(&self, record: &Record, colored: bool) -> String {
        let timestamp = timestamp();
        let level_str = record.level().as_str();
        let target = record.target();
        let args = record.args();
        if colored {
            let color = Self::get_color(record.level());
            let reset = Self::get_reset();
            format!("{color}[{timestamp}] {level_str}{reset} {target}: {args}")
        } else {
            format!("[{timestamp}] {level_str} {target}: {args}")
        }
    }

    /// Initialize logger with environment variables
    pub fn init() -> Result<(), log::SetLoggerError> {
        let severity = std::env::var("STRATA_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string())
            .parse::<Level>()
            .unwrap_or(Level::Info);

        let write_to_std = std::env::var("STRATA_LOG_OUTPUT")
            .map(|name| LogOutput::from_name(&name))
            .unwrap_or(Some(LogOutput::Stderr));
        let file_path = std::env::var("STRATA_LOG_FILE").ok().map(PathBuf::from);
        let enable_colors = std::env::var("NO_COLOR").is_err();

        let logger = Logger::new(file_path, Some(severity), write_to_std, enable_colors);
        log::set_max_level(LevelFilter::Trace);
        log::set_logger(Box::leak(Box::new(logger)))?;
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.severity
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if let Some(write_to_std) = &self.write_to_std {
            let line = format!("{}\n", self.format(record, self.enable_colors));
            match write_to_std {
                LogOutput::Stdout => {
                    let _ = std::io::stdout().write_all(line.as_bytes());
                }
                LogOutput::Stderr => {
                    let _ = std::io::stderr().write_all(line.as_bytes());
                }
            }
        }

        // Files never get colors
        if let Some(file) = &self.file {
            if let Ok(mut file_guard) = file.lock() {
                let _ = writeln!(file_guard, "{}", self.format(record, false));
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
        if let Some(file) = &self.file {
            if let Ok(mut file_guard) = file.lock() {
                let _ = file_guard.flush();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_below_severity() {
        let logger = Logger::new(None, Some(Level::Warn), None, false);
        let warn = Metadata::builder().level(Level::Warn).build();
        let info = Metadata::builder().level(Level::Info).build();
        assert!(logger.enabled(&warn));
        assert!(!logger.enabled(&info));
    }

    #[test]
    fn output_names() {
        assert_eq!(LogOutput::from_name("stdout"), Some(LogOutput::Stdout));
        assert_eq!(LogOutput::from_name("STDERR"), Some(LogOutput::Stderr));
        assert_eq!(LogOutput::from_name("off"), None);
    }

    #[test]
    fn writes_plain_lines_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("strata.log");
        let logger = Logger::new(Some(path.clone()), Some(Level::Info), None, true);

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("strata_pages::handlers")
                .args(format_args!("saved page 'squirrel'"))
                .build(),
        );
        logger.flush();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("INFO strata_pages::handlers: saved page 'squirrel'"));
        assert!(!written.contains("\x1b["));
    }
}
