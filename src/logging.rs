use std::io::Write;
use std::sync::OnceLock;

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::config::LOG_ENV;

/// Writes `[LEVEL file:line] message` lines to stderr, colored only when
/// stderr is a terminal. Stdout stays free for the probe report.
struct StderrLogger {
    color: bool,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = render(record, self.color);
        // one locked write per record so lines from threads never interleave
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn color_code(level: Level) -> u8 {
    match level {
        Level::Error => 31,
        Level::Warn => 93,
        Level::Info => 34,
        Level::Debug => 32,
        Level::Trace => 90,
    }
}

fn render(record: &Record, color: bool) -> String {
    let body = format!(
        "[{} {}:{}] {}",
        record.level(),
        record.file().unwrap_or("??.rs"),
        record.line().unwrap_or(0),
        record.args()
    );
    if color {
        format!("\u{1b}[{}m{body}\u{1b}[0m\n", color_code(record.level()))
    } else {
        body + "\n"
    }
}

/// Map a `LOG` value to a filter; anything unknown turns logging off.
pub fn level_filter(value: Option<&str>) -> LevelFilter {
    match value.map(str::to_ascii_lowercase).as_deref() {
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Off,
    }
}

/// Install the logger. `LOG` from the environment wins over the build-time one.
/// Calling it again only updates the level.
pub fn init() {
    static LOGGER: OnceLock<StderrLogger> = OnceLock::new();
    let logger = LOGGER.get_or_init(|| StderrLogger {
        color: unsafe { libc::isatty(libc::STDERR_FILENO) } == 1,
    });
    let _ = log::set_logger(logger);
    let runtime = std::env::var(LOG_ENV).ok();
    log::set_max_level(level_filter(runtime.as_deref().or(option_env!("LOG"))));
}
