use ansi_term::{ANSIString, Color, Style};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Writes log records to stderr, one line each. Records from dependencies are dropped.
pub struct Logger {
    colors_enabled: bool,
}

impl Logger {
    fn prefix(&self, level: Level) -> ANSIString<'static> {
        let style = match (self.colors_enabled, level) {
            (false, _) => Style::new(),
            (true, Level::Error) => Color::Red.bold(),
            (true, Level::Warn) => Color::Yellow.bold(),
            (true, Level::Info) => Color::Cyan.bold(),
            (true, Level::Debug | Level::Trace) => Color::Purple.normal(),
        };
        style.paint(format!("[{}]", level.as_str().to_lowercase()))
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with("argcheck")
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Debug | Level::Trace => eprintln!(
                "{} {}: {}",
                self.prefix(record.level()),
                record.target(),
                record.args()
            ),
            level => eprintln!("{} {}", self.prefix(level), record.args()),
        }
    }

    fn flush(&self) {}
}

pub fn init(max_level: LevelFilter, colors_enabled: bool) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(Logger { colors_enabled }))?;
    log::set_max_level(max_level);
    Ok(())
}
