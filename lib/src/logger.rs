use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

use chrono::offset::Local;

pub const COMPONENT_TAG: &str = "SENDGRID";

// Same layout as "2009/01/23 01:23:23.123123"
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.6f";

/// Line sink used by `Mailer` to report failed sends.
pub trait Logger: Send + Sync {
    fn print(&self, args: fmt::Arguments<'_>);
}

/// Default logger: one line per message on standard output.
#[derive(Debug, Default)]
pub struct StdoutLogger;

impl Logger for StdoutLogger {
    fn print(&self, args: fmt::Arguments<'_>) {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "{}", args);
    }
}

/// Forwards lines into the `log` facade at error level.
#[derive(Debug, Default)]
pub struct LogCrateLogger;

impl Logger for LogCrateLogger {
    fn print(&self, args: fmt::Arguments<'_>) {
        log::error!(target: "sendgrid", "{}", args);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Level {
    Error,
    Warn,
    Debug,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Error => f.write_str("ERROR"),
            Self::Warn => f.write_str("WARN"),
            Self::Debug => f.write_str("DEBUG"),
        }
    }
}

/// Writes `<timestamp> <LEVEL> SENDGRID <message>` lines to a sink.
///
/// There is no level filtering; every call produces a line.
pub struct LevelLogger {
    sink: Mutex<Box<dyn Write + Send>>,
    timestamps: bool,
}

impl LevelLogger {
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
            timestamps: true,
        }
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Drop the timestamp prefix from every line
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.output(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.output(Level::Warn, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.output(Level::Debug, args);
    }

    fn output(&self, level: Level, args: fmt::Arguments<'_>) {
        let mut line = String::new();

        if self.timestamps {
            line.push_str(&Local::now().format(TIMESTAMP_FORMAT).to_string());
            line.push(' ');
        }

        line.push_str(&format!("{} {} ", level, COMPONENT_TAG));

        // Plain messages are copied as-is
        match args.as_str() {
            Some(msg) => line.push_str(msg),
            None => line.push_str(&args.to_string()),
        }

        if !line.ends_with('\n') {
            line.push('\n');
        }

        let mut sink = match self.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        let _ = sink.write_all(line.as_bytes());
    }
}

impl Default for LevelLogger {
    fn default() -> Self {
        Self::stderr()
    }
}

impl fmt::Debug for LevelLogger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LevelLogger")
            .field("timestamps", &self.timestamps)
            .finish()
    }
}

/// `Mailer` only logs failures, so those lines go out at error level.
impl Logger for LevelLogger {
    fn print(&self, args: fmt::Arguments<'_>) {
        self.error(args);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    /// Shared in-memory sink
    #[derive(Clone, Default)]
    pub(crate) struct Buffer(pub Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_level_prefixes() {
        let buf = Buffer::default();
        let logger = LevelLogger::new(buf.clone()).without_timestamps();

        logger.error(format_args!("failed: {}", 42));
        logger.warn(format_args!("careful"));
        logger.debug(format_args!("detail"));

        assert_eq!(
            buf.contents(),
            "ERROR SENDGRID failed: 42\nWARN SENDGRID careful\nDEBUG SENDGRID detail\n"
        );
    }

    #[test]
    fn test_percent_literal_verbatim() {
        let buf = Buffer::default();
        let logger = LevelLogger::new(buf.clone()).without_timestamps();

        logger.warn(format_args!("100% done %s %d"));

        assert_eq!(buf.contents(), "WARN SENDGRID 100% done %s %d\n");
    }

    #[test]
    fn test_timestamp_prefix() {
        let buf = Buffer::default();
        let logger = LevelLogger::new(buf.clone());

        logger.debug(format_args!("hello"));

        let line = buf.contents();
        // "YYYY/MM/DD HH:MM:SS.ffffff "
        let (stamp, rest) = line.split_at(27);
        assert_eq!(&stamp[4..5], "/");
        assert_eq!(&stamp[19..20], ".");
        assert_eq!(rest, "DEBUG SENDGRID hello\n");
    }

    #[test]
    fn test_logger_trait_uses_error_level() {
        let buf = Buffer::default();
        let logger = LevelLogger::new(buf.clone()).without_timestamps();

        Logger::print(&logger, format_args!("status = {}", 500));

        assert_eq!(buf.contents(), "ERROR SENDGRID status = 500\n");
    }
}
