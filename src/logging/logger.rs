use std::{io::IsTerminal, path::PathBuf};

use eyre::Context;
use log::{LevelFilter, Log};

use super::{
    formatters::DefaultFormatter, sinks::NullSink, Backend, FileOpener, Flags, FsOpener, Level,
    LogFormatter, Record, RotatingFileBackend, StaticBackend,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub enabled: bool,
    pub datetime_format: String,
    /// Colors the level tag written by the default formatter.
    pub use_ansi: bool,
    /// Colors whole lines in the backend.
    pub color: bool,
    /// Per-level color overrides, indexed by `Level::index()`; empty entries keep the default.
    pub color_config: Vec<String>,
    pub prefix: String,
    pub flags: Flags,
    pub show_location: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            enabled: true,
            datetime_format: "%Y-%m-%d %H:%M:%S".to_string(),
            use_ansi: true,
            color: false,
            color_config: Vec::new(),
            prefix: String::new(),
            flags: Flags::NONE,
            show_location: false,
        }
    }

    /// Turns both kinds of coloring on only when stderr is a terminal.
    pub fn detect_ansi(self) -> Self {
        let tty = std::io::stderr().is_terminal();
        Self {
            use_ansi: tty,
            color: tty,
            ..self
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapts a `log::Record` to the backend's record interface.
struct LogRecord<'a> {
    record: &'a log::Record<'a>,
    formatter: &'a dyn LogFormatter,
}

impl Record for LogRecord<'_> {
    fn formatted(&self, _call_depth: usize) -> String {
        self.formatter.format(self.record)
    }
}

pub struct Logger {
    filter: LevelFilter,
    backend: Box<dyn Backend>,
    formatter: Box<dyn LogFormatter>,
    config: Config,
}

impl Logger {
    pub fn new(
        filter: LevelFilter,
        backend: Box<dyn Backend>,
        formatter: Box<dyn LogFormatter>,
        config: Config,
    ) -> Self {
        Self {
            filter,
            backend,
            formatter,
            config,
        }
    }

    pub fn init(self) -> eyre::Result<()> {
        log::set_max_level(self.filter);
        log::set_boxed_logger(Box::new(self)).context("Failed registering boxed logger")?;

        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.config.enabled && self.filter >= metadata.level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let rec = LogRecord {
            record,
            formatter: self.formatter.as_ref(),
        };
        if let Err(err) = self.backend.log(Level::from(record.level()), 0, &rec) {
            eprintln!("daylog: failed writing log record: {}", err);
        }
    }

    fn flush(&self) {
        if let Err(err) = self.backend.flush() {
            eprintln!("daylog: failed flushing log backend: {}", err);
        }
    }
}

type BackendConstructor = Box<dyn Fn(&Config) -> eyre::Result<Box<dyn Backend>>>;

pub struct Builder {
    filter: LevelFilter,
    constructor: BackendConstructor,
    formatter_builder: Box<dyn Fn(Config) -> Box<dyn LogFormatter + 'static>>,
    config: Config,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            filter: LevelFilter::Off,
            constructor: Box::new(|_| {
                Ok(Box::new(StaticBackend::with_destination(NullSink::new())))
            }),
            formatter_builder: Box::new(|config| Box::new(DefaultFormatter::new(config))),
            config: Config::new(),
        }
    }

    pub fn with_level(self, filter: LevelFilter) -> Self {
        Self { filter, ..self }
    }

    pub fn with_config(self, config: Config) -> Self {
        Self { config, ..self }
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.config.color = enabled;
        self
    }

    pub fn with_color_config(mut self, overrides: Vec<String>) -> Self {
        self.config.color_config = overrides;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.config.flags = flags;
        self
    }

    pub fn with_formatter<F>(self, formatter_builder: F) -> Self
    where
        F: Fn(Config) -> Box<dyn LogFormatter + 'static> + 'static,
    {
        Self {
            formatter_builder: Box::new(formatter_builder),
            ..self
        }
    }

    pub fn with_null_sink(self) -> Self {
        Self {
            constructor: Box::new(|_| {
                Ok(Box::new(StaticBackend::with_destination(NullSink::new())))
            }),
            ..self
        }
    }

    pub fn with_stderr_sink(self) -> Self {
        Self {
            constructor: Box::new(|config| {
                let backend =
                    StaticBackend::new(std::io::stderr(), config.prefix.clone(), config.flags)
                        .with_color(config.color)
                        .with_color_config(config.color_config.clone());
                Ok(Box::new(backend))
            }),
            ..self
        }
    }

    pub fn with_file_sink(self, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        Self {
            constructor: Box::new(move |config| {
                let file = FsOpener.open(&path).with_context(|| {
                    format!("Failed opening or creating log file {}", path.display())
                })?;
                let backend = StaticBackend::new(file, config.prefix.clone(), config.flags)
                    .with_color(config.color)
                    .with_color_config(config.color_config.clone());
                Ok(Box::new(backend))
            }),
            ..self
        }
    }

    /// Logs to `<base_path>.<YYYY-MM-DD>`, moving to a new file every local calendar day.
    pub fn with_rotating_file_sink(self, base_path: impl Into<PathBuf>) -> Self {
        let base_path: PathBuf = base_path.into();
        Self {
            constructor: Box::new(move |config| {
                let backend = RotatingFileBackend::open(
                    base_path.clone(),
                    config.prefix.clone(),
                    config.flags,
                )?
                .with_color(config.color)
                .with_color_config(config.color_config.clone());
                Ok(Box::new(backend))
            }),
            ..self
        }
    }

    pub fn build(&self) -> eyre::Result<Logger> {
        let backend = (self.constructor)(&self.config)?;
        let formatter = (self.formatter_builder)(self.config.clone());
        Ok(Logger::new(self.filter, backend, formatter, self.config.clone()))
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_builder_discards_everything() {
        let logger = Builder::new()
            .with_level(LevelFilter::Trace)
            .build()
            .unwrap();
        let args = format_args!("nowhere");
        let record = log::Record::builder()
            .args(args)
            .level(log::Level::Info)
            .build();

        assert!(logger.enabled(record.metadata()));
        logger.log(&record);
    }

    #[test]
    fn filter_and_enabled_flag_gate_records() {
        let logger = Builder::new()
            .with_level(LevelFilter::Warn)
            .build()
            .unwrap();
        let debug = log::Metadata::builder().level(log::Level::Debug).build();
        let error = log::Metadata::builder().level(log::Level::Error).build();
        assert!(!logger.enabled(&debug));
        assert!(logger.enabled(&error));

        let disabled = Builder::new()
            .with_level(LevelFilter::Trace)
            .with_config(Config {
                enabled: false,
                ..Config::new()
            })
            .build()
            .unwrap();
        assert!(!disabled.enabled(&error));
    }

    #[test]
    fn file_sink_reports_unopenable_path() {
        let err = Builder::new()
            .with_file_sink("/nonexistent-dir/for/daylog/app.log")
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed opening or creating log file"));
    }
}
