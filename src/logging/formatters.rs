use core::fmt;

use super::{color::level_color, logger::Config, Level, LogFormatter};

pub struct DefaultFormatter {
    config: Config,
}

impl DefaultFormatter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn timestamp(&self) -> String {
        let color = if self.config.use_ansi {
            "\x1b[0;90m"
        } else {
            ""
        };

        let time = chrono::Local::now().format(&self.config.datetime_format);
        format!("{}[{}]{}", color, time, self.reset())
    }

    fn format_level(&self, level: Level) -> String {
        let tag = match level {
            Level::Critical => "CRT",
            Level::Error => "ERR",
            Level::Warning => "WRN",
            Level::Notice => "NTC",
            Level::Info => "INF",
            Level::Debug => "DBG",
        };

        if self.config.use_ansi {
            format!("{}{}{}", level_color("bold", level), tag, self.reset())
        } else {
            tag.to_string()
        }
    }

    fn reset(&self) -> &str {
        if self.config.use_ansi {
            level_color("reset", Level::Info)
        } else {
            ""
        }
    }

    fn format_location(&self, record: &log::Record) -> String {
        match (self.config.show_location, record.file(), record.line()) {
            (true, Some(file), Some(line)) => format!(" {}:{}", file, line),
            (true, Some(file), None) => format!(" {}", file),
            _ => String::new(),
        }
    }

    fn format_msg<'a>(&self, args: &fmt::Arguments<'a>) -> String {
        format!("{}", args)
    }
}

impl LogFormatter for DefaultFormatter {
    fn format(&self, record: &log::Record) -> String {
        format!(
            "{} {}{}: {}",
            self.timestamp(),
            self.format_level(record.level().into()),
            self.format_location(record),
            self.format_msg(record.args()),
        )
    }
}
