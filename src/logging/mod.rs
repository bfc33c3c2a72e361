use std::io;

mod backend;
mod color;
mod formatters;
mod level;
mod logger;
mod rotating;
mod sinks;

pub use backend::StaticBackend;
pub use color::{
    color_seq, color_seq_bold, convert_colors, level_color, Color, Colorizer, COLOR_RESET,
};
pub use formatters::DefaultFormatter;
pub use level::{Level, ParseLevelError};
pub use logger::{Builder, Config, Logger};
pub use rotating::{Clock, FileOpener, FsOpener, RotatingFileBackend, SystemClock};
pub use sinks::{Flags, LineSink, NullSink};

/// A log entry built by the front end. Backends only ever ask it for its rendered text.
pub trait Record {
    /// Renders the record. `call_depth` counts the frames between the call site and the
    /// renderer, for formatters that report source locations.
    fn formatted(&self, call_depth: usize) -> String;
}

impl<F> Record for F
where
    F: Fn(usize) -> String,
{
    fn formatted(&self, call_depth: usize) -> String {
        self(call_depth)
    }
}

pub trait LogFormatter: Sync + Send {
    fn format(&self, record: &log::Record) -> String;
}

/// Accepts leveled records and writes a rendered form somewhere.
pub trait Backend: Sync + Send {
    fn log(&self, level: Level, call_depth: usize, record: &dyn Record) -> io::Result<()>;

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// The line writer a backend renders into. Implementations must serialize concurrent
/// `output` calls so that one call lands as one contiguous write.
pub trait Destination: Sync + Send {
    /// Writes one rendered record. `call_depth` is two frames deeper than the depth given to
    /// [`Backend::log`]. [`LineSink`] does not report source locations and ignores it;
    /// `log::Record::file`/`line` reach the text through the formatter instead.
    fn output(&self, call_depth: usize, text: &str) -> io::Result<()>;

    fn flush(&self) -> io::Result<()>;
}
