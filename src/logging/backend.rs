use std::io::{self, Write};

use super::{Backend, Colorizer, Destination, Flags, Level, LineSink, Record};

/// Renders a record, colored or not, and hands it to the destination as one write.
///
/// The record is rendered one frame below the caller and the destination is told two
/// frames, which keeps reported source locations pointing at the original call site.
pub(crate) fn write_record<D>(
    destination: &D,
    colorizer: &Colorizer,
    level: Level,
    call_depth: usize,
    record: &dyn Record,
) -> io::Result<()>
where
    D: Destination + ?Sized,
{
    let formatted = record.formatted(call_depth + 1);
    let text = colorizer.paint(level, &formatted);
    destination.output(call_depth + 2, &text)
}

/// Backend over a fixed destination such as stderr or an already opened file.
pub struct StaticBackend<D> {
    destination: D,
    colorizer: Colorizer,
}

impl<W: Write + Send> StaticBackend<LineSink<W>> {
    pub fn new(out: W, prefix: impl Into<String>, flags: Flags) -> Self {
        Self::with_destination(LineSink::new(out, prefix, flags))
    }
}

impl<D: Destination> StaticBackend<D> {
    pub fn with_destination(destination: D) -> Self {
        Self {
            destination,
            colorizer: Colorizer::default(),
        }
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.colorizer.enabled = enabled;
        self
    }

    pub fn with_color_config(mut self, overrides: Vec<String>) -> Self {
        self.colorizer.overrides = overrides;
        self
    }

    pub fn destination(&self) -> &D {
        &self.destination
    }
}

impl<D: Destination> Backend for StaticBackend<D> {
    fn log(&self, level: Level, call_depth: usize, record: &dyn Record) -> io::Result<()> {
        write_record(&self.destination, &self.colorizer, level, call_depth, record)
    }

    fn flush(&self) -> io::Result<()> {
        self.destination.flush()
    }
}
