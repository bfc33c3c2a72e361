use std::{
    io::{self, Write},
    ops::BitOr,
    sync::Mutex,
};

use chrono::{DateTime, Local, TimeZone, Utc};

use super::Destination;

/// Header decoration applied by a [`LineSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags(u32);

impl Flags {
    pub const NONE: Flags = Flags(0);
    /// `2009/01/23 `
    pub const DATE: Flags = Flags(1);
    /// `01:23:23 `
    pub const TIME: Flags = Flags(1 << 1);
    /// `01:23:23.123123 `, implies `TIME`.
    pub const MICROSECONDS: Flags = Flags(1 << 2);
    /// Header in UTC instead of local time.
    pub const UTC: Flags = Flags(1 << 5);
    /// Prefix goes right before the message instead of at the start of the line.
    pub const MSG_PREFIX: Flags = Flags(1 << 6);
    pub const STD: Flags = Flags(Self::DATE.0 | Self::TIME.0);

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

/// Writes one line per call to the wrapped writer, decorated with a prefix and an optional
/// date/time header.
pub struct LineSink<W> {
    prefix: String,
    flags: Flags,
    out: Mutex<W>,
}

impl<W: Write + Send> LineSink<W> {
    pub fn new(out: W, prefix: impl Into<String>, flags: Flags) -> Self {
        Self {
            prefix: prefix.into(),
            flags,
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> io::Result<W> {
        self.out.into_inner().map_err(|_| poisoned())
    }

    fn header<Tz: TimeZone>(&self, buf: &mut String, now: DateTime<Tz>)
    where
        Tz::Offset: std::fmt::Display,
    {
        if self.flags.contains(Flags::DATE) {
            buf.push_str(&now.format("%Y/%m/%d ").to_string());
        }
        if self.flags.contains(Flags::MICROSECONDS) {
            buf.push_str(&now.format("%H:%M:%S%.6f ").to_string());
        } else if self.flags.contains(Flags::TIME) {
            buf.push_str(&now.format("%H:%M:%S ").to_string());
        }
    }

    fn render(&self, text: &str) -> String {
        let mut buf = String::with_capacity(self.prefix.len() + text.len() + 28);
        if !self.flags.contains(Flags::MSG_PREFIX) {
            buf.push_str(&self.prefix);
        }
        if self.flags.contains(Flags::UTC) {
            self.header(&mut buf, Utc::now());
        } else {
            self.header(&mut buf, Local::now());
        }
        if self.flags.contains(Flags::MSG_PREFIX) {
            buf.push_str(&self.prefix);
        }
        buf.push_str(text);
        if !text.ends_with('\n') {
            buf.push('\n');
        }
        buf
    }
}

impl<W: Write + Send> Destination for LineSink<W> {
    fn output(&self, _call_depth: usize, text: &str) -> io::Result<()> {
        let line = self.render(text);
        let mut out = self.out.lock().map_err(|_| poisoned())?;
        out.write_all(line.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        self.out.lock().map_err(|_| poisoned())?.flush()
    }
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "log writer lock poisoned")
}

pub struct NullSink {}

impl NullSink {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for NullSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Destination for NullSink {
    fn output(&self, _call_depth: usize, _text: &str) -> io::Result<()> {
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(sink: LineSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn bare_sink_appends_newline_once() {
        let sink = LineSink::new(Vec::new(), "", Flags::NONE);
        sink.output(2, "first").unwrap();
        sink.output(2, "second\n").unwrap();
        assert_eq!(written(sink), "first\nsecond\n");
    }

    #[test]
    fn call_depth_does_not_change_the_line() {
        let shallow = LineSink::new(Vec::new(), "", Flags::NONE);
        let deep = LineSink::new(Vec::new(), "", Flags::NONE);
        shallow.output(0, "same").unwrap();
        deep.output(40, "same").unwrap();
        assert_eq!(written(shallow), written(deep));
    }

    #[test]
    fn prefix_leads_the_line_by_default() {
        let sink = LineSink::new(Vec::new(), "[app] ", Flags::NONE);
        sink.output(0, "hello").unwrap();
        assert_eq!(written(sink), "[app] hello\n");
    }

    #[test]
    fn msg_prefix_follows_the_header() {
        let sink = LineSink::new(Vec::new(), "[app] ", Flags::DATE | Flags::MSG_PREFIX);
        sink.output(0, "hello").unwrap();
        let out = written(sink);
        // "YYYY/MM/DD [app] hello\n"
        assert_eq!(out.len(), 11 + "[app] hello\n".len());
        assert!(out.ends_with(" [app] hello\n"));
        assert_eq!(&out[4..5], "/");
    }

    #[test]
    fn microseconds_imply_time() {
        let sink = LineSink::new(Vec::new(), "", Flags::MICROSECONDS | Flags::UTC);
        sink.output(0, "x").unwrap();
        let out = written(sink);
        // "HH:MM:SS.uuuuuu x\n"
        assert_eq!(out.len(), 16 + "x\n".len());
        assert_eq!(&out[8..9], ".");
    }

    #[test]
    fn flags_compose() {
        assert!(Flags::STD.contains(Flags::DATE));
        assert!(Flags::STD.contains(Flags::TIME));
        assert!(!Flags::STD.contains(Flags::UTC));
        assert!(Flags::NONE.contains(Flags::NONE));
    }
}
