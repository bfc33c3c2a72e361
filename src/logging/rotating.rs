use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use arc_swap::ArcSwap;
use eyre::Context;

use super::{
    backend::write_record, Backend, Colorizer, Destination, Flags, Level, LineSink, Record,
};
use crate::utils::{local_date_key, rotated_path};

/// Source of the calendar date used to name log files.
pub trait Clock: Send + Sync {
    /// Today's date as `YYYY-MM-DD`.
    fn date_key(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn date_key(&self) -> String {
        local_date_key()
    }
}

/// Opens the file for a new day.
pub trait FileOpener: Send + Sync {
    type File: Write + Send + 'static;

    fn open(&self, path: &Path) -> io::Result<Self::File>;
}

/// Opens files read-write in append mode, creating them if needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsOpener;

impl FileOpener for FsOpener {
    type File = File;

    fn open(&self, path: &Path) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.read(true).create(true).append(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }

        options.open(path)
    }
}

struct Current<F> {
    date_key: String,
    path: PathBuf,
    sink: LineSink<F>,
}

/// File backend that switches to `<base_path>.<YYYY-MM-DD>` the first time it is used on a
/// new local calendar day.
///
/// Writers load the current file without locking. Only a caller that sees a stale date
/// takes the rotation lock, and the lock is released before its own write. A file that is
/// replaced stays alive until writes already holding it are done, then it is closed.
///
/// If the new day's file cannot be opened the backend keeps writing to the old one and
/// tries again on the next call. Failures are counted in [`rotation_failures`] and never
/// returned from [`Backend::log`].
///
/// [`rotation_failures`]: RotatingFileBackend::rotation_failures
pub struct RotatingFileBackend<O: FileOpener = FsOpener, C: Clock = SystemClock> {
    current: ArcSwap<Current<O::File>>,
    rotation: Mutex<()>,
    base_path: PathBuf,
    colorizer: Colorizer,
    opener: O,
    clock: C,
    rotation_failures: AtomicU64,
}

impl RotatingFileBackend {
    /// `file` must already be open for `date_key`; `base_path` is the path without a date
    /// suffix.
    pub fn new(
        file: File,
        prefix: impl Into<String>,
        flags: Flags,
        base_path: impl Into<PathBuf>,
        date_key: impl Into<String>,
    ) -> Self {
        Self::with_parts(file, prefix, flags, base_path, date_key, FsOpener, SystemClock)
    }

    /// Opens today's file under `base_path` and starts from there.
    pub fn open(
        base_path: impl Into<PathBuf>,
        prefix: impl Into<String>,
        flags: Flags,
    ) -> eyre::Result<Self> {
        let base_path = base_path.into();
        let date_key = SystemClock.date_key();
        let path = rotated_path(&base_path, &date_key);
        let file = FsOpener
            .open(&path)
            .with_context(|| format!("Failed opening or creating log file {}", path.display()))?;

        Ok(Self::new(file, prefix, flags, base_path, date_key))
    }
}

impl<O: FileOpener, C: Clock> RotatingFileBackend<O, C> {
    pub fn with_parts(
        file: O::File,
        prefix: impl Into<String>,
        flags: Flags,
        base_path: impl Into<PathBuf>,
        date_key: impl Into<String>,
        opener: O,
        clock: C,
    ) -> Self {
        let base_path = base_path.into();
        let date_key = date_key.into();
        let current = Current {
            path: rotated_path(&base_path, &date_key),
            sink: LineSink::new(file, prefix, flags),
            date_key,
        };

        Self {
            current: ArcSwap::from_pointee(current),
            rotation: Mutex::new(()),
            base_path,
            colorizer: Colorizer::default(),
            opener,
            clock,
            rotation_failures: AtomicU64::new(0),
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

    /// Date of the file currently written to.
    pub fn date_key(&self) -> String {
        self.current.load().date_key.clone()
    }

    /// Path of the file currently written to, assuming the initial file followed the
    /// `<base_path>.<date_key>` naming.
    pub fn current_path(&self) -> PathBuf {
        self.current.load().path.clone()
    }

    /// Number of rotation attempts whose file could not be opened.
    pub fn rotation_failures(&self) -> u64 {
        self.rotation_failures.load(Ordering::Relaxed)
    }

    fn rotate_if_stale(&self) {
        let today = self.clock.date_key();
        if self.current.load().date_key != today {
            self.rotate_to(today);
        }
    }

    fn rotate_to(&self, today: String) {
        // Guards no data, so a panic elsewhere while holding it leaves nothing inconsistent.
        let _rotation = self.rotation.lock().unwrap_or_else(PoisonError::into_inner);
        // `today` was read before the lock; another caller may have moved past it since.
        // Date keys sort chronologically as strings.
        if self.current.load().date_key >= today {
            return;
        }

        let path = rotated_path(&self.base_path, &today);
        match self.opener.open(&path) {
            Ok(file) => {
                let next = Current {
                    sink: LineSink::new(file, "", Flags::NONE),
                    path,
                    date_key: today,
                };
                let previous = self.current.swap(Arc::new(next));
                tracing::debug!(
                    target: "daylog",
                    from = %previous.path.display(),
                    to = %self.current.load().path.display(),
                    "rotated log file"
                );
                // Closes the old file unless a concurrent write still holds it; the last
                // holder closes it then.
                drop(previous);
            }
            Err(err) => {
                self.rotation_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    target: "daylog",
                    path = %path.display(),
                    error = %err,
                    "failed opening rotated log file, still writing to the previous one"
                );
            }
        }
    }
}

impl<O: FileOpener, C: Clock> Backend for RotatingFileBackend<O, C> {
    fn log(&self, level: Level, call_depth: usize, record: &dyn Record) -> io::Result<()> {
        self.rotate_if_stale();

        let current = self.current.load_full();
        write_record(&current.sink, &self.colorizer, level, call_depth, record)
    }

    fn flush(&self) -> io::Result<()> {
        self.current.load_full().sink.flush()
    }
}
