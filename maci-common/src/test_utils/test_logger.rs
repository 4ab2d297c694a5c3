use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use slog::{Drain, Logger};
use slog_async::Async;
use slog_term::{CompactFormat, PlainDecorator};

/// Logger builder for tests.
pub struct TestLogger;

impl TestLogger {
    fn from_writer<W: io::Write + Send + 'static>(writer: W) -> Logger {
        let decorator = PlainDecorator::new(writer);
        let drain = CompactFormat::new(decorator).build().fuse();
        let drain = Async::new(drain).build().fuse();
        Logger::root(Arc::new(drain), slog::o!())
    }

    /// Logger writing to the test harness stdout, captured unless `--nocapture`.
    pub fn stdout() -> Logger {
        Self::from_writer(slog_term::TestStdoutWriter)
    }

    /// Logger writing to the given file, flushed when the logger is dropped.
    pub fn file(filepath: &Path) -> Logger {
        Self::from_writer(File::create(filepath).unwrap())
    }
}
