use std::io::{self, Write};

use indicatif::ProgressBar;

/// Receives search progress. Methods take `&self` so one observer can be
/// shared by parallel workers.
pub trait ProgressObserver {
    /// Called once with the number of leaves a full search evaluates.
    fn set_total(&self, total: u64);

    /// Called once per leaf that did not end the search.
    fn increment(&self);

    fn complete(&self);
}

impl ProgressObserver for ProgressBar {
    fn set_total(&self, total: u64) {
        self.set_length(total);
    }

    fn increment(&self) {
        self.inc(1);
    }

    fn complete(&self) {
        self.abandon();
    }
}

/// Discards all progress.
impl ProgressObserver for () {
    fn set_total(&self, _total: u64) {}

    fn increment(&self) {}

    fn complete(&self) {}
}

/// Log sink that hides `bar` while a line is written, so log output and the
/// bar do not interleave on the terminal.
pub struct SuspendingWriter<W> {
    bar: ProgressBar,
    inner: W,
}

impl<W> SuspendingWriter<W> {
    pub fn new(bar: ProgressBar, inner: W) -> Self {
        Self { bar, inner }
    }
}

impl<W: Write> Write for SuspendingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let inner = &mut self.inner;
        self.bar.suspend(|| inner.write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let inner = &mut self.inner;
        self.bar.suspend(|| inner.write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        let inner = &mut self.inner;
        self.bar.suspend(|| inner.flush())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_tracks_search_progress() {
        let bar = ProgressBar::hidden();
        bar.set_total(10);
        bar.increment();
        bar.increment();
        assert_eq!(bar.length(), Some(10));
        assert_eq!(bar.position(), 2);

        bar.complete();
        assert!(bar.is_finished());
    }

    #[test]
    fn test_writer_passes_lines_through_while_bar_is_active() {
        let bar = ProgressBar::hidden();
        bar.set_total(100);
        bar.increment();

        let mut writer = SuspendingWriter::new(bar.clone(), Vec::new());
        writeln!(writer, "key derivation failed").unwrap();
        writer.flush().unwrap();

        assert_eq!(writer.inner, b"key derivation failed\n");
        assert_eq!(bar.position(), 1);
        assert!(!bar.is_finished());
    }
}
