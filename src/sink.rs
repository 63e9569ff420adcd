//! Buffered finding output.
//!
//! The merge phase runs on one thread, so the writer needs no locking; it
//! buffers aggressively (64 KiB, large enough that syscalls stop mattering
//! and small enough to stay cache-resident) and writes match text as raw
//! bytes, since wildcard positions may have matched non-UTF-8 source
//! bytes.
//!
//! # Error policy
//!
//! `BrokenPipe` on stdout is normal CLI behavior (`mtfind ... | head`) and
//! silently ends output. Any other write error is recorded; subsequent
//! writes become no-ops and [`FindingWriter::finish`] returns the error.

use std::io::{self, BufWriter, ErrorKind, Write};

/// Output buffer size.
pub const OUTPUT_BUF_CAPACITY: usize = 64 * 1024;

enum Status {
    Healthy,
    /// Reader went away; swallow the rest of the output.
    Gone,
    Failed(io::Error),
}

/// Formats the count line and per-finding records to a byte sink.
pub struct FindingWriter<W: Write> {
    out: BufWriter<W>,
    status: Status,
}

impl<W: Write> FindingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            out: BufWriter::with_capacity(OUTPUT_BUF_CAPACITY, inner),
            status: Status::Healthy,
        }
    }

    /// Writes the total-count line. Call exactly once, before any finding.
    pub fn write_total(&mut self, total: u64) {
        self.guarded(|out| writeln!(out, "{total}"));
    }

    /// Writes one `line column match` record.
    pub fn write_finding(&mut self, line: u64, column: u64, text: &[u8]) {
        self.guarded(|out| {
            write!(out, "{line} {column} ")?;
            out.write_all(text)?;
            out.write_all(b"\n")
        });
    }

    /// Flushes and returns the first recorded error, if any.
    pub fn finish(mut self) -> io::Result<()> {
        self.guarded(|out| out.flush());
        match self.status {
            Status::Healthy | Status::Gone => Ok(()),
            Status::Failed(err) => Err(err),
        }
    }

    fn guarded(&mut self, op: impl FnOnce(&mut BufWriter<W>) -> io::Result<()>) {
        if !matches!(self.status, Status::Healthy) {
            return;
        }
        if let Err(err) = op(&mut self.out) {
            self.status = if err.kind() == ErrorKind::BrokenPipe {
                Status::Gone
            } else {
                Status::Failed(err)
            };
        }
    }
}
