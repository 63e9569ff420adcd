//! Lazy line splitting over byte sources.
//!
//! Two producers with the same contract, different ownership:
//!
//! - [`RegionSplitter`] iterates borrowed subranges of a random-access
//!   region (mapped file, in-memory buffer). Zero allocation, zero copy.
//! - [`StreamSplitter`] iterates owned lines pulled from any [`BufRead`]
//!   source (stdin, pipe, unmappable file).
//!
//! # Contract
//!
//! Exactly one chunk per delimiter-terminated region, plus one trailing
//! chunk when the final region is not delimiter-terminated. A trailing
//! delimiter does not produce a phantom empty chunk, but consecutive
//! delimiters do produce the empty chunks between them; callers that want
//! to skip empty lines filter them out themselves. Joining the chunks with
//! the delimiter therefore reproduces the input, minus one trailing
//! delimiter if present.

use std::io::BufRead;

use memchr::memchr;

/// Zero-copy splitter over a borrowed byte region.
///
/// Scans forward from an internal cursor to the next delimiter using
/// `memchr` and yields the subrange before it. Exhausted once the cursor
/// has passed the final byte.
#[derive(Clone, Debug)]
pub struct RegionSplitter<'a> {
    region: &'a [u8],
    cursor: usize,
    delim: u8,
}

impl<'a> RegionSplitter<'a> {
    pub fn new(region: &'a [u8], delim: u8) -> Self {
        Self {
            region,
            cursor: 0,
            delim,
        }
    }

    /// Bytes not yet consumed, including any pending delimiter.
    #[inline]
    pub fn bytes_left(&self) -> usize {
        self.region.len() - self.cursor
    }
}

impl<'a> Iterator for RegionSplitter<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<&'a [u8]> {
        if self.cursor == self.region.len() {
            return None;
        }
        let tail = &self.region[self.cursor..];
        match memchr(self.delim, tail) {
            Some(pos) => {
                self.cursor += pos + 1;
                Some(&tail[..pos])
            }
            None => {
                self.cursor = self.region.len();
                Some(tail)
            }
        }
    }
}

/// Owning splitter over a buffered byte stream.
///
/// Each pull reads up to the next delimiter (consumed, not included) or
/// EOF. An I/O error ends the stream: the splitter reports exhaustion and
/// records the error for the caller to inspect after the fact. Chunks read
/// before the error are unaffected.
#[derive(Debug)]
pub struct StreamSplitter<R> {
    reader: R,
    delim: u8,
    done: bool,
    io_error: Option<std::io::Error>,
}

impl<R: BufRead> StreamSplitter<R> {
    pub fn new(reader: R, delim: u8) -> Self {
        Self {
            reader,
            delim,
            done: false,
            io_error: None,
        }
    }

    /// The error that terminated the stream early, if any.
    pub fn io_error(&self) -> Option<&std::io::Error> {
        self.io_error.as_ref()
    }
}

impl<R: BufRead> Iterator for StreamSplitter<R> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        if self.done {
            return None;
        }
        let mut line = Vec::new();
        match self.reader.read_until(self.delim, &mut line) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                if line.last() == Some(&self.delim) {
                    line.pop();
                } else {
                    // No trailing delimiter means EOF; the next pull would
                    // read zero bytes anyway.
                    self.done = true;
                }
                Some(line)
            }
            Err(err) => {
                self.done = true;
                self.io_error = Some(err);
                None
            }
        }
    }
}
