use crate::util::{create_with_backoff, open_with_backoff};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Line reader over any byte source (plain file or zstd decoder).
/// Strips trailing `\r?\n`.
pub struct NdjsonReader<R: Read> {
    rdr: BufReader<R>,
    line_no: usize,
}

impl NdjsonReader<File> {
    pub fn open(path: &Path, buf_bytes: usize) -> io::Result<Self> {
        let f = open_with_backoff(path)?;
        Ok(Self::new(f, buf_bytes))
    }
}

impl<R: Read> NdjsonReader<R> {
    pub fn new(inner: R, buf_bytes: usize) -> Self {
        Self { rdr: BufReader::with_capacity(buf_bytes.max(8 * 1024), inner), line_no: 0 }
    }

    /// Read the next line into `buf`. Returns the number of bytes read (0 on EOF).
    pub fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        buf.clear();
        let n = self.rdr.read_line(buf)?;
        if n == 0 { return Ok(0); }
        self.line_no += 1;
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') { buf.pop(); }
        }
        Ok(n)
    }

    /// 1-based number of the line last returned.
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

/// Buffered NDJSON writer over any sink. Writes one record per line.
pub struct NdjsonWriter<W: Write> {
    w: BufWriter<W>,
}

impl NdjsonWriter<File> {
    pub fn create(path: &Path, buf_bytes: usize) -> io::Result<Self> {
        let f = create_with_backoff(path)?;
        Ok(Self::new(f, buf_bytes))
    }
}

impl<W: Write> NdjsonWriter<W> {
    pub fn new(inner: W, buf_bytes: usize) -> Self {
        Self { w: BufWriter::with_capacity(buf_bytes.max(8 * 1024), inner) }
    }

    #[inline]
    pub fn write_line(&mut self, s: &str) -> io::Result<()> {
        self.w.write_all(s.as_bytes())?;
        self.w.write_all(b"\n")
    }

    /// Flush and hand back the inner sink (e.g. to finish a zstd frame).
    pub fn finish(self) -> io::Result<W> {
        self.w.into_inner().map_err(|e| e.into_error())
    }
}
