use anyhow::{Context, Result};
use encoding_rs::Encoding;
use std::io::BufRead;
use tracing::debug;

pub trait LineSource {
    fn next_line(&mut self) -> Result<Option<String>>;
}

impl<T: LineSource + ?Sized> LineSource for Box<T> {
    fn next_line(&mut self) -> Result<Option<String>> {
        (**self).next_line()
    }
}

pub struct ReaderLines<R> {
    reader: R,
    encoding: &'static Encoding,
    buf: Vec<u8>,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R, encoding: &'static Encoding) -> Self {
        Self {
            reader,
            encoding,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> LineSource for ReaderLines<R> {
    fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .context("failed to read tracer output")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(decode_line(self.encoding, &self.buf)))
    }
}

pub fn decode_line(encoding: &'static Encoding, raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

    let (text, had_errors) = encoding.decode_without_bom_handling(raw);
    if had_errors {
        debug!(encoding = encoding.name(), "replaced malformed bytes in tracer output");
    }
    text.into_owned()
}
