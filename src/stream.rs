use std::io::{BufReader, Bytes, Read, Write};

use crate::data::*;

/// Byte source with a single pushback slot and line tracking, paired with the
/// output sink every scanner echoes into.
///
/// A line ends at `\r`, `\n` or `\r\n`; the pair counts once.
pub struct Stream<R: Read, W: Write> {
    input: Bytes<BufReader<R>>,
    output: W,
    preview: Option<u8>,
    /// Set once the reader reports end of input; it is never polled again.
    eof: bool,
    line: usize,
    saw_cr: bool,
    /// Line state from before the most recent `get`, restored by `unget`.
    undo: (usize, bool),
}

impl<R: Read, W: Write> Stream<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: BufReader::new(input).bytes(),
            output,
            preview: None,
            eof: false,
            line: 1,
            saw_cr: false,
            undo: (1, false),
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    fn read(&mut self) -> Result<Option<u8>> {
        if self.eof {
            return Ok(None);
        }
        let line = self.line;
        let c = self
            .input
            .next()
            .transpose()
            .map_err(|source| JsDevError::Io {
                line: Some(line),
                source,
            })?;
        self.eof = c.is_none();
        Ok(c)
    }

    /// Returns the next byte without consuming it.
    pub fn peek(&mut self) -> Result<Option<u8>> {
        if self.preview.is_none() {
            self.preview = self.read()?;
        }
        Ok(self.preview)
    }

    /// Consumes the next byte, echoing it to the output if `echo` is set.
    /// Returns `None` at end of input.
    pub fn get(&mut self, echo: bool) -> Result<Option<u8>> {
        let c = match self.preview.take() {
            Some(c) => c,
            None => match self.read()? {
                Some(c) => c,
                None => return Ok(None),
            },
        };

        self.undo = (self.line, self.saw_cr);
        match c {
            b'\r' => {
                self.saw_cr = true;
                self.line += 1;
            }
            b'\n' => {
                if !self.saw_cr {
                    self.line += 1;
                }
                self.saw_cr = false;
            }
            _ => self.saw_cr = false,
        }

        if echo {
            self.emit(c)?;
        }
        Ok(Some(c))
    }

    /// Pushes back the byte returned by the last `get`.
    pub fn unget(&mut self, c: u8) {
        self.preview = Some(c);
        (self.line, self.saw_cr) = self.undo;
    }

    pub fn emit(&mut self, c: u8) -> Result<()> {
        let line = self.line;
        self.output
            .write_all(&[c])
            .map_err(|source| JsDevError::Io {
                line: Some(line),
                source,
            })
    }

    pub fn emits(&mut self, s: &str) -> Result<()> {
        let line = self.line;
        self.output
            .write_all(s.as_bytes())
            .map_err(|source| JsDevError::Io {
                line: Some(line),
                source,
            })
    }

    /// Flushes the sink and hands it back.
    pub fn finish(mut self) -> Result<W> {
        let line = self.line;
        self.output
            .flush()
            .map_err(|source| JsDevError::Io {
                line: Some(line),
                source,
            })?;
        Ok(self.output)
    }
}
