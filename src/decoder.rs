//! Incremental decoding of concatenated JSON records
//!
//! The groups endpoint streams one JSON object per group without wrapping
//! them in an array. [`RecordDecoder`] buffers only the bytes of the value
//! currently being decoded and hands out records as soon as they are
//! complete. [`RecordStream`] drives it from an async [`ChunkSource`] such as
//! a `reqwest::Response`.
//!
//! A malformed value stops the whole stream: the decoder is poisoned and
//! every later call fails.

use crate::error::{DecodeError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Push-based decoder for a sequence of JSON values
///
/// Feed bytes with [`push`](Self::push), pull records with
/// [`next_record`](Self::next_record), and call [`finish`](Self::finish) once
/// the input is exhausted.
#[derive(Debug)]
pub struct RecordDecoder<T> {
    buf: Vec<u8>,
    /// Start of the undecoded bytes in `buf`
    pos: usize,
    /// Absolute stream offset of `buf[0]`
    base: u64,
    decoded: usize,
    /// Pending bytes already known to hold no closing `}`
    scanned: usize,
    eof: bool,
    poisoned: Option<usize>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Default for RecordDecoder<T> {
    fn default() -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
            base: 0,
            decoded: 0,
            scanned: 0,
            eof: false,
            poisoned: None,
            _record: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> RecordDecoder<T> {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next chunk of input
    pub fn push(&mut self, chunk: &[u8]) {
        // Reclaim the decoded prefix once it dominates the buffer
        if self.pos > 0 && self.pos * 2 >= self.buf.len() {
            self.buf.drain(..self.pos);
            self.base += self.pos as u64;
            self.pos = 0;
        }
        self.buf.extend_from_slice(chunk);
    }

    /// Mark the end of input
    ///
    /// After this, an incomplete trailing value is reported as
    /// [`DecodeError::Truncated`] instead of waiting for more bytes.
    pub fn finish(&mut self) {
        self.eof = true;
    }

    /// Whether the input has ended and every byte has been decoded
    pub fn is_finished(&self) -> bool {
        self.eof && self.pending().iter().all(u8::is_ascii_whitespace)
    }

    /// Number of records decoded so far
    pub fn records_decoded(&self) -> usize {
        self.decoded
    }

    /// Absolute stream offset of the next undecoded byte
    pub fn offset(&self) -> u64 {
        self.base + self.pos as u64
    }

    /// Decode the next complete record
    ///
    /// Returns `Ok(None)` when the buffered input does not hold a complete
    /// value yet (or, after [`finish`](Self::finish), when nothing is left).
    pub fn next_record(&mut self) -> std::result::Result<Option<T>, DecodeError> {
        if let Some(index) = self.poisoned {
            return Err(DecodeError::Poisoned { index });
        }

        self.skip_whitespace();
        let pending = self.pending();
        if pending.is_empty() {
            return Ok(None);
        }

        // An object cannot complete before its closing brace arrives
        if !self.eof && pending[0] == b'{' && !pending[self.scanned..].contains(&b'}') {
            self.scanned = pending.len();
            return Ok(None);
        }

        let (parsed, end) = {
            let mut values = serde_json::Deserializer::from_slice(pending).into_iter::<T>();
            let parsed = values.next();
            (parsed, values.byte_offset())
        };
        match parsed {
            Some(Ok(record)) => {
                // A bare number at the end of the buffer may still be growing
                if end == pending.len() && !self.eof && !is_self_delimited(pending[end - 1]) {
                    self.scanned = pending.len();
                    return Ok(None);
                }
                self.pos += end;
                self.scanned = 0;
                self.decoded += 1;
                Ok(Some(record))
            }
            // Skipped numbers cut at the buffer end fail as syntax errors, not EOF
            Some(Err(e)) if !self.eof && (e.is_eof() || fails_at_end(pending, &e)) => {
                self.scanned = pending.len();
                Ok(None)
            }
            Some(Err(e)) if e.is_eof() => {
                let pending = pending.len();
                Err(self.poison(|index, offset| DecodeError::Truncated {
                    index,
                    offset,
                    pending,
                }))
            }
            Some(Err(source)) => Err(self.poison(|index, offset| DecodeError::Malformed {
                index,
                offset,
                source,
            })),
            None => Ok(None),
        }
    }

    fn pending(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let skipped = self
            .pending()
            .iter()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
        self.pos += skipped;
    }

    fn poison(&mut self, make: impl FnOnce(usize, u64) -> DecodeError) -> DecodeError {
        let index = self.decoded;
        self.poisoned = Some(index);
        make(index, self.offset())
    }
}

fn is_self_delimited(last: u8) -> bool {
    matches!(last, b'}' | b']' | b'"')
}

/// Whether `e` points at or past the last byte of `input`
fn fails_at_end(input: &[u8], e: &serde_json::Error) -> bool {
    if e.line() == 0 {
        return false;
    }
    let line_start = if e.line() == 1 {
        Some(0)
    } else {
        input
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .nth(e.line() - 2)
            .map(|(i, _)| i + 1)
    };
    line_start.is_some_and(|start| start + e.column() >= input.len())
}

/// Source of body chunks for a [`RecordStream`]
#[async_trait]
pub trait ChunkSource: Send {
    /// Fetch the next chunk, or `None` at end of body
    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}

#[async_trait]
impl ChunkSource for reqwest::Response {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        Ok(self.chunk().await?)
    }
}

/// Lazy, single-pass sequence of records read from a [`ChunkSource`]
///
/// The source is pulled only when the decoder needs more bytes and is
/// dropped as soon as the sequence ends or fails, which releases the
/// underlying connection.
pub struct RecordStream<S, T> {
    source: Option<S>,
    decoder: RecordDecoder<T>,
    bytes_read: u64,
}

impl<S: ChunkSource, T: DeserializeOwned> RecordStream<S, T> {
    /// Start decoding records from `source`
    pub fn new(source: S) -> Self {
        Self {
            source: Some(source),
            decoder: RecordDecoder::new(),
            bytes_read: 0,
        }
    }

    /// Next record, `Ok(None)` once the stream is exhausted
    ///
    /// After the first `Ok(None)` or error every call returns `Ok(None)`.
    pub async fn next(&mut self) -> Result<Option<T>> {
        let Some(source) = self.source.as_mut() else {
            return Ok(None);
        };

        loop {
            match self.decoder.next_record() {
                Ok(Some(record)) => return Ok(Some(record)),
                Ok(None) if self.decoder.is_finished() => {
                    debug!(
                        records = self.decoder.records_decoded(),
                        bytes = self.bytes_read,
                        "record stream complete"
                    );
                    self.source = None;
                    return Ok(None);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "record stream aborted");
                    self.source = None;
                    return Err(e.into());
                }
            }

            match source.next_chunk().await {
                Ok(Some(chunk)) => {
                    self.bytes_read += chunk.len() as u64;
                    self.decoder.push(&chunk);
                }
                Ok(None) => self.decoder.finish(),
                Err(e) => {
                    warn!(error = %e, "failed to read response body");
                    self.source = None;
                    return Err(e);
                }
            }
        }
    }

    /// Number of records yielded so far
    pub fn records_decoded(&self) -> usize {
        self.decoder.records_decoded()
    }

    /// Number of body bytes received so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Whether the source has been released
    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }
}
