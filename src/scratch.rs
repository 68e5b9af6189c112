use std::collections::TryReserveError;

/// Buffers grow in increments of this size, rounded up to cover the
/// requested capacity.
const CHUNK: usize = 8 * 1024;

/// A growable byte arena owned by a tokenizer or writer and reused across
/// tokens. Growth failures are reported instead of aborting, so the
/// owner can surface them as its memory error kind.
#[derive(Debug, Default)]
pub(crate) struct Scratch {
    buf: Vec<u8>,
}

impl Scratch {
    pub fn new() -> Self {
        Scratch { buf: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Make room for `additional` more bytes, extending the allocation in
    /// 8 KiB steps.
    fn ensure(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let needed = self.buf.len() + additional;
        if needed > self.buf.capacity() {
            let rounded = needed.div_ceil(CHUNK) * CHUNK;
            self.buf.try_reserve(rounded - self.buf.len())?;
        }
        Ok(())
    }

    pub fn push(&mut self, b: u8) -> Result<(), TryReserveError> {
        self.ensure(1)?;
        self.buf.push(b);
        Ok(())
    }

    pub fn extend(&mut self, bytes: &[u8]) -> Result<(), TryReserveError> {
        self.ensure(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }
}
