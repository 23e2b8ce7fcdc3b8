use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Minimum spare capacity reserved before each transport read.
const READ_CHUNK: usize = 1024;

/// Growable buffer that absorbs transport reads until the parser consumes them.
///
/// Consumed bytes are dropped by advancing the start of the underlying
/// [`BytesMut`]; the storage is reclaimed lazily when more room is reserved,
/// so repeated small reads of a large body do not shift the tail each time.
#[derive(Debug, Default)]
pub struct ByteAccumulator {
    buf: BytesMut,
}

impl ByteAccumulator {
    pub fn new() -> Self {
        Self::with_capacity(READ_CHUNK)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Appends bytes to the unconsumed tail.
    pub fn append(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Discards the first `n` unconsumed bytes and returns how many remain.
    ///
    /// `n` must not exceed [`len`](Self::len).
    pub fn consume(&mut self, n: usize) -> usize {
        debug_assert!(n <= self.buf.len(), "consume past end of buffer");
        let n = n.min(self.buf.len());
        self.buf.advance(n);
        self.buf.len()
    }

    /// The unconsumed bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Performs one read from `reader` and appends whatever it returned.
    ///
    /// Returns the number of bytes read; `0` means the peer closed the stream.
    pub async fn read_from<R>(&mut self, reader: &mut R) -> std::io::Result<usize>
    where
        R: AsyncRead + Unpin,
    {
        self.buf.reserve(READ_CHUNK);
        reader.read_buf(&mut self.buf).await
    }
}
