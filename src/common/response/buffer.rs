// src/common/response/buffer.rs

use crate::common::error::RbrError;

/// Capacity of the response buffer. The longest line an instrument may send must fit.
pub const RESPONSE_BUFFER_LEN: usize = 2048;

/// Fixed-capacity byte buffer holding received data.
///
/// The current line always starts at offset 0. `consumed` covers that line plus its `\r\n`;
/// bytes after it have been received but not yet looked at, and are kept across reads.
#[derive(Debug, Clone)]
pub struct ResponseBuffer {
    data: [u8; RESPONSE_BUFFER_LEN],
    len: usize,
    consumed: usize,
}

impl Default for ResponseBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseBuffer {
    pub const fn new() -> Self {
        ResponseBuffer {
            data: [0; RESPONSE_BUFFER_LEN],
            len: 0,
            consumed: 0,
        }
    }

    /// Number of buffered bytes, including the current line.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops the current line and its terminator, moving any following bytes to the front.
    pub fn discard_consumed(&mut self) {
        if self.consumed == 0 {
            return;
        }
        self.data.copy_within(self.consumed..self.len, 0);
        self.len -= self.consumed;
        self.consumed = 0;
    }

    /// Drops everything, including unread bytes.
    pub fn clear(&mut self) {
        self.len = 0;
        self.consumed = 0;
    }

    /// Offset of the first `\r\n` in the unread bytes.
    pub fn find_terminator(&self) -> Option<usize> {
        self.data[..self.len].windows(2).position(|w| w == b"\r\n")
    }

    /// Marks `data[..end]` as the current line, consuming the terminator after it too.
    pub fn mark_line(&mut self, end: usize) {
        debug_assert!(end + 2 <= self.len);
        self.consumed = end + 2;
    }

    /// The current line without its terminator; empty if no line has been marked.
    pub fn line(&self) -> &[u8] {
        &self.data[..self.consumed.saturating_sub(2)]
    }

    /// Free space for the transport to read into. Empty when the buffer is full.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.len..]
    }

    /// Records that `n` bytes were written into [`spare_mut`](Self::spare_mut).
    pub fn commit(&mut self, n: usize) {
        self.len = (self.len + n).min(RESPONSE_BUFFER_LEN);
    }

    /// Checks that another read can make progress. A full buffer with no terminator in it can
    /// never yield a line; the contents are dropped and an overflow is reported.
    pub fn ensure_space<E: core::fmt::Debug>(&mut self) -> Result<(), RbrError<E>> {
        if self.len < RESPONSE_BUFFER_LEN {
            return Ok(());
        }
        let needed = self.len + 1;
        self.clear();
        Err(RbrError::BufferOverflow {
            needed,
            got: RESPONSE_BUFFER_LEN,
        })
    }

    /// Bytes received after the current line.
    pub fn unread_len(&self) -> usize {
        self.len - self.consumed
    }

    /// Moves up to `out.len()` unread bytes following the current line into `out`.
    ///
    /// Used for binary payloads, which arrive after a text header and may already be partially
    /// buffered. The current line stays in place.
    pub fn take_unread(&mut self, out: &mut [u8]) -> usize {
        let n = self.unread_len().min(out.len());
        let start = self.consumed;
        out[..n].copy_from_slice(&self.data[start..start + n]);
        self.data.copy_within(start + n..self.len, start);
        self.len -= n;
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(buffer: &mut ResponseBuffer, bytes: &[u8]) {
        buffer.spare_mut()[..bytes.len()].copy_from_slice(bytes);
        buffer.commit(bytes.len());
    }

    #[test]
    fn test_line_extraction_keeps_following_bytes() {
        let mut buffer = ResponseBuffer::new();
        fill(&mut buffer, b"id model = RBRduo3\r\nclock datetime");

        let end = buffer.find_terminator().unwrap();
        buffer.mark_line(end);
        assert_eq!(buffer.line(), b"id model = RBRduo3");

        buffer.discard_consumed();
        assert_eq!(buffer.line(), b"");
        assert!(buffer.find_terminator().is_none());
        fill(&mut buffer, b" = 20190207183624\r\n");
        let end = buffer.find_terminator().unwrap();
        buffer.mark_line(end);
        assert_eq!(buffer.line(), b"clock datetime = 20190207183624");
    }

    #[test]
    fn test_terminator_split_across_reads() {
        let mut buffer = ResponseBuffer::new();
        fill(&mut buffer, b"id\r");
        assert!(buffer.find_terminator().is_none());
        fill(&mut buffer, b"\n");
        assert_eq!(buffer.find_terminator(), Some(2));
    }

    #[test]
    fn test_full_buffer_without_terminator_overflows() {
        let mut buffer = ResponseBuffer::new();
        fill(&mut buffer, &[b'x'; RESPONSE_BUFFER_LEN]);
        assert!(buffer.spare_mut().is_empty());
        assert!(matches!(
            buffer.ensure_space::<()>(),
            Err(RbrError::BufferOverflow { got: RESPONSE_BUFFER_LEN, .. })
        ));
        assert!(buffer.is_empty());
        assert!(buffer.ensure_space::<()>().is_ok());
    }

    #[test]
    fn test_take_unread_after_header() {
        let mut buffer = ResponseBuffer::new();
        fill(&mut buffer, b"readdata dataset = 1, size = 4, offset = 0\r\n\x01\x02\x03");
        let end = buffer.find_terminator().unwrap();
        buffer.mark_line(end);

        let mut out = [0u8; 2];
        assert_eq!(buffer.take_unread(&mut out), 2);
        assert_eq!(out, [1, 2]);
        assert_eq!(buffer.unread_len(), 1);
        assert_eq!(buffer.line(), b"readdata dataset = 1, size = 4, offset = 0");

        let mut out = [0u8; 8];
        assert_eq!(buffer.take_unread(&mut out), 1);
        assert_eq!(out[0], 3);
        assert_eq!(buffer.unread_len(), 0);

        buffer.discard_consumed();
        assert!(buffer.is_empty());
    }
}
