// src/common/command.rs

//! Outgoing command text.
//!
//! Commands are rendered with `format_args!` into a fixed [`CommandBuffer`]. A command longer than
//! the buffer is written to the transport in several pieces. A flush stops after the last space,
//! comma or `|` in the buffer and keeps the rest for the next piece, so a number split into
//! several formatting pieces (as `f64` is) still goes out whole. Only a single token longer than
//! the buffer is cut wherever the buffer fills.

use core::fmt::{self, Write};

use arrayvec::ArrayString;

use super::error::RbrError;
use super::generation::ListSeparator;

/// Capacity of the outgoing command buffer.
pub const COMMAND_BUFFER_LEN: usize = 128;

/// Longest command name (first word of a command) that can be matched against responses.
pub const COMMAND_NAME_LEN: usize = 32;

/// Bytes after which a long command may be cut.
const FLUSH_BOUNDARIES: [char; 3] = [' ', ',', '|'];

/// Line terminator of commands and responses.
pub const TERMINATOR: &str = "\r\n";

/// The most recently sent command.
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    text: ArrayString<COMMAND_BUFFER_LEN>,
    name: ArrayString<COMMAND_NAME_LEN>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the last command, including its terminator. For commands that were flushed in
    /// several pieces this is the final piece.
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// First word of the last command; responses are matched against it.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.name.clear();
    }
}

/// `fmt::Write` adapter that fills a [`CommandBuffer`] and drains it into `sink` when full.
struct CommandWriter<'b, F, E>
where
    E: fmt::Debug,
{
    buffer: &'b mut CommandBuffer,
    sink: F,
    error: Option<RbrError<E>>,
    name_complete: bool,
    tail: [u8; 2],
}

impl<F, E> CommandWriter<'_, F, E>
where
    F: FnMut(&[u8]) -> Result<(), RbrError<E>>,
    E: fmt::Debug,
{
    fn flush(&mut self) -> Result<(), RbrError<E>> {
        if self.buffer.text.is_empty() {
            return Ok(());
        }
        (self.sink)(self.buffer.text.as_bytes())?;
        self.buffer.text.clear();
        Ok(())
    }

    /// Writes out the buffer up to its last token boundary so that `needed` more bytes fit.
    fn make_room(&mut self, needed: usize) -> Result<(), RbrError<E>> {
        let len = self.buffer.text.len();
        let cut = match self.buffer.text.rfind(FLUSH_BOUNDARIES) {
            Some(i) if len - (i + 1) + needed <= COMMAND_BUFFER_LEN => i + 1,
            _ => len,
        };
        if cut == len {
            return self.flush();
        }

        let pending = core::mem::take(&mut self.buffer.text);
        let (head, rest) = pending.as_str().split_at(cut);
        (self.sink)(head.as_bytes())?;
        self.buffer.text.push_str(rest);
        Ok(())
    }

    fn append(&mut self, s: &str) -> Result<(), RbrError<E>> {
        if s.len() > COMMAND_BUFFER_LEN {
            return Err(RbrError::BufferOverflow {
                needed: s.len(),
                got: COMMAND_BUFFER_LEN,
            });
        }
        if self.buffer.text.remaining_capacity() < s.len() {
            self.make_room(s.len())?;
        }

        if !self.name_complete {
            let word_end = s.find(' ');
            let word = &s[..word_end.unwrap_or(s.len())];
            let word = word.trim_end_matches(['\r', '\n']);
            if self.buffer.name.try_push_str(word).is_err() {
                return Err(RbrError::BufferOverflow {
                    needed: self.buffer.name.len() + word.len(),
                    got: COMMAND_NAME_LEN,
                });
            }
            self.name_complete = word_end.is_some() || s.ends_with('\n');
        }

        let bytes = s.as_bytes();
        for &b in &bytes[bytes.len().saturating_sub(2)..] {
            self.tail = [self.tail[1], b];
        }
        self.buffer
            .text
            .try_push_str(s)
            .map_err(|_| RbrError::BufferOverflow {
                needed: s.len(),
                got: COMMAND_BUFFER_LEN,
            })
    }
}

impl<F, E> Write for CommandWriter<'_, F, E>
where
    F: FnMut(&[u8]) -> Result<(), RbrError<E>>,
    E: fmt::Debug,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if s.is_empty() {
            return Ok(());
        }
        self.append(s).map_err(|e| {
            self.error = Some(e);
            fmt::Error
        })
    }
}

/// Renders `args` into `buffer`, appends the terminator unless the text already ends with it,
/// and hands the bytes to `sink` (once, or several times for long commands).
///
/// Long commands are cut only after a space, comma or `|`, never inside a number or word,
/// unless one token alone exceeds [`COMMAND_BUFFER_LEN`].
///
/// On success `buffer` holds the last piece written and the command name.
pub fn write_command<E, F>(
    buffer: &mut CommandBuffer,
    args: fmt::Arguments<'_>,
    sink: F,
) -> Result<(), RbrError<E>>
where
    F: FnMut(&[u8]) -> Result<(), RbrError<E>>,
    E: fmt::Debug,
{
    buffer.clear();
    let mut writer = CommandWriter {
        buffer,
        sink,
        error: None,
        name_complete: false,
        tail: [0; 2],
    };

    if writer.write_fmt(args).is_err() {
        return Err(writer.error.take().unwrap_or(RbrError::InvalidFormat));
    }
    if writer.tail != *b"\r\n" {
        writer.append(TERMINATOR)?;
    }
    (writer.sink)(writer.buffer.text.as_bytes())
}

/// Formats a list of items, one formatting piece per item and per separator.
#[derive(Debug, Clone, Copy)]
pub struct ListArg<'a> {
    items: &'a [&'a str],
    separator: ListSeparator,
}

impl<'a> ListArg<'a> {
    pub fn new(items: &'a [&'a str], separator: ListSeparator) -> Self {
        ListArg { items, separator }
    }
}

impl fmt::Display for ListArg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_char(self.separator.as_char())?;
            }
            f.write_str(item)?;
        }
        Ok(())
    }
}
