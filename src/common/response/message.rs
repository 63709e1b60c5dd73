// src/common/response/message.rs

/// Prompt an instrument may print, possibly several times, before a response.
pub const PROMPT: &str = "Ready: ";

/// Width of the `E0109 ` prefix of a numbered message; text follows it.
pub const NUMBERED_PREFIX_LEN: usize = 6;

/// Kind of the most recent instrument message.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MessageKind {
    /// An ordinary response; the text is the whole line.
    Info,
    /// `W####`: the command was carried out, with a caveat.
    Warning,
    /// `E####`: the command was rejected.
    Error,
    /// No message is available, e.g. before any communication or after a failed bulk transfer.
    Unavailable,
}

/// The classification of a response line.
///
/// The text borrows from the connection's response buffer, so it lives only until the next
/// communication.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Message<'a> {
    pub kind: MessageKind,
    /// Warning or error number; 0 for info messages.
    pub number: u16,
    pub text: Option<&'a str>,
}

impl Message<'_> {
    pub const UNAVAILABLE: Message<'static> = Message {
        kind: MessageKind::Unavailable,
        number: 0,
        text: None,
    };
}

/// Skips any number of leading prompts.
pub fn strip_prompts(mut line: &str) -> &str {
    while let Some(rest) = line.strip_prefix(PROMPT) {
        line = rest;
    }
    line
}

fn numbered(line: &str) -> Option<(MessageKind, u16)> {
    let kind = match line.as_bytes().first()? {
        b'E' => MessageKind::Error,
        b'W' => MessageKind::Warning,
        _ => return None,
    };
    let rest = &line[1..];
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let number = rest[..digits].parse().ok()?;
    Some((kind, number))
}

/// Classifies a line (prompts already stripped).
///
/// `E` or `W` followed by a number makes an error or warning whose text follows the fixed
/// prefix; a line too short to hold the prefix has no text. Anything else is info.
pub fn classify(line: &str) -> Message<'_> {
    match numbered(line) {
        Some((kind, number)) => Message {
            kind,
            number,
            text: line.get(NUMBERED_PREFIX_LEN..),
        },
        None => Message {
            kind: MessageKind::Info,
            number: 0,
            text: Some(line),
        },
    }
}
