// src/common/response/mod.rs

mod buffer;
mod message;
pub mod parse;

pub use buffer::{ResponseBuffer, RESPONSE_BUFFER_LEN};
pub use message::{classify, strip_prompts, Message, MessageKind, NUMBERED_PREFIX_LEN, PROMPT};
pub use parse::{ResponseParameter, ResponseParser};
