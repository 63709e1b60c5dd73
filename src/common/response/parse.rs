// src/common/response/parse.rs

//! Tokenizer for `command key = value, key = value, ...` response lines.
//!
//! Parameters are produced lazily as borrowed slices of the line. Pairs are separated by `", "`,
//! but list values may contain commas too (`n0 = 1, 2` on L2, `a|b, c` in free text). The end of
//! a value is therefore found by looking ahead to the next `" = "` and walking back to the
//! closest `", "` before it.

use super::message::strip_prompts;
use crate::common::generation::ListSeparator;

const ASSIGNMENT: &str = " = ";
const PAIR_SEPARATOR: &str = ", ";

/// Selector word in responses listing every entity (`channel all ...`); it carries no data.
const ALL_SELECTOR: &str = "all";

/// Key that starts a group of parameters belonging to one entity.
const INDEX_KEY: &str = "index";

/// One `key = value` pair of a response.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ResponseParameter<'a> {
    /// Number of entity groups seen so far, counting the one this parameter belongs to. Zero for
    /// responses that are not grouped.
    pub index: usize,
    /// The entity identifier introducing the current group (`3` in `3 type = temp09` or in
    /// `index = 3`).
    pub index_value: Option<&'a str>,
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> ResponseParameter<'a> {
    /// Splits a list value into its items.
    pub fn list(&self, separator: ListSeparator) -> impl Iterator<Item = &'a str> {
        let value: &'a str = self.value;
        separator.split(value)
    }

    /// The value parsed as a number (or anything else implementing `FromStr`).
    pub fn parse<T: core::str::FromStr>(&self) -> Option<T> {
        self.value.trim().parse().ok()
    }

    /// `true` for `on`, `false` for `off`, as the instrument spells booleans.
    pub fn on_off(&self) -> Option<bool> {
        match self.value {
            "on" | "true" => Some(true),
            "off" | "false" => Some(false),
            _ => None,
        }
    }
}

/// Iterator over the parameters of one response line.
#[derive(Debug, Clone)]
pub struct ResponseParser<'a> {
    command: &'a str,
    rest: &'a str,
    index: usize,
    index_value: Option<&'a str>,
}

impl<'a> ResponseParser<'a> {
    /// Splits the command name off `line`. Leading prompts are ignored.
    pub fn new(line: &'a str) -> Self {
        let line = strip_prompts(line);
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        ResponseParser {
            command,
            rest,
            index: 0,
            index_value: None,
        }
    }

    /// The response's leading word, which echoes the command that produced it.
    pub fn command(&self) -> &'a str {
        self.command
    }

    /// Whether another parameter follows.
    pub fn has_more(&self) -> bool {
        self.rest.contains(ASSIGNMENT)
    }

    /// Finds the first parameter with `key`, consuming the parser up to it.
    pub fn find_key(&mut self, key: &str) -> Option<ResponseParameter<'a>> {
        Iterator::find(self, |p| p.key == key)
    }

    fn split_key(&mut self, key_part: &'a str) -> &'a str {
        let key_part = key_part.trim();
        match key_part.rsplit_once(' ') {
            Some((qualifier, key)) => {
                let qualifier = match qualifier.split_once(' ') {
                    Some((ALL_SELECTOR, rest)) => rest,
                    _ if qualifier == ALL_SELECTOR => "",
                    _ => qualifier,
                };
                if !qualifier.is_empty() && qualifier.bytes().all(|b| b.is_ascii_digit()) {
                    self.index += 1;
                    self.index_value = Some(qualifier);
                    key
                } else if qualifier.is_empty() {
                    key
                } else {
                    key_part
                }
            }
            None => key_part,
        }
    }
}

impl<'a> Iterator for ResponseParser<'a> {
    type Item = ResponseParameter<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest;
        let Some(assignment) = rest.find(ASSIGNMENT) else {
            self.rest = "";
            return None;
        };

        let key_part = &rest[..assignment];
        let after = &rest[assignment + ASSIGNMENT.len()..];

        let (value, remaining) = match after.find(ASSIGNMENT) {
            Some(next_assignment) => match after[..next_assignment].rfind(PAIR_SEPARATOR) {
                Some(separator) => (&after[..separator], &after[separator + PAIR_SEPARATOR.len()..]),
                None => (after, ""),
            },
            None => (after, ""),
        };
        self.rest = remaining;

        let key = self.split_key(key_part);
        if key == INDEX_KEY {
            self.index += 1;
            self.index_value = Some(value);
        }

        Some(ResponseParameter {
            index: self.index,
            index_value: self.index_value,
            key,
            value,
        })
    }
}
