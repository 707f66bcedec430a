//! The line protocol.
//!
//! A request is a single line of ASCII whitespace separated tokens:
//!
//! * `GET <key>`
//! * `SET <key> <value>`: the value is the rest of the line after the key, minus one separating
//!   space; it may be empty or contain spaces.
//! * `DEL <key>`
//!
//! A missing key is the empty key. The response is a single line: `+OK`, `+VALUE <value>`,
//! `-ERR NotFound`, or `-ERR UnknownCommand`.

use std::fmt;

use crate::Store;

/// A parsed request line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Request<'l> {
    Get { key: &'l str },
    Set { key: &'l str, value: &'l str },
    Del { key: &'l str },
    Unknown,
}

/// A response line without the line terminator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    Ok,
    Value(String),
    NotFound,
    UnknownCommand,
}

impl<'l> Request<'l> {
    /// Parses a request line.
    ///
    /// A trailing line terminator, `\n` or `\r\n`, is ignored.
    pub fn parse(line: &'l str) -> Self {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        let (command, rest) = next_token(line);
        let (key, rest) = next_token(rest);
        match command {
            "GET" => Self::Get { key },
            "SET" => Self::Set {
                key,
                value: rest.strip_prefix(' ').unwrap_or(rest),
            },
            "DEL" => Self::Del { key },
            _ => Self::Unknown,
        }
    }

    /// Applies the request to the store.
    pub fn execute(&self, store: &Store) -> Response {
        match *self {
            Self::Get { key } => store.get(key).map_or(Response::NotFound, Response::Value),
            Self::Set { key, value } => {
                store.put(key.to_owned(), value.to_owned());
                Response::Ok
            }
            Self::Del { key } => {
                if store.erase(key) {
                    Response::Ok
                } else {
                    Response::NotFound
                }
            }
            Self::Unknown => Response::UnknownCommand,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("+OK"),
            Self::Value(value) => write!(f, "+VALUE {value}"),
            Self::NotFound => f.write_str("-ERR NotFound"),
            Self::UnknownCommand => f.write_str("-ERR UnknownCommand"),
        }
    }
}

/// Splits off the first token; the rest starts with the separator, if any.
fn next_token(s: &str) -> (&str, &str) {
    let s = s.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let end = s.find(|c: char| c.is_ascii_whitespace()).unwrap_or(s.len());
    s.split_at(end)
}
