// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decoder for space-delimited `key=value` text (logfmt).
//!
//! Keys and unquoted values are runs of bytes above `' '` other than `=` and
//! `"`. Values may be double quoted to contain spaces, with JSON style
//! backslash escapes. A key without a value is reported with an empty value.
//! Anything else between pairs is skipped.

use std::borrow::Cow;

use crate::errors::ParseError;

/// Receives every decoded pair in the order it appears.
pub trait Handler {
    fn handle_logfmt(&mut self, key: &str, val: &str);
}

impl<F> Handler for F
where
    F: FnMut(&str, &str),
{
    fn handle_logfmt(&mut self, key: &str, val: &str) {
        self(key, val)
    }
}

#[derive(Clone, Copy)]
enum State {
    Garbage,
    Key,
    Equal,
    Value,
    QuotedValue,
}

fn is_ident(c: u8) -> bool {
    c > b' ' && c != b'"' && c != b'='
}

/// Decodes `data`, calling `handler` for each pair.
///
/// Pairs preceding a malformed quoted value have already been handed to
/// `handler` when the error is returned.
pub fn decode<H: Handler + ?Sized>(data: &str, handler: &mut H) -> Result<(), ParseError> {
    let bytes = data.as_bytes();
    let len = bytes.len();
    let mut state = State::Garbage;
    let mut i = 0;
    let mut start = 0;
    let mut key = "";
    let mut escaped = false;

    // every slice boundary below sits on an ASCII delimiter or the end of input
    loop {
        match state {
            State::Garbage => {
                if i >= len {
                    return Ok(());
                }
                if is_ident(bytes[i]) {
                    start = i;
                    state = State::Key;
                }
                i += 1;
            }
            State::Key => {
                if i >= len {
                    handler.handle_logfmt(&data[start..], "");
                    return Ok(());
                }
                let c = bytes[i];
                if is_ident(c) {
                    i += 1;
                    continue;
                }
                key = &data[start..i];
                i += 1;
                if c == b'=' {
                    state = State::Equal;
                } else {
                    handler.handle_logfmt(key, "");
                    state = State::Garbage;
                }
            }
            State::Equal => {
                if i >= len {
                    handler.handle_logfmt(key, "");
                    return Ok(());
                }
                let c = bytes[i];
                if is_ident(c) {
                    start = i;
                    state = State::Value;
                } else if c == b'"' {
                    start = i;
                    escaped = false;
                    state = State::QuotedValue;
                } else {
                    handler.handle_logfmt(key, "");
                    state = State::Garbage;
                }
                i += 1;
            }
            State::Value => {
                if i >= len {
                    handler.handle_logfmt(key, &data[start..]);
                    return Ok(());
                }
                if is_ident(bytes[i]) {
                    i += 1;
                    continue;
                }
                handler.handle_logfmt(key, &data[start..i]);
                i += 1;
                state = State::Garbage;
            }
            State::QuotedValue => {
                if i >= len {
                    return Err(ParseError::UnterminatedString);
                }
                match bytes[i] {
                    b'\\' => {
                        i += 2;
                        escaped = true;
                    }
                    b'"' => {
                        let raw = &data[start + 1..i];
                        let val = if escaped {
                            unquote(raw)?
                        } else {
                            Cow::Borrowed(raw)
                        };
                        handler.handle_logfmt(key, &val);
                        i += 1;
                        state = State::Garbage;
                    }
                    _ => i += 1,
                }
            }
        }
    }
}

fn unquote(raw: &str) -> Result<Cow<'_, str>, ParseError> {
    let invalid = || ParseError::InvalidEscape(raw.to_string());
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next().ok_or_else(invalid)? {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            '/' => out.push('/'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' => {
                let high = hex4(&mut chars).ok_or_else(invalid)?;
                let code = if (0xD800..0xDC00).contains(&high) {
                    // a high surrogate only pairs with an immediately following \uDC00-\uDFFF
                    let mut lookahead = chars.clone();
                    let low = match (lookahead.next(), lookahead.next()) {
                        (Some('\\'), Some('u')) => hex4(&mut lookahead),
                        _ => None,
                    };
                    match low {
                        Some(low) if (0xDC00..0xE000).contains(&low) => {
                            chars = lookahead;
                            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                        }
                        _ => 0xFFFD,
                    }
                } else {
                    high
                };
                out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            _ => return Err(invalid()),
        }
    }

    Ok(Cow::Owned(out))
}

fn hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let mut code = 0;
    for _ in 0..4 {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    Some(code)
}
