//! Module containing the F-BASIC detokenizer
//!
//! Each tokenized line on disk is a 2-byte link pointer, a 2-byte
//! big-endian line number, the token stream, and a 0x00 terminator.  The
//! decoder walks the bytes through a small state machine and reproduces the
//! spacing of the original LIST output, which requires holding back a `:`
//! until the following token is known.

use std::collections::HashMap;
use log::error;
use super::{token_maps,charset,decode_float,decode_double};
use crate::lang;
use crate::DYNERR;

#[derive(PartialEq,Clone,Copy)]
enum State {
    SkipLink,
    LineNum,
    Token,
    TokenFf,
    StringLit,
    Remark,
    Literal
}

#[derive(PartialEq,Clone,Copy)]
enum TokenType {
    Keyword,
    Literal,
    StringLiteral,
    Remark,
    LineNumber,
    Eol,
    PlainChars,
    Others
}

/// Accumulates decoded text while reproducing the LIST spacing rules:
/// a `:` right after the line number is dropped, any other `:` is deferred
/// until the next token decides its fate, and a keyword or plain character
/// directly after the line number gets one leading space.
struct StringBuffer {
    data: String,
    deferred: String,
    previous_type: TokenType
}

impl StringBuffer {
    fn new() -> Self {
        Self {
            data: String::new(),
            deferred: String::new(),
            previous_type: TokenType::Others
        }
    }
    fn push(&mut self,token: &str,token_type: TokenType) {
        if token == ":" {
            if self.previous_type == TokenType::LineNumber {
                return;
            }
            if self.deferred == ":" {
                // consecutive separators collapse to one
                self.deferred.clear();
            } else {
                self.deferred = ":".to_string();
                return;
            }
        }
        if token == "'" || token == "REM" || token == "ELSE" {
            self.deferred.clear();
        }
        self.data += &self.deferred;
        if token_type == TokenType::Keyword || token_type == TokenType::PlainChars {
            if self.previous_type == TokenType::LineNumber {
                self.data += " ";
            }
        }
        self.data += token;
        self.deferred.clear();
        self.previous_type = token_type;
    }
    fn finalize(mut self) -> String {
        self.data += &self.deferred;
        self.data
    }
}

/// Handles detokenization of F-BASIC
pub struct Detokenizer {
    detok_map: HashMap<u8,&'static str>,
    detok_map_ff: HashMap<u8,&'static str>
}

impl Detokenizer {
    /// Create a new `Detokenizer` structure
    pub fn new() -> Self {
        Self {
            detok_map: HashMap::from(token_maps::KEYWORDS),
            detok_map_ff: HashMap::from(token_maps::KEYWORDS_FF)
        }
    }
    /// Detokenize from byte array into a UTF8 string.  The stream should be
    /// the token image only, any file wrapper already stripped.
    pub fn detokenize(&self,tokens: &[u8]) -> Result<String,DYNERR> {
        let mut res = StringBuffer::new();
        let mut state = State::SkipLink;
        let mut decode_buf: Vec<u8> = Vec::new();
        let mut literal_type: u8 = 0;
        for &ir in tokens {
            match state {
                State::SkipLink => {
                    decode_buf.push(ir);
                    if decode_buf.len() < 2 {
                        continue;
                    }
                    // a null link pointer ends the program
                    if decode_buf[0]==0 || decode_buf[1]==0 {
                        break;
                    }
                    decode_buf.clear();
                    state = State::LineNum;
                },
                State::LineNum => {
                    decode_buf.push(ir);
                    if decode_buf.len() < 2 {
                        continue;
                    }
                    let line_num = u16::from_be_bytes([decode_buf[0],decode_buf[1]]);
                    res.push(&line_num.to_string(),TokenType::LineNumber);
                    decode_buf.clear();
                    state = State::Token;
                },
                State::Token => {
                    if ir == 0x00 {
                        res.push("\n",TokenType::Eol);
                        decode_buf.clear();
                        state = State::SkipLink;
                        continue;
                    }
                    if ir == 0xfe {
                        literal_type = 0;
                        decode_buf.clear();
                        state = State::Literal;
                        continue;
                    }
                    if ir == 0xff {
                        state = State::TokenFf;
                        continue;
                    }
                    if let Some(keyword) = self.detok_map.get(&ir) {
                        res.push(keyword,TokenType::Keyword);
                        if *keyword == "'" || *keyword == "REM" {
                            state = State::Remark;
                        }
                        continue;
                    }
                    res.push(&charset::to_utf8(ir),TokenType::PlainChars);
                    if ir == b'"' {
                        state = State::StringLit;
                    }
                },
                State::TokenFf => {
                    if let Some(keyword) = self.detok_map_ff.get(&ir) {
                        res.push(keyword,TokenType::Keyword);
                    }
                    state = State::Token;
                },
                State::Literal => {
                    if literal_type == 0 {
                        literal_type = ir;
                        if !matches!(ir,0x01|0x02|0xf2|0x04|0x08) {
                            error!("unknown literal type {:02X}",ir);
                            return Err(Box::new(lang::Error::Detokenization));
                        }
                        continue;
                    }
                    decode_buf.push(ir);
                    let needed: usize = match literal_type {
                        0x01 => 1,
                        0x02 | 0xf2 => 2,
                        0x04 => 4,
                        _ => 8
                    };
                    if decode_buf.len() < needed {
                        continue;
                    }
                    let literal_str = match literal_type {
                        0x01 => decode_buf[0].to_string(),
                        0x02 | 0xf2 => u16::from_be_bytes([decode_buf[0],decode_buf[1]]).to_string(),
                        0x04 => Self::format_real(decode_float(&decode_buf),'!'),
                        _ => Self::format_real(decode_double(&decode_buf),'#')
                    };
                    res.push(&literal_str,TokenType::Literal);
                    decode_buf.clear();
                    state = State::Token;
                },
                State::StringLit => {
                    if ir == 0x00 {
                        res.push("\n",TokenType::Eol);
                        decode_buf.clear();
                        state = State::SkipLink;
                        continue;
                    }
                    res.push(&charset::to_utf8(ir),TokenType::StringLiteral);
                    if ir == b'"' {
                        state = State::Token;
                    }
                },
                State::Remark => {
                    if ir == 0x00 {
                        res.push("\n",TokenType::Eol);
                        decode_buf.clear();
                        state = State::SkipLink;
                        continue;
                    }
                    res.push(&charset::to_utf8(ir),TokenType::Remark);
                }
            }
        }
        // ending inside a line number or a literal means the stream was cut off
        if state == State::LineNum || state == State::Literal {
            error!("program ended in the middle of a {} field",match state {
                State::LineNum => "line number",
                _ => "literal"
            });
            return Err(Box::new(lang::Error::TruncatedStream));
        }
        Ok(res.finalize())
    }
    /// Integer-valued reals print as integers with the precision suffix.
    fn format_real(val: f64,suffix: char) -> String {
        if val.fract() == 0.0 {
            format!("{}{}",val as i64,suffix)
        } else {
            format!("{}",val)
        }
    }
}
