//! Half-width character translation for the platform character set.
//!
//! The machine's byte values map to UTF-8 as follows: the ASCII column
//! passes through unchanged, 0xA1..=0xDF is the half-width katakana block
//! at U+FF61..U+FF9F, and everything else has no printable equivalent and
//! is rendered as a hex escape.

/// Translate one byte to its UTF-8 form.
pub fn to_utf8(byte: u8) -> String {
    match byte {
        0x20..=0x7e => char::from(byte).to_string(),
        0xa1..=0xdf => char::from_u32(0xff61 + byte as u32 - 0xa1).expect("unreachable").to_string(),
        _ => format!("\\x{:02X}",byte)
    }
}

/// Translate a whole byte string, e.g. a file name, to UTF-8.
pub fn to_string(bytes: &[u8]) -> String {
    let mut ans = String::new();
    for byte in bytes {
        ans += &to_utf8(*byte);
    }
    ans
}

/// Single display cell for hex dump columns; unprintable bytes show as `.`
pub fn to_display_char(byte: u8) -> char {
    match byte {
        0x20..=0x7e => char::from(byte),
        0xa1..=0xdf => char::from_u32(0xff61 + byte as u32 - 0xa1).expect("unreachable"),
        _ => '.'
    }
}
