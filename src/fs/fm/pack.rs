//! Unwrapping of the file framings stored by F-BASIC.
//!
//! Payloads read off the disk carry a wrapper that depends on the directory
//! attributes: tokenized BASIC has an id byte, the UNLIST line number, and
//! an end marker; machine code has lengths and addresses in big-endian;
//! ASCII saves are terminated by 0x1A.  `extract_contents` strips the
//! wrapper and reports what it found; anything unrecognized comes back as
//! `FileContents::Unsupported` rather than an error.

use log::debug;
use super::super::FileContents;

/// end marker of an unprotected tokenized BASIC file
const BASIC_EOF: [u8;4] = [0x00,0x00,0x00,0x1a];
/// separator between machine code and its entry address
const MC_SEPARATOR: [u8;3] = [0xff,0x00,0x00];
const EOF: u8 = 0x1a;

fn extract_basic(file_data: &[u8]) -> FileContents {
    if file_data.len() < 4 {
        return FileContents::Unsupported;
    }
    match file_data[0] {
        0xff => {
            // unprotected: little-endian UNLIST, then tokens up to the marker
            let unlist = u16::from_le_bytes([file_data[1],file_data[2]]);
            for pos in 3..=file_data.len()-4 {
                if file_data[pos..pos+4] == BASIC_EOF {
                    return FileContents::BasicTokens {
                        tokens: file_data[3..pos].to_vec(),
                        unlist
                    };
                }
            }
            debug!("no end marker in tokenized BASIC payload");
            FileContents::Unsupported
        },
        0xfe => {
            // protected: big-endian UNLIST, tokens run to the first EOF byte
            let unlist = u16::from_be_bytes([file_data[1],file_data[2]]);
            for pos in 3..file_data.len() {
                if file_data[pos] == EOF {
                    return FileContents::BasicTokensProtected {
                        tokens: file_data[3..pos].to_vec(),
                        unlist
                    };
                }
            }
            debug!("no end marker in protected BASIC payload");
            FileContents::Unsupported
        },
        _ => FileContents::Unsupported
    }
}

fn extract_machine(file_data: &[u8]) -> FileContents {
    if file_data.len() < 5 || file_data[0] != 0x00 {
        return FileContents::Unsupported;
    }
    let length = u16::from_be_bytes([file_data[1],file_data[2]]) as usize;
    let load_address = u16::from_be_bytes([file_data[3],file_data[4]]);
    if file_data.len() < 5 + length + MC_SEPARATOR.len() + 3 {
        return FileContents::Unsupported;
    }
    if file_data[5+length..5+length+3] != MC_SEPARATOR {
        return FileContents::Unsupported;
    }
    let entry_address = u16::from_be_bytes([file_data[5+length+3],file_data[5+length+4]]);
    if file_data[5+length+5] != EOF {
        return FileContents::Unsupported;
    }
    FileContents::MachineCode {
        data: file_data[5..5+length].to_vec(),
        load_address,
        entry_address
    }
}

fn extract_ascii(file_data: &[u8]) -> FileContents {
    match file_data.iter().position(|b| *b==EOF) {
        Some(pos) => FileContents::Ascii(file_data[0..pos].to_vec()),
        None => FileContents::Unsupported
    }
}

/// Strip the file wrapper selected by the directory attributes.
/// `file_type`: 0 BASIC source, 1 BASIC data, 2 machine code.
/// `ascii_flag`: 0x00 binary, 0xFF ASCII.
pub fn extract_contents(file_data: &[u8],file_type: u8,ascii_flag: u8) -> FileContents {
    match (ascii_flag,file_type) {
        (0x00,0x00) => extract_basic(file_data),
        (0x00,0x02) => extract_machine(file_data),
        (0xff,_) => extract_ascii(file_data),
        _ => FileContents::Unsupported
    }
}
