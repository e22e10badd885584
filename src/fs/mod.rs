//! # File System Module
//!
//! The FM file system is represented by `fm::FileSystem`, a transient view
//! that borrows one disk out of a container and interprets its FAT and
//! directory sectors.  Nothing is cached across operations; every FAT or
//! directory access goes back through the disk's sector operations.
//!
//! Unwrapping of the stored file framing (tokenized BASIC headers, machine
//! code headers, ASCII terminators) produces a `FileContents` value.  An
//! unrecognized framing is a `FileContents::Unsupported` result, not an
//! error; the raw payload is always available regardless.

pub mod fm;

/// Enumerates file system errors.  The `Display` trait will print the
/// equivalent F-BASIC style message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("File not found")]
    FileNotFound,
    #[error("File already exists")]
    AlreadyExists,
    #[error("Bad file name")]
    BadFileName,
    #[error("Bad allocation table")]
    CorruptFat,
    #[error("Disk full")]
    DiskFull,
    #[error("Directory full")]
    DirectoryFull,
    #[error("Bad file attribute")]
    BadAttribute,
    #[error("File system mismatch")]
    FileSystemMismatch
}

/// Result of unwrapping a file payload according to its directory attributes.
pub enum FileContents {
    /// tokenized F-BASIC source and the UNLIST line number
    BasicTokens {
        tokens: Vec<u8>,
        unlist: u16
    },
    /// tokenized F-BASIC source saved protected
    BasicTokensProtected {
        tokens: Vec<u8>,
        unlist: u16
    },
    /// machine code with its load and entry addresses
    MachineCode {
        data: Vec<u8>,
        load_address: u16,
        entry_address: u16
    },
    /// ASCII-saved source up to the EOF marker
    Ascii(Vec<u8>),
    /// framing not recognized, caller falls back to the raw payload
    Unsupported
}
