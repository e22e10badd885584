//! # Language Module
//!
//! Language specific operations live in the submodules; at present only
//! F-BASIC is supported, and only in the disk-to-source direction.

pub mod fbasic;

/// Enumerates language errors.  The `Display` trait will print the equivalent long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("tokenized stream ended unexpectedly")]
    TruncatedStream,
    #[error("detokenization error")]
    Detokenization
}
