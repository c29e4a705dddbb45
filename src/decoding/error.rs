use std::io;

use thiserror::Error;

/// A decoding failure, and the offset of the byte that caused it
#[derive(Debug, Error)]
#[error("{kind}: (char {offset})")]
pub struct Error {
    kind: ErrorKind,
    offset: usize,
}

/// An enumeration of potential errors that appear during bencode decoding.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A value started with a byte that is none of `d`, `l`, `i` or a digit.
    #[error("unknown value type {found:?}")]
    UnknownValueType { found: char },

    /// A dictionary key was not a byte string, or not text when text keys were requested.
    #[error("invalid dict key")]
    InvalidDictKey,

    /// Decoding a dictionary value failed.
    #[error("invalid dict value: {0}")]
    InvalidDictValue(Box<ErrorKind>),

    /// Decoding a list element failed.
    #[error("invalid list value: {0}")]
    InvalidListValue(Box<ErrorKind>),

    /// The length of a byte string was malformed.
    #[error("invalid str")]
    InvalidStr,

    /// An integer was malformed.
    #[error("invalid int")]
    InvalidInt,

    /// The input ended in the middle of a value.
    #[error("reached EOF in the middle of a value")]
    UnexpectedEof,

    /// The input nests lists and dictionaries deeper than the decoder allows.
    #[error("maximum nesting depth exceeded")]
    NestingTooDeep,

    /// The underlying reader failed.
    #[error("failed to read input")]
    Io(#[source] io::Error),
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> Self {
        Error { kind, offset }
    }

    /// What went wrong
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Offset of the offending byte in the input
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The innermost cause, looking through the list and dict wrappers
    pub fn root_kind(&self) -> &ErrorKind {
        let mut kind = &self.kind;
        while let ErrorKind::InvalidDictValue(inner) | ErrorKind::InvalidListValue(inner) = kind {
            kind = &**inner;
        }
        kind
    }

    /// Report this error as the failure of an enclosing list or dict, keeping the offset
    pub(crate) fn within(self, wrap: fn(Box<ErrorKind>) -> ErrorKind) -> Self {
        Error {
            kind: wrap(Box::new(self.kind)),
            offset: self.offset,
        }
    }
}

#[test]
fn decoding_errors_are_sync_send() {
    fn is_send<T: Send>() {}
    fn is_sync<T: Sync>() {}
    is_send::<Error>();
    is_sync::<Error>();
}

#[test]
fn wrapped_errors_keep_offset_and_root() {
    let err = Error::new(ErrorKind::InvalidInt, 7)
        .within(ErrorKind::InvalidListValue)
        .within(ErrorKind::InvalidDictValue);

    assert_eq!(err.offset(), 7);
    assert!(matches!(err.root_kind(), ErrorKind::InvalidInt));
    assert_eq!(
        err.to_string(),
        "invalid dict value: invalid list value: invalid int: (char 7)"
    );
}
