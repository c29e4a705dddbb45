use std::io;

use thiserror::Error;

/// An enumeration of potential errors that appear during bencode encoding.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The value has no bencode representation and no fallback handled it.
    #[error("object of type {type_name} is not bencode serializable")]
    Unsupported { type_name: &'static str },

    /// A dictionary mixes text and byte string keys, which can't be ordered.
    #[error("dict keys must be all str or all bytes, not a mix of both")]
    MixedKeyTypes,

    /// A list or dictionary contains itself.
    #[error("circular reference detected")]
    CircularReference,

    /// The value nests lists and dictionaries deeper than the encoder allows.
    #[error("maximum nesting depth exceeded")]
    NestingTooDeep,

    /// Writing to the output failed.
    #[error("failed to write encoded output")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl Error {
    /// Whether the error is about the type of a value or key, rather than the structure
    /// of the tree or the output
    pub fn is_type_error(&self) -> bool {
        matches!(self, Error::Unsupported { .. } | Error::MixedKeyTypes)
    }
}

#[test]
fn encoding_errors_are_sync_send() {
    fn is_send<T: Send>() {}
    fn is_sync<T: Sync>() {}
    is_send::<Error>();
    is_sync::<Error>();
}
