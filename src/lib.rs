//! Encodes and decodes bencoded values.
//!
//! Bencode is the format of torrent metadata files. It knows four kinds of values: integers,
//! byte strings, lists and dictionaries with byte string keys. This crate reads them into a
//! [`Value`] tree and writes trees back out in canonical form, with dictionary keys sorted.
//!
//! ```
//! # use torrent_bencode::Value;
//! #
//! let value = torrent_bencode::loads("d1:ci2e1:ai1e1:b1:2e").unwrap();
//! assert_eq!(value.get("a"), Some(&Value::from(1)));
//!
//! assert_eq!(torrent_bencode::dumps(&value).unwrap(), b"d1:ai1e1:b1:21:ci2ee");
//! ```
//!
//! The functions at the top level use a default [`Decoder`] or [`Encoder`]. Build one
//! yourself to add decoding hooks, a fallback for values bencode can't represent, or a
//! different nesting limit. Both only hold configuration and can be shared between threads.
#![cfg_attr(not(test), warn(missing_docs))]

use std::io::{Read, Write};

pub mod decoding;
pub mod encoding;
pub mod token;
pub mod value;

pub use crate::{
    decoding::Decoder,
    encoding::Encoder,
    value::{Dict, Foreign, Key, Shared, Value},
};

/// Read one value from `reader` with a default [`Decoder`]
pub fn load<R: Read>(reader: R) -> Result<Value, decoding::Error> {
    Decoder::new().decode(reader)
}

/// Decode one value from the start of `bytes` with a default [`Decoder`]
pub fn loads(bytes: impl AsRef<[u8]>) -> Result<Value, decoding::Error> {
    Decoder::new().decode_bytes(bytes.as_ref())
}

/// Write `value` to `writer` with a default [`Encoder`]
pub fn dump<W: Write>(value: &Value, writer: W) -> Result<(), encoding::Error> {
    Encoder::new().encode_to(value, writer)
}

/// Encode `value` with a default [`Encoder`]
pub fn dumps(value: &Value) -> Result<Vec<u8>, encoding::Error> {
    Encoder::new().encode(value)
}
