//! Encodes values into canonical bencode
//!
//! # Encoding a value
//!
//! ```
//! # use torrent_bencode::{encoding::Encoder, Dict, Key, Value};
//! #
//! let mut info = Dict::new();
//! info.insert(Key::from("name"), Value::from("spam.iso"));
//! info.insert(Key::from("length"), Value::from(1024));
//!
//! let encoded = Encoder::new().encode(&Value::Dict(info)).unwrap();
//! assert_eq!(encoded, b"d6:lengthi1024e4:name8:spam.isoe");
//! ```
//!
//! Dictionary keys are always emitted in ascending byte order, no matter which order they
//! were inserted in. Text is written as its UTF-8 bytes, so text and byte strings have the
//! same representation.
//!
//! # Values without a representation
//!
//! Anything wrapped in [`Value::Foreign`](crate::Value::Foreign) can only be encoded with a
//! fallback. Without one, the encoder fails with [`Error::Unsupported`]:
//!
//! ```
//! # use std::io::Write;
//! # use torrent_bencode::{encoding::{Encoder, Error}, Value};
//! #
//! let value = Value::List(vec![Value::from(1), Value::foreign(0.5f64)]);
//! assert!(matches!(
//!     Encoder::new().encode(&value),
//!     Err(Error::Unsupported { type_name: "f64" })
//! ));
//!
//! let encoder = Encoder::new().with_fallback(|sink, _| {
//!     sink.write_all(b"0:")?;
//!     Ok(())
//! });
//! assert_eq!(encoder.encode(&value).unwrap(), b"li1e0:e");
//! ```
//!
//! # Shared values and cycles
//!
//! A [`Shared`](crate::Shared) handle may appear any number of times in a tree and is
//! encoded in full at every position. A handle that is reachable from its own contents
//! would make the output infinite, so the encoder fails with
//! [`Error::CircularReference`] instead:
//!
//! ```
//! # use torrent_bencode::{encoding::{Encoder, Error}, Shared, Value};
//! #
//! let shared = Shared::new(Value::List(Vec::new()));
//! let twice = Value::List(vec![Value::Shared(shared.clone()), Value::Shared(shared.clone())]);
//! assert_eq!(Encoder::new().encode(&twice).unwrap(), b"llelee");
//!
//! *shared.borrow_mut() = Value::List(vec![Value::Shared(shared.clone())]);
//! assert!(matches!(
//!     Encoder::new().encode(&twice),
//!     Err(Error::CircularReference)
//! ));
//! # *shared.borrow_mut() = Value::from(0);
//! ```
//!
//! # Nesting depth limits
//!
//! Like the decoder, the encoder refuses to nest lists and dictionaries deeper than
//! [`DEFAULT_MAX_DEPTH`], which can be changed with [`Encoder::with_max_depth`]. Every
//! [`Shared`](crate::Shared) handle on the way down counts as one level as well.
//!
//! # Error handling
//!
//! Encoding stops at the first error. When encoding into a writer, whatever was written up
//! to that point is not a complete value.

mod cycle_guard;
mod encoder;
mod error;

pub use self::{
    encoder::{DEFAULT_MAX_DEPTH, Encoder, Fallback},
    error::Error,
};

#[cfg(feature = "serde")]
pub(crate) use self::cycle_guard::CycleGuard;
