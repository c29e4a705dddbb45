//! Decodes bencoded values
//!
//! # Basic decoding
//! For any decoding process, first we need to create a decoder:
//!
//! ```
//! # use torrent_bencode::decoding::Decoder;
//! #
//! let _decoder = Decoder::new();
//! ```
//!
//! Decoders have a depth limit to prevent resource exhaustion from hostile inputs. By default
//! it's set high enough for anything you'd find in a torrent file, but the higher the limit,
//! the more stack space an attacker can make the decoder use, so we recommend setting the
//! bounds tightly:
//!
//! ```
//! # use torrent_bencode::decoding::Decoder;
//! #
//! let _decoder = Decoder::new().with_max_depth(3);
//! ```
//!
//! Atoms (integers and strings) have depth zero, and lists and dicts have a depth equal to the
//! depth of their deepest member plus one. As a special case, an empty list or dict has depth 1.
//!
//! Now, you can read values:
//!
//! ```
//! # use torrent_bencode::{decoding::Decoder, Value};
//! #
//! let decoder = Decoder::new();
//! let value = decoder.decode_bytes(b"d3:fooli1ei2eee").unwrap();
//!
//! assert_eq!(
//!     value.get("foo"),
//!     Some(&Value::List(vec![Value::from(1), Value::from(2)]))
//! );
//! ```
//!
//! Byte strings are never turned into text, with one exception: dictionary keys are decoded
//! as text unless the decoder is told otherwise with [`Decoder::with_dict_keys_as_text`].
//!
//! # Hooks
//!
//! Decoded values can be rewritten while the tree is built. An object hook replaces every
//! dictionary once it's complete, a pairs hook replaces every list element and dictionary
//! value as soon as it has been read:
//!
//! ```
//! # use torrent_bencode::{decoding::Decoder, Value};
//! #
//! let decoder = Decoder::new()
//!     .with_object_hook(|dict| Value::from(dict.len()))
//!     .with_pairs_hook(|value| value);
//!
//! assert_eq!(decoder.decode_bytes(b"d1:ai1e1:bi2ee").unwrap(), Value::from(2));
//! ```
//!
//! # Error handling
//!
//! Decoding stops at the first malformed byte. The error names what was expected and the
//! offset of the byte that broke it; no partially decoded value is returned.
//!
//! ```
//! # use torrent_bencode::decoding::Decoder;
//! #
//! let err = Decoder::new().decode_bytes(b"li1ei2xe").unwrap_err();
//! assert_eq!(err.to_string(), "invalid list value: invalid int: (char 6)");
//! assert_eq!(err.offset(), 6);
//! ```

mod decoder;
mod error;

pub use self::{
    decoder::{DEFAULT_MAX_DEPTH, Decoder, ObjectHook, PairsHook},
    error::{Error, ErrorKind},
};
