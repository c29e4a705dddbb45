//! The tag bytes shared by the decoder and the encoder.

/// Starts a dictionary
pub const DICT_START: u8 = b'd';
/// Starts a list
pub const LIST_START: u8 = b'l';
/// Starts an integer
pub const INT_START: u8 = b'i';
/// Separates the length of a byte string from its content
pub const SEPARATOR: u8 = b':';
/// Terminates an integer, a list or a dictionary
pub const END: u8 = b'e';
/// Leading sign of a negative integer
pub const MINUS: u8 = b'-';

/// The kind of value announced by a leading tag byte
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub enum Tag {
    /// The beginning of a dictionary
    Dict,
    /// The beginning of a list
    List,
    /// The beginning of an integer
    Integer,
    /// A byte string; carries the first digit of its length
    Bytes(u8),
}

impl Tag {
    /// Classify a leading byte. Returns `None` for anything that can't start a value,
    /// including the terminator `e`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            DICT_START => Some(Tag::Dict),
            LIST_START => Some(Tag::List),
            INT_START => Some(Tag::Integer),
            b'0'..=b'9' => Some(Tag::Bytes(byte)),
            _ => None,
        }
    }

    /// Human readable name of the tag
    pub fn name(&self) -> &'static str {
        match *self {
            Tag::Dict => "Dict",
            Tag::List => "List",
            Tag::Integer => "Integer",
            Tag::Bytes(_) => "Bytes",
        }
    }
}
