use std::{
    fmt::{self, Debug, Formatter},
    io::{self, Read},
    sync::Arc,
};

use num_bigint::BigInt;
use smallvec::SmallVec;

use crate::{
    decoding::{Error, ErrorKind},
    token::{END, MINUS, SEPARATOR, Tag},
    value::{Dict, Key, Value},
};

/// Default limit for the nesting of lists and dictionaries
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Transform applied to every completed dictionary
pub type ObjectHook = dyn Fn(Dict) -> Value + Send + Sync;

/// Transform applied to every list element and dictionary value right after it is read
pub type PairsHook = dyn Fn(Value) -> Value + Send + Sync;

/// A bencode decoder
///
/// The decoder only holds its configuration; every call to [`Decoder::decode`] starts
/// from scratch, so one decoder can be shared between threads.
#[derive(Clone)]
pub struct Decoder {
    dict_keys_as_text: bool,
    object_hook: Option<Arc<ObjectHook>>,
    pairs_hook: Option<Arc<PairsHook>>,
    max_depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder {
            dict_keys_as_text: true,
            object_hook: None,
            pairs_hook: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Debug for Decoder {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("dict_keys_as_text", &self.dict_keys_as_text)
            .field("object_hook", &self.object_hook.is_some())
            .field("pairs_hook", &self.pairs_hook.is_some())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl Decoder {
    /// Create a decoder that reads dictionary keys as text and has no hooks
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Whether dictionary keys are decoded as text ([`Key::Text`]) or left as raw byte
    /// strings ([`Key::Bytes`]). Keys that aren't valid UTF-8 fail to decode as text.
    #[must_use]
    pub fn with_dict_keys_as_text(mut self, dict_keys_as_text: bool) -> Self {
        self.dict_keys_as_text = dict_keys_as_text;
        self
    }

    /// Replace every completed dictionary, including the top level one, with the
    /// result of `hook`
    #[must_use]
    pub fn with_object_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(Dict) -> Value + Send + Sync + 'static,
    {
        self.object_hook = Some(Arc::new(hook));
        self
    }

    /// Replace every list element and dictionary value with the result of `hook`,
    /// right after it has been read. The top level value is not passed to the hook.
    #[must_use]
    pub fn with_pairs_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.pairs_hook = Some(Arc::new(hook));
        self
    }

    /// Set the maximum nesting depth of the decoder. Atoms have depth zero, and lists and
    /// dicts have a depth one greater than their deepest member (an empty list has depth 1).
    ///
    /// The decoder recurses once per level, so the limit also bounds its stack usage.
    #[must_use]
    pub fn with_max_depth(mut self, new_max_depth: usize) -> Self {
        self.max_depth = new_max_depth;
        self
    }

    /// Read exactly one value from `reader`.
    ///
    /// Bytes are pulled one at a time and nothing past the end of the value is consumed,
    /// so several values can be read from one stream by passing `&mut reader`. Wrap
    /// unbuffered readers such as files in a [`std::io::BufReader`].
    pub fn decode<R: Read>(&self, reader: R) -> Result<Value, Error> {
        let mut source = Source::new(reader);

        match self.read_value(&mut source, None, 0) {
            Ok(value) => {
                tracing::trace!(bytes = source.offset, "decoded bencode value");
                Ok(value)
            },
            Err(err) => {
                tracing::debug!(error = %err, offset = err.offset(), "bencode decoding failed");
                Err(err)
            },
        }
    }

    /// Read exactly one value from the start of `bytes`
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<Value, Error> {
        self.decode(bytes)
    }

    fn read_value<R: Read>(
        &self,
        source: &mut Source<R>,
        prefetched: Option<u8>,
        depth: usize,
    ) -> Result<Value, Error> {
        let byte = match prefetched {
            Some(byte) => byte,
            None => source.take_byte()?,
        };

        match Tag::from_byte(byte) {
            Some(Tag::Dict) => self.read_dict(source, depth + 1),
            Some(Tag::List) => self.read_list(source, depth + 1),
            Some(Tag::Integer) => self.read_integer(source).map(Value::Integer),
            Some(Tag::Bytes(first_digit)) => self.read_bytes(source, first_digit).map(Value::Bytes),
            None => Err(source.error(ErrorKind::UnknownValueType {
                found: byte as char,
            })),
        }
    }

    fn read_dict<R: Read>(&self, source: &mut Source<R>, depth: usize) -> Result<Value, Error> {
        self.check_depth(source, depth)?;

        let mut dict = Dict::new();
        loop {
            let byte = source.take_byte()?;
            if byte == END {
                break;
            }

            // A key cut short by the end of input is still a bad key
            let key = self.read_key(source, byte).map_err(|err| {
                if matches!(err.kind(), ErrorKind::UnexpectedEof) {
                    Error::new(ErrorKind::InvalidDictKey, err.offset())
                } else {
                    err
                }
            })?;
            let value = self
                .read_value(source, None, depth)
                .map_err(|err| err.within(ErrorKind::InvalidDictValue))?;

            // Later duplicates win, but keep the position of the first occurrence
            dict.insert(key, self.after_child(value));
        }

        Ok(match &self.object_hook {
            Some(hook) => hook(dict),
            None => Value::Dict(dict),
        })
    }

    fn read_list<R: Read>(&self, source: &mut Source<R>, depth: usize) -> Result<Value, Error> {
        self.check_depth(source, depth)?;

        let mut list = Vec::new();
        loop {
            let byte = source.take_byte()?;
            if byte == END {
                return Ok(Value::List(list));
            }

            let value = self
                .read_value(source, Some(byte), depth)
                .map_err(|err| err.within(ErrorKind::InvalidListValue))?;
            list.push(self.after_child(value));
        }
    }

    fn read_key<R: Read>(&self, source: &mut Source<R>, first: u8) -> Result<Key, Error> {
        if !first.is_ascii_digit() {
            return Err(source.error(ErrorKind::InvalidDictKey));
        }

        let len = match source.take_digits(first, SEPARATOR)? {
            Some(digits) => parse_length(&digits),
            None => None,
        }
        .ok_or_else(|| source.error(ErrorKind::InvalidDictKey))?;
        let bytes = source.take_chunk(len)?;

        if self.dict_keys_as_text {
            String::from_utf8(bytes)
                .map(Key::Text)
                .map_err(|_| source.error(ErrorKind::InvalidDictKey))
        } else {
            Ok(Key::Bytes(bytes))
        }
    }

    fn read_bytes<R: Read>(&self, source: &mut Source<R>, first_digit: u8) -> Result<Vec<u8>, Error> {
        let len = match source.take_digits(first_digit, SEPARATOR)? {
            Some(digits) => parse_length(&digits),
            None => None,
        }
        .ok_or_else(|| source.error(ErrorKind::InvalidStr))?;

        source.take_chunk(len)
    }

    fn read_integer<R: Read>(&self, source: &mut Source<R>) -> Result<BigInt, Error> {
        let mut byte = source.take_byte()?;
        let negative = byte == MINUS;
        if negative {
            byte = source.take_byte()?;
        }

        let magnitude = match source.take_digits(byte, END)? {
            Some(digits) => BigInt::parse_bytes(&digits, 10),
            None => None,
        }
        .ok_or_else(|| source.error(ErrorKind::InvalidInt))?;

        Ok(if negative { -magnitude } else { magnitude })
    }

    fn after_child(&self, value: Value) -> Value {
        match &self.pairs_hook {
            Some(hook) => hook(value),
            None => value,
        }
    }

    fn check_depth<R>(&self, source: &Source<R>, depth: usize) -> Result<(), Error> {
        if depth > self.max_depth {
            Err(source.error(ErrorKind::NestingTooDeep))
        } else {
            Ok(())
        }
    }
}

fn parse_length(digits: &[u8]) -> Option<usize> {
    digits.iter().try_fold(0usize, |len, digit| {
        len.checked_mul(10)?.checked_add(usize::from(digit - b'0'))
    })
}

type Digits = SmallVec<[u8; 20]>;

/// A forward-only byte stream that knows how far it has read
struct Source<R> {
    reader: R,
    offset: usize,
}

impl<R> Source<R> {
    fn new(reader: R) -> Self {
        Source { reader, offset: 0 }
    }

    /// An error pointing at the last byte consumed
    fn error(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.offset.saturating_sub(1))
    }
}

impl<R: Read> Source<R> {
    fn take_byte(&mut self) -> Result<u8, Error> {
        let mut byte = [0u8];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Err(self.error(ErrorKind::UnexpectedEof)),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(byte[0]);
                },
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {},
                Err(err) => return Err(self.error(ErrorKind::Io(err))),
            }
        }
    }

    fn take_chunk(&mut self, count: usize) -> Result<Vec<u8>, Error> {
        // Grows with the data actually read, so a bogus length can't force a huge allocation
        let mut chunk = Vec::new();
        let read = self
            .reader
            .by_ref()
            .take(count as u64)
            .read_to_end(&mut chunk);
        self.offset += chunk.len();

        match read {
            Ok(_) if chunk.len() == count => Ok(chunk),
            Ok(_) => Err(self.error(ErrorKind::UnexpectedEof)),
            Err(err) => Err(self.error(ErrorKind::Io(err))),
        }
    }

    /// Collect decimal digits, starting with the already consumed `first`, up to
    /// `terminator`. Returns `Ok(None)` if any other byte shows up, or if there are no
    /// digits at all.
    fn take_digits(&mut self, first: u8, terminator: u8) -> Result<Option<Digits>, Error> {
        let mut digits = Digits::new();
        let mut byte = first;
        loop {
            match byte {
                b'0'..=b'9' => digits.push(byte),
                _ if byte == terminator && !digits.is_empty() => return Ok(Some(digits)),
                _ => return Ok(None),
            }
            byte = self.take_byte()?;
        }
    }
}
