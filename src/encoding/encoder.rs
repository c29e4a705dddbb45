use std::{
    fmt::{self, Debug, Formatter},
    io::Write,
    sync::Arc,
};

use num_bigint::BigInt;

use crate::{
    encoding::{Error, cycle_guard::CycleGuard},
    token::{DICT_START, END, INT_START, LIST_START, SEPARATOR},
    value::{Dict, Foreign, Key, Shared, Value},
};

/// Default limit for the nesting of lists and dictionaries
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Writes host values the format can't represent
pub type Fallback = dyn Fn(&mut dyn Write, &Foreign) -> Result<(), Error> + Send + Sync;

/// The encoder. Produces canonical bencode: dictionary keys are always written in
/// ascending byte order, whatever order the dictionary holds them in.
///
/// Like the decoder, it only holds configuration. The state of a traversal lives for
/// one call to [`Encoder::encode`] or [`Encoder::encode_to`].
#[derive(Clone)]
pub struct Encoder {
    fallback: Option<Arc<Fallback>>,
    max_depth: usize,
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder {
            fallback: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Debug for Encoder {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("fallback", &self.fallback.is_some())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Write [`Value::Foreign`] values with `fallback` instead of failing.
    ///
    /// The fallback gets the output stream and is expected to write exactly one complete
    /// bencode value to it. Whatever it writes is used verbatim.
    #[must_use]
    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&mut dyn Write, &Foreign) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    /// Set the max depth of the encoded object
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Encode a value to a byte string
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, Error> {
        let mut output = Vec::new();
        self.encode_to(value, &mut output)?;

        tracing::trace!(bytes = output.len(), "encoded bencode value");
        Ok(output)
    }

    /// Encode a value into `writer`.
    ///
    /// On error, whatever has already been written is an incomplete value and should be
    /// discarded.
    pub fn encode_to<W: Write>(&self, value: &Value, writer: W) -> Result<(), Error> {
        let mut emitter = Emitter {
            encoder: self,
            writer,
            guard: CycleGuard::default(),
            depth: 0,
        };

        emitter
            .write_value(value)
            .inspect_err(|err| tracing::debug!(error = %err, "bencode encoding failed"))
    }
}

/// State of one encoding pass
struct Emitter<'a, W> {
    encoder: &'a Encoder,
    writer: W,
    guard: CycleGuard,
    depth: usize,
}

impl<W: Write> Emitter<'_, W> {
    fn write_value(&mut self, value: &Value) -> Result<(), Error> {
        match value {
            Value::Dict(dict) => self.write_dict(dict),
            Value::List(list) => self.write_list(list),
            Value::Integer(int) => self.write_integer(int),
            Value::Bytes(bytes) => self.write_bytes(bytes),
            Value::Text(text) => self.write_bytes(text.as_bytes()),
            Value::Shared(shared) => self.write_shared(shared),
            Value::Foreign(foreign) => self.write_foreign(foreign),
        }
    }

    fn write_integer(&mut self, int: &BigInt) -> Result<(), Error> {
        self.writer.write_all(&[INT_START])?;
        write!(self.writer, "{int}")?;
        self.writer.write_all(&[END])?;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        write!(self.writer, "{}", bytes.len())?;
        self.writer.write_all(&[SEPARATOR])?;
        self.writer.write_all(bytes)?;
        Ok(())
    }

    fn write_list(&mut self, list: &[Value]) -> Result<(), Error> {
        self.descend()?;
        self.writer.write_all(&[LIST_START])?;
        for value in list {
            self.write_value(value)?;
        }
        self.writer.write_all(&[END])?;
        self.depth -= 1;
        Ok(())
    }

    fn write_dict(&mut self, dict: &Dict) -> Result<(), Error> {
        let entries = sorted_entries(dict)?;

        self.descend()?;
        self.writer.write_all(&[DICT_START])?;
        for (key, value) in entries {
            self.write_bytes(key.as_bytes())?;
            self.write_value(value)?;
        }
        self.writer.write_all(&[END])?;
        self.depth -= 1;
        Ok(())
    }

    /// Shared handles are the only way a value can be reachable from itself, so they are
    /// the only containers the guard has to track. Each handle also counts as a nesting
    /// level, since handles can point at handles without a list or dict in between.
    fn write_shared(&mut self, shared: &Shared) -> Result<(), Error> {
        let identity = shared.identity();

        self.guard.enter(identity)?;
        self.descend()?;
        self.write_value(&shared.borrow())?;
        self.depth -= 1;
        self.guard.exit(identity);
        Ok(())
    }

    fn write_foreign(&mut self, foreign: &Foreign) -> Result<(), Error> {
        match &self.encoder.fallback {
            Some(fallback) => fallback(&mut self.writer, foreign),
            None => Err(Error::Unsupported {
                type_name: foreign.type_name(),
            }),
        }
    }

    fn descend(&mut self) -> Result<(), Error> {
        if self.depth >= self.encoder.max_depth {
            return Err(Error::NestingTooDeep);
        }
        self.depth += 1;
        Ok(())
    }
}

/// Entries of `dict` in canonical order. Text and byte string keys can't be ordered
/// against each other, so a dict holding both is rejected.
fn sorted_entries(dict: &Dict) -> Result<Vec<(&Key, &Value)>, Error> {
    let has_text = dict.keys().any(|key| matches!(key, Key::Text(_)));
    let has_bytes = dict.keys().any(|key| matches!(key, Key::Bytes(_)));
    if has_text && has_bytes {
        return Err(Error::MixedKeyTypes);
    }

    let mut entries: Vec<_> = dict.iter().collect();
    // Keys of one kind are unique, so an unstable sort is deterministic
    entries.sort_unstable_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
    Ok(entries)
}
