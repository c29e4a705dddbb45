//! `Value`s hold decoded bencode data, and anything the encoder is asked to write.
//!
//! Beside the four kinds bencode knows about (integers, byte strings, lists and
//! dictionaries) a `Value` can hold:
//!
//! - text, which is written as its UTF-8 bytes,
//! - a [`Shared`] handle, which lets several parts of a tree point at the same
//!   subtree (and is therefore the only way to build a cycle),
//! - a [`Foreign`] host value, which only an encoder configured with a fallback
//!   can write.
//!
//! If the `serde` feature is enabled, `Value` also implements `Serialize` and
//! `Deserialize`.

use std::{
    any::{self, Any},
    fmt::{self, Debug, Formatter},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// A dictionary. Keeps its entries in insertion order; the encoder sorts them.
pub type Dict = IndexMap<Key, Value>;

/// A dictionary key
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub enum Key {
    /// A raw byte string key
    Bytes(Vec<u8>),
    /// A key that was decoded as, or given as, text
    Text(String),
}

impl Key {
    /// The bytes this key is written as
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Key::Bytes(bytes) => bytes,
            Key::Text(text) => text.as_bytes(),
        }
    }

    /// The key as text, if it is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Text(text) => Some(text),
            Key::Bytes(_) => None,
        }
    }

    /// Short name of the key's type: `"bytes"` or `"str"`
    pub fn kind(&self) -> &'static str {
        match self {
            Key::Bytes(_) => "bytes",
            Key::Text(_) => "str",
        }
    }
}

impl From<&str> for Key {
    fn from(text: &str) -> Self {
        Key::Text(text.to_owned())
    }
}

impl From<String> for Key {
    fn from(text: String) -> Self {
        Key::Text(text)
    }
}

impl From<&[u8]> for Key {
    fn from(bytes: &[u8]) -> Self {
        Key::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Key {
    fn from(bytes: &[u8; N]) -> Self {
        Key::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Key {
    fn from(bytes: Vec<u8>) -> Self {
        Key::Bytes(bytes)
    }
}

/// A handle to a value that may be referenced from several places.
///
/// Cloning the handle does not clone the value. Two handles are the same container
/// if they were cloned from one another.
#[derive(Clone)]
pub struct Shared(Arc<RwLock<Value>>);

impl Shared {
    /// Wrap a value so it can be referenced from several places
    pub fn new(value: impl Into<Value>) -> Self {
        Shared(Arc::new(RwLock::new(value.into())))
    }

    /// Immutably borrow the referenced value.
    ///
    /// A writer that panicked can't leave a `Value` half-updated, so a poisoned lock is
    /// read anyway.
    pub fn borrow(&self) -> RwLockReadGuard<'_, Value> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutably borrow the referenced value. Blocks while other borrows are alive.
    pub fn borrow_mut(&self) -> RwLockWriteGuard<'_, Value> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether both handles refer to the same container
    pub fn ptr_eq(&self, other: &Shared) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Stable identity of the container, valid while any handle is alive
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for Shared {
    // Comparing a cyclic structure with itself through different handles does not
    // terminate
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.borrow() == *other.borrow()
    }
}

impl Debug for Shared {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Shared({:#x})", self.identity())
    }
}

/// A host value outside of the bencode data model.
///
/// The encoder hands these to its fallback; without one, encoding them fails with a
/// type error naming [`Foreign::type_name`].
#[derive(Clone)]
pub struct Foreign {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Foreign {
    /// Wrap an arbitrary value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Foreign {
            type_name: any::type_name::<T>(),
            inner: Arc::new(value),
        }
    }

    /// Name of the wrapped type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Access the wrapped value if it is a `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }
}

impl PartialEq for Foreign {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Debug for Foreign {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Foreign({})", self.type_name)
    }
}

/// A decoded bencode value, or a value to be encoded
#[derive(PartialEq, Clone, Debug)]
pub enum Value {
    /// An arbitrary-precision signed integer
    Integer(BigInt),
    /// A raw byte string; may not be UTF-8
    Bytes(Vec<u8>),
    /// Text; encoded as a byte string
    Text(String),
    /// A list of values
    List(Vec<Value>),
    /// A dictionary mapping byte strings to values
    Dict(Dict),
    /// A value that may be referenced from several places
    Shared(Shared),
    /// A host value the format can't represent
    Foreign(Foreign),
}

impl Value {
    /// Wrap a value in a [`Shared`] handle
    pub fn shared(value: impl Into<Value>) -> Self {
        Value::Shared(Shared::new(value))
    }

    /// Wrap a host value in a [`Foreign`]
    pub fn foreign<T: Any + Send + Sync>(value: T) -> Self {
        Value::Foreign(Foreign::new(value))
    }

    /// Short name of the value's type. For a [`Foreign`] value this is the wrapped type's name.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "int",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "str",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Shared(_) => "shared",
            Value::Foreign(foreign) => foreign.type_name(),
        }
    }

    /// The integer, if it is one
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(integer) => Some(integer),
            _ => None,
        }
    }

    /// The integer, if it is one and fits into an `i64`
    pub fn as_i64(&self) -> Option<i64> {
        self.as_integer().and_then(ToPrimitive::to_i64)
    }

    /// The byte string, if it is one. Text is not returned here.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Text, or a byte string that happens to be valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Bytes(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    /// The list elements, if it is a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// The dictionary, if it is one
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Unwrap a list
    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Unwrap a dictionary
    pub fn into_dict(self) -> Option<Dict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Look up a dictionary entry by the bytes of its key, whether the key is text or not
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Value> {
        let key = key.as_ref();
        self.as_dict()?
            .iter()
            .find(|(candidate, _)| candidate.as_bytes() == key)
            .map(|(_, value)| value)
    }
}

macro_rules! impl_from_integer {
    ($($type:ty)*) => {$(
        impl From<$type> for Value {
            fn from(value: $type) -> Self {
                Value::Integer(BigInt::from(value))
            }
        }
    )*}
}

impl_from_integer!(u8 u16 u32 u64 u128 usize i8 i16 i32 i64 i128 isize);

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(bytes: &[u8; N]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Value::List(list)
    }
}

impl From<Dict> for Value {
    fn from(dict: Dict) -> Self {
        Value::Dict(dict)
    }
}

impl From<Shared> for Value {
    fn from(shared: Shared) -> Self {
        Value::Shared(shared)
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use std::{
        cell::RefCell,
        fmt::{self, Formatter},
    };

    use num_bigint::BigInt;
    use num_traits::ToPrimitive;
    use serde_ as serde;

    use serde::{
        Deserialize, Serialize,
        de::{MapAccess, SeqAccess},
        ser::{Error as _, SerializeMap, SerializeSeq},
    };

    use super::{Dict, Key, Value};
    use crate::encoding::CycleGuard;

    impl Serialize for Key {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::ser::Serializer,
        {
            match self {
                Key::Bytes(bytes) => serializer.serialize_bytes(bytes),
                Key::Text(text) => serializer.serialize_str(text),
            }
        }
    }

    impl Serialize for Value {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::ser::Serializer,
        {
            let path = RefCell::new(CycleGuard::default());
            Tracked { value: self, path: &path }.serialize(serializer)
        }
    }

    /// A value together with the shared handles entered on the way down to it
    struct Tracked<'a> {
        value: &'a Value,
        path: &'a RefCell<CycleGuard>,
    }

    impl Tracked<'_> {
        fn child<'a>(&'a self, value: &'a Value) -> Tracked<'a> {
            Tracked {
                value,
                path: self.path,
            }
        }
    }

    impl Serialize for Tracked<'_> {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::ser::Serializer,
        {
            match self.value {
                Value::Integer(int) => {
                    if let Some(int) = int.to_i64() {
                        serializer.serialize_i64(int)
                    } else if let Some(int) = int.to_u64() {
                        serializer.serialize_u64(int)
                    } else {
                        Err(S::Error::custom(format_args!(
                            "integer {int} does not fit into 64 bits"
                        )))
                    }
                },
                Value::Bytes(bytes) => serializer.serialize_bytes(bytes),
                Value::Text(text) => serializer.serialize_str(text),
                Value::List(list) => {
                    let mut seq = serializer.serialize_seq(Some(list.len()))?;
                    for value in list {
                        seq.serialize_element(&self.child(value))?;
                    }
                    seq.end()
                },
                Value::Dict(dict) => {
                    let mut map = serializer.serialize_map(Some(dict.len()))?;
                    for (k, v) in dict {
                        map.serialize_entry(k, &self.child(v))?;
                    }
                    map.end()
                },
                Value::Shared(shared) => {
                    let identity = shared.identity();
                    self.path
                        .borrow_mut()
                        .enter(identity)
                        .map_err(S::Error::custom)?;
                    let result = self.child(&shared.borrow()).serialize(serializer);
                    self.path.borrow_mut().exit(identity);
                    result
                },
                Value::Foreign(foreign) => Err(S::Error::custom(format_args!(
                    "object of type {} is not serializable",
                    foreign.type_name()
                ))),
            }
        }
    }

    impl<'de> Deserialize<'de> for Key {
        fn deserialize<D>(deserializer: D) -> Result<Key, D::Error>
        where
            D: serde::de::Deserializer<'de>,
        {
            deserializer.deserialize_any(KeyVisitor)
        }
    }

    struct KeyVisitor;

    impl<'de> serde::de::Visitor<'de> for KeyVisitor {
        type Value = Key;

        fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
            formatter.write_str("a string or a byte string")
        }

        fn visit_str<E>(self, value: &str) -> Result<Key, E> {
            Ok(Key::Text(value.to_owned()))
        }

        fn visit_string<E>(self, value: String) -> Result<Key, E> {
            Ok(Key::Text(value))
        }

        fn visit_bytes<E>(self, value: &[u8]) -> Result<Key, E> {
            Ok(Key::Bytes(value.to_vec()))
        }

        fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Key, E> {
            Ok(Key::Bytes(value))
        }
    }

    impl<'de> Deserialize<'de> for Value {
        #[inline]
        fn deserialize<D>(deserializer: D) -> Result<Value, D::Error>
        where
            D: serde::de::Deserializer<'de>,
        {
            deserializer.deserialize_any(Visitor)
        }
    }

    struct Visitor;

    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = Value;

        fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
            formatter.write_str("any valid bencode value")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Value, E> {
            Ok(Value::Integer(BigInt::from(value)))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Value, E> {
            Ok(Value::Integer(BigInt::from(value)))
        }

        fn visit_i128<E>(self, value: i128) -> Result<Value, E> {
            Ok(Value::Integer(BigInt::from(value)))
        }

        fn visit_u128<E>(self, value: u128) -> Result<Value, E> {
            Ok(Value::Integer(BigInt::from(value)))
        }

        fn visit_str<E>(self, value: &str) -> Result<Value, E> {
            Ok(Value::Text(value.to_owned()))
        }

        fn visit_string<E>(self, value: String) -> Result<Value, E> {
            Ok(Value::Text(value))
        }

        fn visit_bytes<E>(self, value: &[u8]) -> Result<Value, E> {
            Ok(Value::Bytes(value.to_vec()))
        }

        fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Value, E> {
            Ok(Value::Bytes(value))
        }

        fn visit_seq<V>(self, mut access: V) -> Result<Value, V::Error>
        where
            V: SeqAccess<'de>,
        {
            let mut list = Vec::new();
            while let Some(e) = access.next_element()? {
                list.push(e);
            }
            Ok(Value::List(list))
        }

        fn visit_map<V>(self, mut access: V) -> Result<Value, V::Error>
        where
            V: MapAccess<'de>,
        {
            let mut dict = Dict::new();
            while let Some((k, v)) = access.next_entry::<Key, Value>()? {
                dict.insert(k, v);
            }
            Ok(Value::Dict(dict))
        }
    }
}
