//! Pairs of values and their canonical encodings, plus inputs that must be rejected.
//!
//! Decoded byte strings stay bytes, so the expected trees are built with byte string
//! leaves while dictionary keys (decoded as text by default) stay text.

use num_bigint::BigInt;
use torrent_bencode::{Dict, Key, Value, decoding, encoding};

// -----------------------------------------------------------------------------
// Macros
// -----------------------------------------------------------------------------

macro_rules! list(
    {} => { Value::List(Vec::new()) };
    { $($value:expr),+ } => {
        {
            let mut list = Vec::new();
            $( list.push(decoded($value)); )+

            Value::List(list)
        }
     };
);

macro_rules! map(
    {} => { Value::Dict(Dict::new()) };
    { $($key:expr => $value:expr),+ } => {
        {
            let mut map = Dict::new();
            $( map.insert(Key::from($key), decoded($value)); )+

            Value::Dict(map)
        }
     };
);

#[derive(Debug)]
enum Error {
    Decoding(decoding::Error),
    Encoding(encoding::Error),
}

impl From<decoding::Error> for Error {
    fn from(err: decoding::Error) -> Self {
        Error::Decoding(err)
    }
}

impl From<encoding::Error> for Error {
    fn from(err: encoding::Error) -> Self {
        Error::Encoding(err)
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[test]
fn string_test_pairs() -> Result<(), Error> {
    let pairs = [
        ("", "0:"),
        ("hello", "5:hello"),
        ("goodbye", "7:goodbye"),
        ("hello world", "11:hello world"),
        ("1-5%3~]+=\\| []>.,`??", "20:1-5%3~]+=\\| []>.,`??"),
        ("\u{30d3}\u{30c3}\u{30c8}", "9:\u{30d3}\u{30c3}\u{30c8}"),
    ];

    for (original, expected_encoding) in &pairs {
        let encoded = torrent_bencode::dumps(&Value::from(*original))?;
        assert_eq!(expected_encoding.as_bytes(), encoded.as_slice());

        let decoded = torrent_bencode::loads(&encoded)?;
        assert_eq!(decoded, Value::from(original.as_bytes()));
        assert_eq!(decoded.as_str(), Some(*original));
    }

    Ok(())
}

#[test]
fn integer_test_pairs() -> Result<(), Error> {
    let pairs = [
        (0, "i0e"),
        (5, "i5e"),
        (-5, "i-5e"),
        (1234567890, "i1234567890e"),
        (-1234567890, "i-1234567890e"),
        (i64::MAX, "i9223372036854775807e"),
        (i64::MIN, "i-9223372036854775808e"),
    ];

    for (original, expected_encoding) in &pairs {
        let encoded = torrent_bencode::dumps(&Value::from(*original))?;
        assert_eq!(expected_encoding.as_bytes(), encoded.as_slice());

        let decoded = torrent_bencode::loads(&encoded)?;
        assert_eq!(decoded.as_i64(), Some(*original));
    }

    Ok(())
}

#[test]
fn big_integer_test_pairs() -> Result<(), Error> {
    let pairs = [
        "123456789012345678901234567890123456789012345678901234567890",
        "-123456789012345678901234567890123456789012345678901234567890",
        "18446744073709551616",
    ];

    for digits in &pairs {
        let original: BigInt = digits.parse().unwrap();
        let expected_encoding = format!("i{}e", digits);

        let encoded = torrent_bencode::dumps(&Value::Integer(original.clone()))?;
        assert_eq!(expected_encoding.as_bytes(), encoded.as_slice());

        let decoded = torrent_bencode::loads(&encoded)?;
        assert_eq!(decoded.as_integer(), Some(&original));
        assert_eq!(decoded.as_i64(), None);
    }

    Ok(())
}

#[test]
fn lenient_integers_are_read() -> Result<(), Error> {
    let pairs = [("i005e", 5), ("i-005e", -5), ("i-0e", 0), ("i00e", 0)];

    for (encoding, expected) in &pairs {
        let decoded = torrent_bencode::loads(encoding)?;
        assert_eq!(decoded.as_i64(), Some(*expected));

        // re-encoding drops what made the input non-canonical
        let canonical = format!("i{}e", expected);
        assert_eq!(torrent_bencode::dumps(&decoded)?, canonical.as_bytes());
    }

    Ok(())
}

#[test]
fn list_test_pairs() -> Result<(), Error> {
    let pairs = [
        (list![], "le"),
        (list!["abra", "cadabra"], "l4:abra7:cadabrae"),
        (list!["spam", "eggs"], "l4:spam4:eggse"),
        (
            list![list!["list", "of", "lists"], list!["like", "omygawd!"]],
            "ll4:list2:of5:listsel4:like8:omygawd!ee",
        ),
    ];

    for (original, expected_encoding) in &pairs {
        let encoded = torrent_bencode::dumps(original)?;
        assert_eq!(expected_encoding.as_bytes(), encoded.as_slice());

        let decoded = torrent_bencode::loads(&encoded)?;
        assert_eq!(original, &decoded);
    }

    Ok(())
}

#[test]
fn map_test_pairs() -> Result<(), Error> {
    let pairs = [
        (map! {}, "de"),
        (
            map! {"cow" => "moo", "spam" => "eggs"},
            "d3:cow3:moo4:spam4:eggse",
        ),
        (
            map! {"cow" => "moo", "dog" => "bark"},
            "d3:cow3:moo3:dog4:barke",
        ),
        (
            map! {"first" => "first", "2ace" => "second", "3ace" => "third"},
            "d4:2ace6:second4:3ace5:third5:first5:firste",
        ),
        (
            map! {"Goodbye" => map! {"maps" => "that don't work", "number" => 100}},
            "d7:Goodbyed4:maps15:that don't work6:numberi100eee",
        ),
        (
            map! {
            "publisher" => "bob", "publisher-webpage" => "www.example.com",
            "publisher.location" => "home"
            },
            "d9:publisher3:bob17:publisher-webpage15:www.example.com18:publisher.location4:homee",
        ),
    ];

    for (original, expected_encoding) in &pairs {
        let encoded = torrent_bencode::dumps(original)?;
        assert_eq!(expected_encoding.as_bytes(), encoded.as_slice());

        let decoded = torrent_bencode::loads(&encoded)?;
        assert_eq!(original, &decoded);
    }

    Ok(())
}

#[test]
fn unsorted_maps_are_written_sorted() -> Result<(), Error> {
    let pairs = [
        (
            map! {"dog" => "bark", "cow" => "moo"},
            "d3:cow3:moo3:dog4:barke",
        ),
        (
            map! {"c" => 2, "a" => 1, "b" => "2"},
            "d1:ai1e1:b1:21:ci2ee",
        ),
    ];

    for (original, expected_encoding) in &pairs {
        let encoded = torrent_bencode::dumps(original)?;
        assert_eq!(expected_encoding.as_bytes(), encoded.as_slice());
    }

    Ok(())
}

#[test]
fn mixed_use_list_pairs() -> Result<(), Error> {
    let pairs = [
        (
            list![0, "heterogeneous", -5, "lists", 10, map! {"map" => "well"}],
            "li0e13:heterogeneousi-5e5:listsi10ed3:map4:wellee",
        ),
        (list![1, 2, 3, "4"], "li1ei2ei3e1:4e"),
    ];

    for (original, expected_encoding) in &pairs {
        let encoded = torrent_bencode::dumps(original)?;
        assert_eq!(expected_encoding.as_bytes(), encoded.as_slice());

        let decoded = torrent_bencode::loads(&encoded)?;
        assert_eq!(original, &decoded);
    }

    Ok(())
}

#[test]
fn mixed_use_dict_pairs() -> Result<(), Error> {
    let pairs = [
        (
            map! {
                "hello" => list!["world!", "gaia!", "mother earth!"],
                "Goodbye" => map! {"maps" => "that don't work", "number" => 100}
            },
            "d7:Goodbyed4:maps15:that don't work6:numberi100ee5:hellol6:world!5:gaia!13:mother earth!ee"
        ),
        (map! {"spam" => list!["a", "b"]}, "d4:spaml1:a1:bee"),
        (
            map! {
                "t" => "aa", "y" => "q", "q" => "ping",
                "a" => map! { "id" => "abcdefghij0123456789" }
            },
            "d1:ad2:id20:abcdefghij0123456789e1:q4:ping1:t2:aa1:y1:qe",
        ),
        (
            map! {
                "t" => "aa", "y" => "q", "q" => "get_peers",
                "a" => map! { "id" => "abcdefghij0123456789", "info_hash" => "mnopqrstuvwxyz123456" }
            },
            "d1:ad2:id20:abcdefghij01234567899:info_hash20:mnopqrstuvwxyz123456e1:q9:get_peers1:t2:aa1:y1:qe"
        ),
        (
            map! {
                "t" => "aa", "y" => "r",
                "r" => map! {
                    "id" => "abcdefghij0123456789",
                    "token" => "aoeusnth", "values" => list!["axje.u", "idhtnm"]
                }
            },
            "d1:rd2:id20:abcdefghij01234567895:token8:aoeusnth6:valuesl6:axje.u6:idhtnmee1:t2:aa1:y1:re"
        ),
    ];

    for (original, expected_encoding) in &pairs {
        let encoded = torrent_bencode::dumps(original)?;
        assert_eq!(expected_encoding.as_bytes(), encoded.as_slice());

        let decoded = torrent_bencode::loads(&encoded)?;
        assert_eq!(original, &decoded);
    }

    Ok(())
}

#[test]
fn decoding_canonicalizes() -> Result<(), Error> {
    let pairs = [
        ("d1:bi1e1:ai2ee", "d1:ai2e1:bi1ee"),
        ("d1:ai1e1:ai2ee", "d1:ai2ee"),
        ("d1:ai1e1:bi2e1:ai3ee", "d1:ai3e1:bi2ee"),
        ("i-0e", "i0e"),
    ];

    for (input, canonical) in &pairs {
        let decoded = torrent_bencode::loads(input)?;
        assert_eq!(torrent_bencode::dumps(&decoded)?, canonical.as_bytes());
    }

    // Duplicates keep the position of their first occurrence
    let decoded = torrent_bencode::loads("d1:bi1e1:ai2e1:bi3ee")?;
    let keys: Vec<_> = decoded
        .as_dict()
        .unwrap()
        .keys()
        .map(|key| key.as_bytes().to_vec())
        .collect();
    assert_eq!(keys, vec![b"b".to_vec(), b"a".to_vec()]);
    assert_eq!(decoded.get("b"), Some(&Value::from(3)));

    Ok(())
}

#[test]
fn torrent_round_trip() -> Result<(), Error> {
    let pieces: Vec<u8> = (0u8..20).chain(236..=255).collect();

    let mut torrent = Vec::new();
    torrent.extend_from_slice(b"d8:announce39:udp://tracker.example.org:6969/announce");
    torrent.extend_from_slice(b"7:comment12:test torrent");
    torrent.extend_from_slice(b"13:creation datei1573996800e");
    torrent.extend_from_slice(b"4:infod6:lengthi1048576e4:name8:spam.iso");
    torrent.extend_from_slice(b"12:piece lengthi262144e6:pieces40:");
    torrent.extend_from_slice(&pieces);
    torrent.extend_from_slice(b"ee");

    let decoded = torrent_bencode::loads(&torrent)?;
    let info = decoded.get("info").unwrap();
    assert_eq!(info.get("name").and_then(Value::as_str), Some("spam.iso"));
    assert_eq!(info.get("length").and_then(Value::as_i64), Some(1048576));
    assert_eq!(info.get("pieces").and_then(Value::as_bytes), Some(&pieces[..]));

    assert_eq!(torrent_bencode::dumps(&decoded)?, torrent);

    Ok(())
}

#[test]
fn byte_keys_round_trip() -> Result<(), Error> {
    let input = b"d2:\xff\xfei1e1:ai2ee";

    let text_keys = torrent_bencode::loads(input).unwrap_err();
    assert!(matches!(
        text_keys.root_kind(),
        decoding::ErrorKind::InvalidDictKey
    ));

    let decoder = torrent_bencode::Decoder::new().with_dict_keys_as_text(false);
    let decoded = decoder.decode_bytes(input)?;
    assert_eq!(decoded.get(b"\xff\xfe"), Some(&Value::from(1)));
    assert_eq!(torrent_bencode::dumps(&decoded)?, b"d1:ai2e2:\xff\xfei1ee");

    Ok(())
}

#[test]
fn simple_illegal_encodings() {
    let values = ["i123", "123e", "li1e", "di1e", "a:0123456789"];

    for value in &values {
        assert!(
            torrent_bencode::loads(value).is_err(),
            "{:?} decoded successfully",
            value
        );
    }
}

#[test]
fn illegal_integer_encodings() {
    let values = [
        "i12-345", "i-12-345", "i-1", "i1", "ie", "i-e", "i--1e", "i+1e", "i1.5e", "i 1e",
    ];

    for value in &values {
        let error = torrent_bencode::loads(value).unwrap_err();
        assert!(
            matches!(
                error.kind(),
                decoding::ErrorKind::InvalidInt | decoding::ErrorKind::UnexpectedEof
            ),
            "{:?}: {}",
            value,
            error
        );
    }
}

#[test]
fn illegal_string_encodings() {
    let values = [":hello", "-5:hello", "-5:", "5:", "10:hello", "5hello", "0x5:hello"];

    for value in &values {
        assert!(
            torrent_bencode::loads(value).is_err(),
            "{:?} decoded successfully",
            value
        );
    }
}

#[test]
fn illegal_list_encodings() {
    let values = [
        "l",
        "lsde",
        "li10e5hello",
        "l10:helloi123456789ee",
        "l10:helloi123456789e5:helloe",
        "l5:helloi123456789e10:helloe",
    ];

    for value in &values {
        assert!(
            torrent_bencode::loads(value).is_err(),
            "{:?} decoded successfully",
            value
        );
    }
}

#[test]
fn illegal_dictionary_encodings() {
    let values = [
        "d",
        "duuuuure",
        "d5:hello5:world",
        "d10:helloi123456789ee",
        "d5:helloi123456789e5:helloe",
        "di10e5:hello5:worldi10ee",
        "d5:worldi10ei10e5:helloe",
        "dle5:hello5:worldi10ee",
        "dli10ei11ee5:hello5:worldi10ee",
        "dde5:hello5:worldi10ee",
        "dd8:innermapi11ee5:hello5:worldi10ee",
    ];

    for value in &values {
        assert!(
            torrent_bencode::loads(value).is_err(),
            "{:?} decoded successfully",
            value
        );
    }
}

#[test]
fn trailing_data_is_left_unread() -> Result<(), Error> {
    let values = [
        ("i12345ei10e5:eoeoee", Value::from(12345)),
        ("5:hello5:hello", Value::from("hello".as_bytes())),
        ("l5:hello5:worldei10e", list!["hello", "world"]),
    ];

    for (input, expected) in &values {
        assert_eq!(&torrent_bencode::loads(input)?, expected);
    }

    Ok(())
}

// -----------------------------------------------------------------------------
// Dynamic Typing Utility
// -----------------------------------------------------------------------------

/// Turns test literals into what the decoder produces for them
trait Decoded {
    fn decoded(self) -> Value;
}

impl Decoded for &str {
    fn decoded(self) -> Value {
        Value::from(self.as_bytes())
    }
}

impl Decoded for i32 {
    fn decoded(self) -> Value {
        Value::from(self)
    }
}

impl Decoded for Value {
    fn decoded(self) -> Value {
        self
    }
}

fn decoded<T: Decoded>(content: T) -> Value {
    content.decoded()
}
