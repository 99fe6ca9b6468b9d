//! Bencode encoding ([BEP-3]).
//!
//! Bencode is the serialization format of `.torrent` files. Only the encoding
//! direction lives here: the build engine assembles a [`Value`] tree and
//! streams it into the output sink.
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! # Examples
//!
//! ```
//! use torkit::bencode::{encode, Value};
//! use bytes::Bytes;
//! use std::collections::BTreeMap;
//!
//! let mut dict = BTreeMap::new();
//! dict.insert(Bytes::from_static(b"name"), Value::string("example.txt"));
//! dict.insert(Bytes::from_static(b"length"), Value::Integer(1024));
//!
//! let encoded = encode(&Value::Dict(dict)).unwrap();
//! assert_eq!(encoded, b"d6:lengthi1024e4:name11:example.txte");
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod encode;
mod error;
mod value;

pub use encode::{encode, encode_to};
pub use error::BencodeError;
pub use value::Value;
