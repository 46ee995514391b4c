//! Key and value codecs for the serialization layer.
//!
//! A [`Serializer`] reduces one side of an entry (key or value) to a byte
//! sequence and back. The [`Serializing`](crate::layer::serialize::Serializing)
//! layer uses one serializer per side, so keys and values can use
//! different encodings.
//!
//! Provided codecs:
//!
//! | Serializer          | Type        | Encoding                     |
//! |---------------------|-------------|------------------------------|
//! | [`StringSerializer`]| `String`    | identity UTF-8 bytes         |
//! | [`BytesSerializer`] | `Vec<u8>`   | identity                     |
//! | [`JsonSerializer`]  | any serde   | JSON via `serde_json`        |

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CacheError;

/// Encodes values of one type to bytes and back.
pub trait Serializer<T> {
    /// Encodes `value` to bytes.
    fn serialize(&self, value: &T) -> Result<Vec<u8>, CacheError>;

    /// Decodes a value from `bytes`.
    fn deserialize(&self, bytes: &[u8]) -> Result<T, CacheError>;
}

/// Identity codec for `String`: the UTF-8 bytes are the encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerializer;

impl Serializer<String> for StringSerializer {
    fn serialize(&self, value: &String) -> Result<Vec<u8>, CacheError> {
        Ok(value.as_bytes().to_vec())
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<String, CacheError> {
        String::from_utf8(bytes.to_vec())
            .map_err(|err| CacheError::Serialization(err.to_string()))
    }
}

/// Identity codec for raw byte values.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesSerializer;

impl Serializer<Vec<u8>> for BytesSerializer {
    fn serialize(&self, value: &Vec<u8>) -> Result<Vec<u8>, CacheError> {
        Ok(value.clone())
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Vec<u8>, CacheError> {
        Ok(bytes.to_vec())
    }
}

/// JSON codec for any serde-encodable type.
///
/// # Example
///
/// ```
/// use cachelayer::serializer::{JsonSerializer, Serializer};
///
/// let codec: JsonSerializer<Vec<u32>> = JsonSerializer::new();
/// let bytes = codec.serialize(&vec![1, 2, 3]).unwrap();
/// assert_eq!(codec.deserialize(&bytes).unwrap(), vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct JsonSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSerializer<T> {
    /// Creates the codec.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Serializer<T> for JsonSerializer<T>
where
    T: Serialize + DeserializeOwned,
{
    fn serialize(&self, value: &T) -> Result<Vec<u8>, CacheError> {
        serde_json::to_vec(value).map_err(|err| CacheError::Serialization(err.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<T, CacheError> {
        serde_json::from_slice(bytes).map_err(|err| CacheError::Serialization(err.to_string()))
    }
}
