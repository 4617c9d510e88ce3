//! Self-describing codec
//!
//! Walks any `Serialize` value into a type-erased `serde_json::Value` graph and
//! writes it inside an envelope carrying the full type name, so decoding needs
//! no registration. This is the slow, general baseline.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::type_name;
use std::borrow::Cow;

use super::Codec;
use crate::error::{BenchError, Result};

const STREAM_VERSION: u8 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope<'a> {
    version: u8,
    #[serde(rename = "type", borrow)]
    type_name: Cow<'a, str>,
    value: Value,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GenericCodec;

impl GenericCodec {
    pub fn new() -> Self {
        Self
    }

    /// Type descriptor stored in a payload, without decoding the value
    pub fn peek_type(&self, bytes: &[u8]) -> Result<String> {
        let envelope: Envelope = serde_json::from_slice(bytes).map_err(BenchError::decode::<Value>)?;
        Ok(envelope.type_name.into_owned())
    }
}

impl Codec for GenericCodec {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn encode<T: Serialize + 'static>(&self, value: &T) -> Result<Vec<u8>> {
        let graph = serde_json::to_value(value).map_err(BenchError::encode::<T>)?;
        let envelope = Envelope {
            version: STREAM_VERSION,
            type_name: Cow::Borrowed(type_name::<T>()),
            value: graph,
        };
        serde_json::to_vec(&envelope).map_err(BenchError::encode::<T>)
    }

    fn decode<T: DeserializeOwned + 'static>(&self, bytes: &[u8]) -> Result<T> {
        let envelope: Envelope = serde_json::from_slice(bytes).map_err(BenchError::decode::<T>)?;

        if envelope.version != STREAM_VERSION {
            return Err(BenchError::decode::<T>(format!(
                "unsupported stream version {}",
                envelope.version
            )));
        }

        let expected = type_name::<T>();
        if envelope.type_name != expected {
            return Err(BenchError::TypeMismatch {
                expected: expected.to_string(),
                found: envelope.type_name.into_owned(),
            });
        }

        T::deserialize(envelope.value).map_err(BenchError::decode::<T>)
    }
}
