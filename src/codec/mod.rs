//! In-memory serialization codecs
//!
//! Two strategies are measured against each other:
//! - [`GenericCodec`]: self-describing, type-erased value graph (baseline)
//! - [`CompactCodec`]: registered types only, one-byte tag + fixed layout

mod compact;
mod generic;

pub use compact::{CompactCodec, CompactCodecBuilder};
pub use generic::GenericCodec;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Encode to and decode from an in-memory byte buffer
pub trait Codec {
    fn name(&self) -> &'static str;

    fn encode<T: Serialize + 'static>(&self, value: &T) -> Result<Vec<u8>>;

    fn decode<T: DeserializeOwned + 'static>(&self, bytes: &[u8]) -> Result<T>;

    /// Encode, decode the same buffer, and compare with the input.
    ///
    /// A mismatch is reported as `Ok(false)`, not as an error.
    fn round_trip<T>(&self, value: &T) -> Result<bool>
    where
        T: Serialize + DeserializeOwned + PartialEq + 'static,
    {
        let bytes = self.encode(value)?;
        let decoded: T = self.decode(&bytes)?;
        Ok(decoded == *value)
    }
}
