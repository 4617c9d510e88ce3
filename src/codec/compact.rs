//! Compact codec with explicit type registration
//!
//! Payload layout: `[tag: u8][bincode body]`. The tag is the registration
//! index of the concrete type, so no type descriptor is written. The registry
//! is frozen once built and can be shared freely between threads.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{type_name, TypeId};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::Codec;
use crate::error::{BenchError, Result};

const MAX_TYPES: usize = u8::MAX as usize + 1;

static SHARED: OnceLock<Arc<CompactCodec>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Registration {
    type_id: TypeId,
    type_name: &'static str,
}

/// Collects type registrations before the codec is frozen
#[derive(Debug, Default)]
pub struct CompactCodecBuilder {
    registry: Vec<Registration>,
}

impl CompactCodecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`; registering the same type again is a no-op
    pub fn register<T: 'static>(mut self) -> Result<Self> {
        let type_id = TypeId::of::<T>();
        if self.registry.iter().any(|r| r.type_id == type_id) {
            debug!("Type {} already registered", type_name::<T>());
            return Ok(self);
        }
        if self.registry.len() == MAX_TYPES {
            return Err(BenchError::RegistryFull { capacity: MAX_TYPES });
        }
        self.registry.push(Registration {
            type_id,
            type_name: type_name::<T>(),
        });
        Ok(self)
    }

    pub fn build(self) -> CompactCodec {
        CompactCodec {
            registry: self.registry,
        }
    }
}

/// Immutable codec configuration
#[derive(Debug, Clone)]
pub struct CompactCodec {
    registry: Vec<Registration>,
}

impl CompactCodec {
    pub fn builder() -> CompactCodecBuilder {
        CompactCodecBuilder::new()
    }

    /// Codec with the binary and textual identifier types registered
    pub fn for_identifiers() -> Result<Self> {
        Ok(Self::builder()
            .register::<Uuid>()?
            .register::<String>()?
            .build())
    }

    /// Process-wide identifier codec, initialised on first use.
    ///
    /// Concurrent first callers all observe the same instance.
    pub fn shared() -> Result<Arc<CompactCodec>> {
        if let Some(codec) = SHARED.get() {
            return Ok(Arc::clone(codec));
        }
        let codec = Self::for_identifiers()?;
        let codec = SHARED.get_or_init(|| {
            info!("Compact codec initialised ({} types)", codec.len());
            Arc::new(codec)
        });
        Ok(Arc::clone(codec))
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.tag_of::<T>().is_ok()
    }

    #[inline]
    fn tag_of<T: 'static>(&self) -> Result<u8> {
        let type_id = TypeId::of::<T>();
        self.registry
            .iter()
            .position(|r| r.type_id == type_id)
            .map(|idx| idx as u8)
            .ok_or(BenchError::UnregisteredType {
                type_name: type_name::<T>(),
            })
    }
}

impl Codec for CompactCodec {
    fn name(&self) -> &'static str {
        "compact"
    }

    fn encode<T: Serialize + 'static>(&self, value: &T) -> Result<Vec<u8>> {
        let tag = self.tag_of::<T>()?;
        let mut buf = Vec::with_capacity(32);
        buf.push(tag);
        bincode::serialize_into(&mut buf, value).map_err(BenchError::encode::<T>)?;
        Ok(buf)
    }

    fn decode<T: DeserializeOwned + 'static>(&self, bytes: &[u8]) -> Result<T> {
        let expected = self.tag_of::<T>()?;
        let (&tag, body) = bytes
            .split_first()
            .ok_or_else(|| BenchError::decode::<T>("empty payload"))?;

        if tag != expected {
            let found = self
                .registry
                .get(tag as usize)
                .map(|r| r.type_name.to_string())
                .unwrap_or_else(|| format!("<unknown tag {tag}>"));
            return Err(BenchError::TypeMismatch {
                expected: type_name::<T>().to_string(),
                found,
            });
        }

        bincode::deserialize(body).map_err(BenchError::decode::<T>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identifier_types_registered() {
        let codec = CompactCodec::for_identifiers().unwrap();
        assert_eq!(codec.len(), 2);
        assert!(codec.is_registered::<Uuid>());
        assert!(codec.is_registered::<String>());
        assert!(!codec.is_registered::<u64>());
    }

    #[test]
    fn test_duplicate_registration_is_noop() {
        let codec = CompactCodec::builder()
            .register::<Uuid>()
            .unwrap()
            .register::<Uuid>()
            .unwrap()
            .register::<String>()
            .unwrap()
            .register::<Uuid>()
            .unwrap()
            .build();
        assert_eq!(codec.len(), 2);
        assert!(codec.round_trip(&Uuid::from_u128(u128::MAX)).unwrap());
    }

    #[test]
    fn test_unregistered_type_rejected() {
        let codec = CompactCodec::for_identifiers().unwrap();
        let err = codec.encode(&42u64).unwrap_err();
        assert!(matches!(err, BenchError::UnregisteredType { .. }));

        let err = codec.decode::<u64>(&[0, 1, 2]).unwrap_err();
        assert!(matches!(err, BenchError::UnregisteredType { .. }));
    }

    #[test]
    fn test_registry_capacity() {
        let mut builder = CompactCodec::builder();
        builder.registry = (0..MAX_TYPES)
            .map(|_| Registration {
                type_id: TypeId::of::<()>(),
                type_name: "filler",
            })
            .collect();
        let err = builder.register::<Uuid>().unwrap_err();
        assert!(matches!(err, BenchError::RegistryFull { capacity: 256 }));
        assert!(err.is_setup_failure());
    }

    #[test]
    fn test_payload_is_tagged() {
        let codec = CompactCodec::for_identifiers().unwrap();
        let id_bytes = codec.encode(&Uuid::nil()).unwrap();
        let text_bytes = codec.encode(&String::new()).unwrap();
        assert_eq!(id_bytes[0], 0);
        assert_eq!(text_bytes[0], 1);
        // No type descriptor beyond the tag byte
        assert!(id_bytes.len() < 32);
    }

    #[test]
    fn test_tag_mismatch() {
        let codec = CompactCodec::for_identifiers().unwrap();
        let bytes = codec.encode(&Uuid::nil()).unwrap();
        let err = codec.decode::<String>(&bytes).unwrap_err();
        match err {
            BenchError::TypeMismatch { found, .. } => assert_eq!(found, type_name::<Uuid>()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_and_truncated_payloads() {
        let codec = CompactCodec::for_identifiers().unwrap();
        assert!(matches!(
            codec.decode::<Uuid>(&[]).unwrap_err(),
            BenchError::Decode { .. }
        ));

        let bytes = codec.encode(&Uuid::from_u128(u128::MAX)).unwrap();
        assert!(matches!(
            codec.decode::<Uuid>(&bytes[..bytes.len() - 4]).unwrap_err(),
            BenchError::Decode { .. }
        ));
    }

    #[test]
    fn test_shared_is_single_instance() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| CompactCodec::shared().unwrap()))
            .collect();
        let codecs: Vec<Arc<CompactCodec>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(codecs.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(CompactCodec::shared().unwrap().len(), 2);
    }

    proptest! {
        #[test]
        fn prop_uuid_round_trip(bits in any::<u128>()) {
            let codec = CompactCodec::for_identifiers().unwrap();
            prop_assert!(codec.round_trip(&Uuid::from_u128(bits)).unwrap());
        }

        #[test]
        fn prop_string_round_trip(text in ".*") {
            let codec = CompactCodec::for_identifiers().unwrap();
            prop_assert!(codec.round_trip(&text).unwrap());
        }
    }
}
