// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Top-level message codec.
//!
//! A [`Codec`] owns the codec registry, the plan cache, the identifier
//! codec instance and the optional crypto key. `load` validates a schema
//! once and caches its plan; `encode`/`decode` drive the cached plan over
//! a single bit-buffer. The intended lifecycle is: register codecs and
//! load schemas during startup, then share the codec read-only across
//! threads (one in-flight message per codec at a time).

use crate::bits::BitBuffer;
use crate::config::{CodecConfig, HEADER_BITS, HEADER_BYTES};
use crate::crypto::CryptoKey;
use crate::error::{DcclError, Result};
use crate::field_codec::{CodecFactory, CodecRegistry, FieldCodec, IdentifierCodec};
use crate::header::Header;
use crate::message::Message;
use crate::plan::Plan;
use crate::schema::{Field, FieldDescriptor, MessageDescriptor, TypeKind};
use crate::value::FieldValue;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[cfg(feature = "logging")]
use crate::{debug, info};

/// A message type with a statically known schema.
///
/// Lets call sites load and reason about schemas by Rust type instead of
/// passing descriptors around.
pub trait DcclType {
    /// The schema descriptor for this type.
    fn descriptor() -> Arc<MessageDescriptor>;
}

/// The DCCL message codec.
///
/// # Example
///
/// ```
/// use dccl::schema::{Field, MessageBuilder};
/// use dccl::{Codec, Message};
///
/// let desc = MessageBuilder::new("Ping", 1)
///     .field(Field::uint32("seq").bounds(0, 255))
///     .build();
///
/// let codec = Codec::new();
/// codec.load(&desc)?;
///
/// let mut msg = Message::new(&desc);
/// msg.set("seq", 42u32).unwrap();
///
/// let bytes = codec.encode(&msg)?;
/// let decoded = codec.decode(&bytes)?;
/// assert_eq!(decoded.get::<u32>("seq").unwrap(), 42);
/// # Ok::<(), dccl::DcclError>(())
/// ```
pub struct Codec {
    config: CodecConfig,
    registry: RwLock<CodecRegistry>,
    plans: RwLock<HashMap<u32, Arc<Plan>>>,
    id_codec: Box<dyn FieldCodec>,
    /// Synthetic field description handed to the identifier codec.
    id_field: FieldDescriptor,
    crypto: Option<CryptoKey>,
}

impl Codec {
    /// Create a codec with the default configuration, registry and
    /// identifier codec.
    pub fn new() -> Self {
        Self {
            config: CodecConfig::default(),
            registry: RwLock::new(CodecRegistry::with_defaults()),
            plans: RwLock::new(HashMap::new()),
            id_codec: Box::<IdentifierCodec>::default(),
            id_field: Field::uint32("_id").build(),
            crypto: None,
        }
    }

    /// Create a codec from a configuration, with the default registry.
    pub fn with_config(config: CodecConfig) -> Result<Self> {
        Self::with_registry(config, CodecRegistry::with_defaults())
    }

    /// Create a codec from a configuration and an explicit registry.
    ///
    /// The identifier codec is resolved by `config.id_codec_name` against
    /// the registry, under the `uint32` type kind.
    pub fn with_registry(config: CodecConfig, registry: CodecRegistry) -> Result<Self> {
        let id_codec = registry.build(TypeKind::UInt32, &config.id_codec_name)?;
        let crypto = config
            .crypto_passphrase
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(CryptoKey::from_passphrase);
        Ok(Self {
            config,
            registry: RwLock::new(registry),
            plans: RwLock::new(HashMap::new()),
            id_codec,
            id_field: Field::uint32("_id").build(),
            crypto,
        })
    }

    /// Set or clear the body-encryption passphrase.
    ///
    /// An empty passphrase disables encryption. Callers must quiesce all
    /// in-flight encode/decode before changing the key.
    pub fn set_crypto_passphrase(&mut self, passphrase: &str) {
        self.crypto = if passphrase.is_empty() {
            None
        } else {
            Some(CryptoKey::from_passphrase(passphrase))
        };
    }

    /// Register an additional field codec.
    ///
    /// Registration is consulted only by later `load` calls; cached plans
    /// are unaffected.
    pub fn add_codec(
        &self,
        kind: TypeKind,
        name: impl Into<String>,
        factory: CodecFactory,
    ) -> Result<()> {
        self.registry.write().add(kind, name, factory)
    }

    // ====================================================================
    // Loading and schema information
    // ====================================================================

    /// Validate a schema and cache its plan.
    ///
    /// Idempotent for the same descriptor; a different descriptor under a
    /// cached id fails [`DcclError::DuplicateId`]. A schema that fails
    /// validation is not cached, and a later `load` retries it.
    pub fn load(&self, descriptor: &Arc<MessageDescriptor>) -> Result<()> {
        let id = descriptor.id;
        {
            let plans = self.plans.read();
            if let Some(existing) = plans.get(&id) {
                if existing.descriptor().name == descriptor.name {
                    return Ok(());
                }
                return Err(DcclError::DuplicateId(id));
            }
        }

        let cap = self.effective_cap(descriptor);
        let id_prefix_bytes = self.id_prefix_bytes(id)?;
        let plan = {
            let registry = self.registry.read();
            Plan::compile(descriptor, &registry, id_prefix_bytes, cap)?
        };

        #[cfg(feature = "logging")]
        info!(
            "loaded '{}' (id {}): body {}..{} bits",
            descriptor.name,
            id,
            plan.min_body_bits(),
            plan.max_body_bits()
        );

        let mut plans = self.plans.write();
        match plans.get(&id) {
            Some(existing) if existing.descriptor().name != descriptor.name => {
                Err(DcclError::DuplicateId(id))
            }
            _ => {
                plans.insert(id, Arc::new(plan));
                Ok(())
            }
        }
    }

    /// Load a schema by its Rust type.
    pub fn load_type<T: DcclType>(&self) -> Result<()> {
        self.load(&T::descriptor())
    }

    /// Wire id of a descriptor.
    pub fn id(&self, descriptor: &Arc<MessageDescriptor>) -> u32 {
        descriptor.id
    }

    /// True when a plan for `id` is cached.
    pub fn loaded(&self, id: u32) -> bool {
        self.plans.read().contains_key(&id)
    }

    /// The cached plan for `id`, if loaded (size bounds, `info` tables).
    pub fn plan(&self, id: u32) -> Option<Arc<Plan>> {
        self.plans.read().get(&id).cloned()
    }

    /// Write a human-readable summary of one schema into `out`.
    ///
    /// Works on unloaded descriptors too: the plan is compiled on the fly
    /// and discarded.
    pub fn info(&self, descriptor: &Arc<MessageDescriptor>, out: &mut String) -> Result<()> {
        let cached = self.plans.read().get(&descriptor.id).cloned();
        let plan = match cached {
            Some(plan) if plan.descriptor().name == descriptor.name => plan,
            _ => {
                let registry = self.registry.read();
                Arc::new(Plan::compile(
                    descriptor,
                    &registry,
                    self.id_prefix_bytes(descriptor.id)?,
                    self.effective_cap(descriptor),
                )?)
            }
        };
        // Writing into a String cannot fail.
        let _ = plan.write_info(out);
        Ok(())
    }

    /// Write a summary of every loaded schema into `out`.
    pub fn info_all(&self, out: &mut String) {
        let mut plans: Vec<Arc<Plan>> = self.plans.read().values().cloned().collect();
        plans.sort_by_key(|p| p.id());
        for plan in plans {
            let _ = plan.write_info(out);
        }
    }

    // ====================================================================
    // Encode / decode
    // ====================================================================

    /// Encode a message to its wire bytes.
    pub fn encode(&self, msg: &Message) -> Result<Vec<u8>> {
        let plan = self.plan_for(msg)?;
        let id = plan.id();
        let cap = self.effective_cap(plan.descriptor());

        let mut bits = BitBuffer::new(cap * 8);
        self.id_codec
            .encode(&self.id_field, Some(&FieldValue::UInt32(id)), &mut bits)?;
        let header = plan.header_from(msg)?;
        header.encode(id, &mut bits)?;
        plan.encode_body(msg, &mut bits)?;

        let mut bytes = bits.into_bytes();
        if bytes.len() > cap {
            return Err(DcclError::EncodeOversize {
                size: bytes.len(),
                cap,
            });
        }

        if let Some(key) = &self.crypto {
            let prefix = plan.id_prefix_bytes();
            let (head, body) = bytes.split_at_mut(prefix + HEADER_BYTES);
            key.apply_keystream(&head[prefix..], body)?;
        }

        #[cfg(feature = "logging")]
        debug!("encoded '{}' into {} bytes", plan.descriptor().name, bytes.len());
        Ok(bytes)
    }

    /// Decode wire bytes into a message.
    pub fn decode(&self, bytes: &[u8]) -> Result<Message> {
        let id = self.peek_id(bytes)?;
        let plan = self.cached_plan(id)?;

        if bytes.len() < plan.min_encoded_bytes() {
            return Err(DcclError::DecodeTruncated {
                field: plan.descriptor().name.clone(),
            });
        }

        let mut work = bytes.to_vec();
        if let Some(key) = &self.crypto {
            let prefix = plan.id_prefix_bytes();
            let (head, body) = work.split_at_mut(prefix + HEADER_BYTES);
            key.apply_keystream(&head[prefix..], body)?;
        }

        let mut bits = BitBuffer::from_bytes(&work);
        // Skip the prefix; its value was already recovered above.
        let _ = self.id_codec.decode(&self.id_field, &mut bits)?;
        let (_header_id, header) = Header::decode(&mut bits)?;

        let mut msg = Message::new(plan.descriptor());
        plan.decode_body(&mut msg, &mut bits)?;
        plan.apply_header(&mut msg, &header);

        #[cfg(feature = "logging")]
        debug!("decoded '{}' from {} bytes", plan.descriptor().name, bytes.len());
        Ok(msg)
    }

    /// Recover the message id without decoding (dispatch before decrypt).
    ///
    /// Succeeds on ciphertext: the identifier prefix is never encrypted.
    pub fn decode_id(&self, bytes: &[u8]) -> Result<u32> {
        self.peek_id(bytes)
    }

    /// Encoded size of a message in bytes, without encoding it.
    pub fn size(&self, msg: &Message) -> Result<usize> {
        let plan = self.plan_for(msg)?;
        let id_bits = self
            .id_codec
            .value_size(&self.id_field, Some(&FieldValue::UInt32(plan.id())))?;
        let body_bits = plan.body_bits_for(msg)?;
        Ok((id_bits as usize).div_ceil(8) + ((HEADER_BITS + body_bits) as usize).div_ceil(8))
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn cached_plan(&self, id: u32) -> Result<Arc<Plan>> {
        self.plan(id).ok_or(DcclError::UnknownId(id))
    }

    fn plan_for(&self, msg: &Message) -> Result<Arc<Plan>> {
        let id = msg.descriptor().id;
        let plan = self.cached_plan(id)?;
        if plan.descriptor().name != msg.descriptor().name {
            return Err(DcclError::UnknownId(id));
        }
        Ok(plan)
    }

    fn effective_cap(&self, descriptor: &Arc<MessageDescriptor>) -> usize {
        descriptor
            .max_bytes
            .map_or(self.config.max_message_size_bytes, |m| {
                m.min(self.config.max_message_size_bytes)
            })
    }

    fn id_prefix_bytes(&self, id: u32) -> Result<usize> {
        let bits = self
            .id_codec
            .value_size(&self.id_field, Some(&FieldValue::UInt32(id)))?;
        Ok((bits as usize).div_ceil(8))
    }

    /// Decode the id prefix without touching the rest of the input.
    fn peek_id(&self, bytes: &[u8]) -> Result<u32> {
        let mut bits = BitBuffer::from_bytes(bytes);
        let value = self.id_codec.decode(&self.id_field, &mut bits)?;
        value
            .as_ref()
            .and_then(FieldValue::as_u32)
            .ok_or_else(|| DcclError::DecodeOutOfRange {
                field: self.id_field.name.clone(),
                detail: "identifier codec produced no id".to_string(),
            })
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MessageBuilder;

    fn ping() -> Arc<MessageDescriptor> {
        MessageBuilder::new("Ping", 2)
            .field(Field::uint32("seq").bounds(0, 255))
            .build()
    }

    #[test]
    fn test_load_is_idempotent() {
        let codec = Codec::new();
        let desc = ping();
        codec.load(&desc).unwrap();
        codec.load(&desc).unwrap();
        assert!(codec.loaded(2));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let codec = Codec::new();
        codec.load(&ping()).unwrap();
        let other = MessageBuilder::new("Pong", 2)
            .field(Field::uint32("seq").bounds(0, 255))
            .build();
        assert!(matches!(codec.load(&other), Err(DcclError::DuplicateId(2))));
    }

    #[test]
    fn test_encode_requires_load() {
        let codec = Codec::new();
        let msg = Message::new(&ping());
        assert!(matches!(codec.encode(&msg), Err(DcclError::UnknownId(2))));
    }

    #[test]
    fn test_decode_unknown_id() {
        let codec = Codec::new();
        // Valid prefix byte for id 9, nothing loaded.
        assert!(matches!(
            codec.decode(&[0x09, 0x20, 0, 0, 0, 0, 0]),
            Err(DcclError::UnknownId(9))
        ));
    }

    #[test]
    fn test_invalid_schema_not_cached_and_retryable() {
        let codec = Codec::new();
        let bad = MessageBuilder::new("Bad", 3)
            .field(Field::uint32("x")) // bounds missing
            .build();
        assert!(codec.load(&bad).is_err());
        assert!(!codec.loaded(3));

        let good = MessageBuilder::new("Bad", 3)
            .field(Field::uint32("x").bounds(0, 10))
            .build();
        codec.load(&good).unwrap();
        assert!(codec.loaded(3));
    }

    #[test]
    fn test_unknown_id_codec_name_fails_construction() {
        let config = CodecConfig {
            id_codec_name: "no_such_codec".into(),
            ..CodecConfig::default()
        };
        assert!(Codec::with_config(config).is_err());
    }

    #[test]
    fn test_info_on_unloaded_descriptor() {
        let codec = Codec::new();
        let mut out = String::new();
        codec.info(&ping(), &mut out).unwrap();
        assert!(out.contains("Ping"));
        assert!(!codec.loaded(2));
    }

    #[test]
    fn test_info_all_sorted_by_id() {
        let codec = Codec::new();
        let b = MessageBuilder::new("B", 7)
            .field(Field::bool("x"))
            .build();
        codec.load(&b).unwrap();
        codec.load(&ping()).unwrap();
        let mut out = String::new();
        codec.info_all(&mut out);
        let ping_pos = out.find("Ping").unwrap();
        let b_pos = out.find("B {").unwrap();
        assert!(ping_pos < b_pos);
    }
}
