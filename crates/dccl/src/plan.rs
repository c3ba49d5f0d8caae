// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compiled plans: a validated schema with its bound codecs.
//!
//! `load` walks a descriptor once, binds a codec to every field, validates
//! the options, and records the size bounds. Everything encode/decode
//! needs afterwards lives here; the registry is never consulted again.

use crate::bits::BitBuffer;
use crate::config::{HEADER_BITS, MAX_MESSAGE_ID, SECONDS_PER_DAY};
use crate::error::{DcclError, Result};
use crate::field_codec::{CodecRegistry, FieldCodec, RepeatedCodec};
use crate::header::{Header, HeaderSlot};
use crate::message::Message;
use crate::schema::{FieldDescriptor, FieldType, Label, MessageDescriptor};
use crate::value::FieldValue;
use std::fmt;
use std::sync::Arc;

/// One field with its bound codec instance.
pub(crate) struct BoundField {
    index: usize,
    codec: Box<dyn FieldCodec>,
}

impl fmt::Debug for BoundField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundField")
            .field("index", &self.index)
            .field("codec", &self.codec.name())
            .finish()
    }
}

/// The bound body fields of one message level (top-level or nested).
pub(crate) struct CompiledBody {
    descriptor: Arc<MessageDescriptor>,
    fields: Vec<BoundField>,
}

impl fmt::Debug for CompiledBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledBody")
            .field("descriptor", &self.descriptor.name)
            .field("fields", &self.fields)
            .finish()
    }
}

impl CompiledBody {
    /// Bind and validate codecs for every body field of `descriptor`.
    ///
    /// `nested` rejects `in_head` outright; the top level skips those
    /// fields here and binds them to header slots instead.
    pub(crate) fn compile(
        descriptor: &Arc<MessageDescriptor>,
        registry: &CodecRegistry,
        nested: bool,
    ) -> Result<Self> {
        let mut fields = Vec::new();
        for (index, field) in descriptor.fields.iter().enumerate() {
            if field.options.in_head {
                if nested {
                    return Err(DcclError::SchemaInvalid(format!(
                        "field '{}': in_head is not allowed inside embedded message '{}'",
                        field.name, descriptor.name
                    )));
                }
                continue;
            }
            let mut codec = registry.build(field.ty.kind(), field.codec_name())?;
            if field.label == Label::Repeated {
                codec = Box::new(RepeatedCodec::new(codec));
            }
            codec.bind(field, registry)?;
            codec.validate(field)?;
            fields.push(BoundField { index, codec });
        }
        Ok(Self {
            descriptor: descriptor.clone(),
            fields,
        })
    }

    fn field(&self, bound: &BoundField) -> &FieldDescriptor {
        &self.descriptor.fields[bound.index]
    }

    /// Minimum total bits of this body.
    pub(crate) fn min_bits(&self) -> u32 {
        self.fields
            .iter()
            .map(|b| b.codec.min_size(self.field(b)))
            .sum()
    }

    /// Maximum total bits of this body.
    pub(crate) fn max_bits(&self) -> u32 {
        self.fields
            .iter()
            .map(|b| b.codec.max_size(self.field(b)))
            .sum()
    }

    /// Bits the given message's body would consume.
    pub(crate) fn value_bits(&self, msg: &Message) -> Result<u32> {
        let mut total = 0;
        for bound in &self.fields {
            let field = self.field(bound);
            total += bound.codec.value_size(field, msg.get_field(&field.name))?;
        }
        Ok(total)
    }

    /// Encode every body field in declared order.
    pub(crate) fn encode(&self, msg: &Message, bits: &mut BitBuffer) -> Result<()> {
        for bound in &self.fields {
            let field = self.field(bound);
            bound.codec.encode(field, msg.get_field(&field.name), bits)?;
        }
        Ok(())
    }

    /// Decode every body field in declared order into `msg`.
    pub(crate) fn decode(&self, msg: &mut Message, bits: &mut BitBuffer) -> Result<()> {
        for bound in &self.fields {
            let field = self.field(bound);
            if let Some(value) = bound.codec.decode(field, bits)? {
                msg.insert_raw(&field.name, value);
            }
        }
        Ok(())
    }

    /// Append one `info` table row per field.
    fn write_info(&self, out: &mut dyn fmt::Write, indent: usize) -> fmt::Result {
        for bound in &self.fields {
            let field = self.field(bound);
            writeln!(
                out,
                "{:indent$}{} ({}, {}): {}..{} bits",
                "",
                field.name,
                field.ty.kind().as_str(),
                bound.codec.name(),
                bound.codec.min_size(field),
                bound.codec.max_size(field),
                indent = indent
            )?;
        }
        Ok(())
    }
}

/// A bound header field.
#[derive(Debug)]
pub(crate) struct HeaderBinding {
    index: usize,
    slot: HeaderSlot,
}

/// Compiled plan for one validated top-level schema.
pub struct Plan {
    descriptor: Arc<MessageDescriptor>,
    header_bindings: Vec<HeaderBinding>,
    body: CompiledBody,
    min_body_bits: u32,
    max_body_bits: u32,
    id_prefix_bytes: usize,
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plan")
            .field("descriptor", &self.descriptor.name)
            .field("header_bindings", &self.header_bindings)
            .field("body", &self.body)
            .field("min_body_bits", &self.min_body_bits)
            .field("max_body_bits", &self.max_body_bits)
            .field("id_prefix_bytes", &self.id_prefix_bytes)
            .finish()
    }
}

impl Plan {
    /// Validate `descriptor` and bind codecs from `registry`.
    ///
    /// `id_prefix_bytes` is the identifier prefix length for this id, and
    /// `cap_bytes` the effective byte cap (global cap capped further by the
    /// per-message `max_bytes` option).
    pub(crate) fn compile(
        descriptor: &Arc<MessageDescriptor>,
        registry: &CodecRegistry,
        id_prefix_bytes: usize,
        cap_bytes: usize,
    ) -> Result<Self> {
        if descriptor.id > MAX_MESSAGE_ID {
            return Err(DcclError::SchemaInvalid(format!(
                "message '{}': id {} does not fit the {}-bit header slot",
                descriptor.name,
                descriptor.id,
                crate::config::HEAD_DCCL_ID_BITS
            )));
        }

        let mut header_bindings = Vec::new();
        for (index, field) in descriptor.fields.iter().enumerate() {
            if field.options.in_head {
                let slot = Self::resolve_slot(field)?;
                header_bindings.push(HeaderBinding { index, slot });
            }
        }

        let body = CompiledBody::compile(descriptor, registry, false)?;
        let min_body_bits = body.min_bits();
        let max_body_bits = body.max_bits();

        let plan = Self {
            descriptor: descriptor.clone(),
            header_bindings,
            body,
            min_body_bits,
            max_body_bits,
            id_prefix_bytes,
        };
        let need = plan.max_encoded_bytes();
        if need > cap_bytes {
            return Err(DcclError::SchemaOversize {
                need,
                cap: cap_bytes,
            });
        }
        Ok(plan)
    }

    fn resolve_slot(field: &FieldDescriptor) -> Result<HeaderSlot> {
        let schema_err = |msg: String| DcclError::SchemaInvalid(msg);
        if field.label == Label::Repeated {
            return Err(schema_err(format!(
                "field '{}': repeated fields cannot bind header slots",
                field.name
            )));
        }
        let slot = HeaderSlot::from_field_name(&field.name).ok_or_else(|| {
            schema_err(format!(
                "field '{}': no header slot matches this name",
                field.name
            ))
        })?;
        let type_ok = if slot.is_flag() {
            matches!(field.ty, FieldType::Bool)
        } else {
            field.ty.is_integer()
        };
        if !type_ok {
            return Err(schema_err(format!(
                "field '{}': type {} cannot bind header slot {}",
                field.name,
                field.ty.kind().as_str(),
                slot.name()
            )));
        }
        Ok(slot)
    }

    /// Schema descriptor this plan was compiled from.
    pub fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    /// Wire id.
    pub fn id(&self) -> u32 {
        self.descriptor.id
    }

    /// Minimum body bits across all values.
    pub fn min_body_bits(&self) -> u32 {
        self.min_body_bits
    }

    /// Maximum body bits across all values.
    pub fn max_body_bits(&self) -> u32 {
        self.max_body_bits
    }

    /// Identifier prefix length for this plan's id, in bytes.
    pub fn id_prefix_bytes(&self) -> usize {
        self.id_prefix_bytes
    }

    /// Smallest byte string this plan can decode.
    pub fn min_encoded_bytes(&self) -> usize {
        self.id_prefix_bytes + ((HEADER_BITS + self.min_body_bits) as usize).div_ceil(8)
    }

    /// Largest byte string this plan can encode.
    pub fn max_encoded_bytes(&self) -> usize {
        self.id_prefix_bytes + ((HEADER_BITS + self.max_body_bits) as usize).div_ceil(8)
    }

    /// Bits the body of `msg` would consume, without encoding.
    pub(crate) fn body_bits_for(&self, msg: &Message) -> Result<u32> {
        self.body.value_bits(msg)
    }

    /// Encode all body fields of `msg`.
    pub(crate) fn encode_body(&self, msg: &Message, bits: &mut BitBuffer) -> Result<()> {
        self.body.encode(msg, bits)
    }

    /// Decode all body fields into `msg`.
    pub(crate) fn decode_body(&self, msg: &mut Message, bits: &mut BitBuffer) -> Result<()> {
        self.body.decode(msg, bits)
    }

    /// Build the fixed header from the message's bound fields.
    ///
    /// Unbound slots stay zero, which keeps encode deterministic.
    pub(crate) fn header_from(&self, msg: &Message) -> Result<Header> {
        let mut header = Header::default();
        for binding in &self.header_bindings {
            let field = &self.descriptor.fields[binding.index];
            let Some(value) = msg.get_field(&field.name) else {
                continue;
            };
            match binding.slot {
                HeaderSlot::Time => {
                    let v = value.integer_value().ok_or_else(|| {
                        DcclError::EncodeOutOfRange {
                            field: field.name.clone(),
                            detail: "expected an integer value".to_string(),
                        }
                    })?;
                    header.time = (v.rem_euclid(i64::from(SECONDS_PER_DAY))) as u32;
                }
                HeaderSlot::SrcId | HeaderSlot::DestId => {
                    let v = value.integer_value().ok_or_else(|| {
                        DcclError::EncodeOutOfRange {
                            field: field.name.clone(),
                            detail: "expected an integer value".to_string(),
                        }
                    })?;
                    let addr = u8::try_from(v).ok().filter(|a| *a < 32).ok_or_else(|| {
                        DcclError::EncodeOutOfRange {
                            field: field.name.clone(),
                            detail: format!("address {} does not fit 5 bits", v),
                        }
                    })?;
                    if binding.slot == HeaderSlot::SrcId {
                        header.src = addr;
                    } else {
                        header.dest = addr;
                    }
                }
                HeaderSlot::MultimessageFlag | HeaderSlot::BroadcastFlag => {
                    let v = value.as_bool().ok_or_else(|| DcclError::EncodeOutOfRange {
                        field: field.name.clone(),
                        detail: "expected a bool value".to_string(),
                    })?;
                    if binding.slot == HeaderSlot::MultimessageFlag {
                        header.multimessage = v;
                    } else {
                        header.broadcast = v;
                    }
                }
            }
        }
        Ok(header)
    }

    /// Populate the message's bound fields from a decoded header.
    pub(crate) fn apply_header(&self, msg: &mut Message, header: &Header) {
        for binding in &self.header_bindings {
            let field = &self.descriptor.fields[binding.index];
            let value = match binding.slot {
                HeaderSlot::Time => integer_field_value(field, i64::from(header.time)),
                HeaderSlot::SrcId => integer_field_value(field, i64::from(header.src)),
                HeaderSlot::DestId => integer_field_value(field, i64::from(header.dest)),
                HeaderSlot::MultimessageFlag => Some(FieldValue::Bool(header.multimessage)),
                HeaderSlot::BroadcastFlag => Some(FieldValue::Bool(header.broadcast)),
            };
            if let Some(value) = value {
                msg.insert_raw(&field.name, value);
            }
        }
    }

    /// Write a human-readable summary (field, codec, min/max bits).
    pub fn write_info(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(
            out,
            "{} {{id: {}}}: {} byte header, body {}..{} bits, {}..{} bytes total",
            self.descriptor.name,
            self.descriptor.id,
            crate::config::HEADER_BYTES,
            self.min_body_bits,
            self.max_body_bits,
            self.min_encoded_bytes(),
            self.max_encoded_bytes(),
        )?;
        for binding in &self.header_bindings {
            let field = &self.descriptor.fields[binding.index];
            writeln!(
                out,
                "  {} (header slot {}): {} bits",
                field.name,
                binding.slot.name(),
                binding.slot.bits()
            )?;
        }
        self.body.write_info(out, 2)
    }
}

fn integer_field_value(field: &FieldDescriptor, v: i64) -> Option<FieldValue> {
    match field.ty {
        FieldType::Int32 => Some(FieldValue::Int32(v as i32)),
        FieldType::Int64 => Some(FieldValue::Int64(v)),
        FieldType::UInt32 => Some(FieldValue::UInt32(v as u32)),
        FieldType::UInt64 => Some(FieldValue::UInt64(v as u64)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_codec::CodecRegistry;
    use crate::schema::{Field, MessageBuilder};

    fn registry() -> CodecRegistry {
        CodecRegistry::with_defaults()
    }

    #[test]
    fn test_compile_computes_body_bounds() {
        let desc = MessageBuilder::new("Test", 2)
            .field(Field::int32("x").bounds(0, 255))
            .field(Field::uint32("y").bounds(0, 100).optional())
            .build();
        let plan = Plan::compile(&desc, &registry(), 1, 256).unwrap();
        assert_eq!(plan.min_body_bits(), 8 + 7);
        assert_eq!(plan.max_body_bits(), 8 + 7);
        // 1 id byte + ceil((48 + 15) / 8) = 1 + 8.
        assert_eq!(plan.max_encoded_bytes(), 9);
    }

    #[test]
    fn test_oversize_schema_rejected() {
        let desc = MessageBuilder::new("Big", 3)
            .field(Field::bytes("blob").fixed_length(300))
            .build();
        let err = Plan::compile(&desc, &registry(), 1, 256).unwrap_err();
        assert!(matches!(err, DcclError::SchemaOversize { need, cap: 256 } if need > 256));
    }

    #[test]
    fn test_id_must_fit_header_slot() {
        let desc = MessageBuilder::new("Test", 512)
            .field(Field::int32("x").bounds(0, 1))
            .build();
        assert!(matches!(
            Plan::compile(&desc, &registry(), 2, 256),
            Err(DcclError::SchemaInvalid(_))
        ));
    }

    #[test]
    fn test_header_binding_resolution() {
        let desc = MessageBuilder::new("Test", 2)
            .field(Field::uint32("time").bounds(0, 0).in_head())
            .field(Field::uint32("src_id").bounds(0, 0).in_head())
            .field(Field::bool("broadcast_flag").in_head())
            .field(Field::int32("x").bounds(0, 10))
            .build();
        let plan = Plan::compile(&desc, &registry(), 1, 256).unwrap();
        assert_eq!(plan.header_bindings.len(), 3);
        // Header-bound fields contribute nothing to the body.
        assert_eq!(plan.max_body_bits(), 4);
    }

    #[test]
    fn test_unknown_header_slot_rejected() {
        let desc = MessageBuilder::new("Test", 2)
            .field(Field::uint32("not_a_slot").bounds(0, 1).in_head())
            .build();
        assert!(matches!(
            Plan::compile(&desc, &registry(), 1, 256),
            Err(DcclError::SchemaInvalid(_))
        ));
    }

    #[test]
    fn test_flag_slot_requires_bool() {
        let desc = MessageBuilder::new("Test", 2)
            .field(Field::uint32("broadcast_flag").bounds(0, 1).in_head())
            .build();
        assert!(matches!(
            Plan::compile(&desc, &registry(), 1, 256),
            Err(DcclError::SchemaInvalid(_))
        ));
    }

    #[test]
    fn test_header_values_roundtrip_through_plan() {
        let desc = MessageBuilder::new("Test", 2)
            .field(Field::uint32("time").bounds(0, 0).in_head())
            .field(Field::uint32("dest_id").bounds(0, 0).in_head())
            .build();
        let plan = Plan::compile(&desc, &registry(), 1, 256).unwrap();

        let mut msg = Message::new(&desc);
        msg.set("time", 90_000u32).unwrap(); // wraps past one day
        msg.set("dest_id", 17u32).unwrap();

        let header = plan.header_from(&msg).unwrap();
        assert_eq!(header.time, 90_000 - SECONDS_PER_DAY);
        assert_eq!(header.dest, 17);

        let mut decoded = Message::new(&desc);
        plan.apply_header(&mut decoded, &header);
        assert_eq!(decoded.get::<u32>("dest_id").unwrap(), 17);
    }

    #[test]
    fn test_address_beyond_five_bits_fails() {
        let desc = MessageBuilder::new("Test", 2)
            .field(Field::uint32("src_id").bounds(0, 0).in_head())
            .build();
        let plan = Plan::compile(&desc, &registry(), 1, 256).unwrap();
        let mut msg = Message::new(&desc);
        msg.set("src_id", 32u32).unwrap();
        assert!(matches!(
            plan.header_from(&msg),
            Err(DcclError::EncodeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_info_table_lists_fields() {
        let desc = MessageBuilder::new("NavReport", 12)
            .field(Field::double("lat").bounds_f(-90.0, 90.0).precision(4))
            .field(Field::string("note").max_length(8).optional())
            .build();
        let plan = Plan::compile(&desc, &registry(), 1, 256).unwrap();
        let mut out = String::new();
        plan.write_info(&mut out).unwrap();
        assert!(out.contains("NavReport"));
        assert!(out.contains("lat"));
        assert!(out.contains("_default_codec"));
    }
}
