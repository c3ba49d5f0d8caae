// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Embedded sub-message codec.
//!
//! At `load` the codec compiles the nested schema's bound codecs; at
//! encode/decode it threads the caller's bit-buffer straight through them.
//! Optional sub-messages spend one presence bit; required ones spend none.

use crate::bits::BitBuffer;
use crate::error::{DcclError, Result};
use crate::field_codec::{CodecRegistry, FieldCodec};
use crate::message::Message;
use crate::plan::CompiledBody;
use crate::schema::{FieldDescriptor, FieldType, MessageDescriptor};
use crate::value::FieldValue;
use std::sync::Arc;

/// Default codec for embedded message fields.
#[derive(Default)]
pub struct SubMessageCodec {
    compiled: Option<(Arc<MessageDescriptor>, CompiledBody)>,
}

impl SubMessageCodec {
    fn nested_descriptor(field: &FieldDescriptor) -> Result<&Arc<MessageDescriptor>> {
        match &field.ty {
            FieldType::Message(desc) => Ok(desc),
            _ => Err(DcclError::SchemaInvalid(format!(
                "field '{}': message codec bound to a non-message field",
                field.name
            ))),
        }
    }

    fn body(&self, field: &FieldDescriptor) -> Result<&CompiledBody> {
        self.compiled
            .as_ref()
            .map(|(_, body)| body)
            .ok_or_else(|| {
                DcclError::SchemaInvalid(format!(
                    "field '{}': embedded message used before load",
                    field.name
                ))
            })
    }
}

impl FieldCodec for SubMessageCodec {
    fn name(&self) -> &'static str {
        "_default_codec"
    }

    fn bind(&mut self, field: &FieldDescriptor, registry: &CodecRegistry) -> Result<()> {
        let nested = Self::nested_descriptor(field)?;
        let body = CompiledBody::compile(nested, registry, true)?;
        self.compiled = Some((nested.clone(), body));
        Ok(())
    }

    fn validate(&self, field: &FieldDescriptor) -> Result<()> {
        self.body(field).map(|_| ())
    }

    fn min_size(&self, field: &FieldDescriptor) -> u32 {
        let Ok(body) = self.body(field) else { return 0 };
        if field.is_optional() {
            1
        } else {
            body.min_bits()
        }
    }

    fn max_size(&self, field: &FieldDescriptor) -> u32 {
        let Ok(body) = self.body(field) else { return 0 };
        u32::from(field.is_optional()) + body.max_bits()
    }

    fn value_size(&self, field: &FieldDescriptor, value: Option<&FieldValue>) -> Result<u32> {
        let body = self.body(field)?;
        let presence = u32::from(field.is_optional());
        match value {
            Some(FieldValue::Message(msg)) => Ok(presence + body.value_bits(msg)?),
            Some(_) => Err(DcclError::EncodeOutOfRange {
                field: field.name.clone(),
                detail: "expected an embedded message value".to_string(),
            }),
            None if field.is_optional() => Ok(presence),
            None => Err(DcclError::PresenceError {
                field: field.name.clone(),
            }),
        }
    }

    fn encode(
        &self,
        field: &FieldDescriptor,
        value: Option<&FieldValue>,
        bits: &mut BitBuffer,
    ) -> Result<()> {
        let (nested, body) = self.compiled.as_ref().ok_or_else(|| {
            DcclError::SchemaInvalid(format!(
                "field '{}': embedded message used before load",
                field.name
            ))
        })?;
        match value {
            Some(FieldValue::Message(msg)) => {
                if msg.descriptor().name != nested.name {
                    return Err(DcclError::EncodeOutOfRange {
                        field: field.name.clone(),
                        detail: format!(
                            "embedded message is '{}', field expects '{}'",
                            msg.descriptor().name,
                            nested.name
                        ),
                    });
                }
                if field.is_optional() {
                    bits.push_bits(1, 1).map_err(|e| e.into_encode())?;
                }
                body.encode(msg, bits)
            }
            Some(_) => Err(DcclError::EncodeOutOfRange {
                field: field.name.clone(),
                detail: "expected an embedded message value".to_string(),
            }),
            None if field.is_optional() => bits.push_bits(0, 1).map_err(|e| e.into_encode()),
            None => Err(DcclError::PresenceError {
                field: field.name.clone(),
            }),
        }
    }

    fn decode(&self, field: &FieldDescriptor, bits: &mut BitBuffer) -> Result<Option<FieldValue>> {
        let (nested, body) = self.compiled.as_ref().ok_or_else(|| {
            DcclError::SchemaInvalid(format!(
                "field '{}': embedded message used before load",
                field.name
            ))
        })?;
        if field.is_optional() {
            let present = bits.pop_bits(1).map_err(|e| e.into_decode(&field.name))?;
            if present == 0 {
                return Ok(None);
            }
        }
        let mut msg = Message::new(nested);
        body.decode(&mut msg, bits)?;
        Ok(Some(FieldValue::Message(msg)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, MessageBuilder};

    fn point() -> Arc<MessageDescriptor> {
        MessageBuilder::embedded("Point")
            .field(Field::int32("x").bounds(-100, 100))
            .field(Field::int32("y").bounds(-100, 100))
            .build()
    }

    fn bound_codec(field: &FieldDescriptor) -> SubMessageCodec {
        let registry = CodecRegistry::with_defaults();
        let mut codec = SubMessageCodec::default();
        codec.bind(field, &registry).unwrap();
        codec.validate(field).unwrap();
        codec
    }

    #[test]
    fn test_required_submessage_roundtrip() {
        let field = Field::message("origin", point()).build();
        let codec = bound_codec(&field);
        // Two 8-bit coordinates, no presence bit.
        assert_eq!(codec.min_size(&field), 16);
        assert_eq!(codec.max_size(&field), 16);

        let mut inner = Message::new(&point());
        inner.set("x", -5i32).unwrap();
        inner.set("y", 99i32).unwrap();

        let mut bits = BitBuffer::new(1024);
        codec
            .encode(&field, Some(&FieldValue::Message(inner.clone())), &mut bits)
            .unwrap();
        assert_eq!(bits.len(), 16);

        let decoded = codec.decode(&field, &mut bits).unwrap().unwrap();
        let msg = decoded.as_message().unwrap();
        assert_eq!(msg.get::<i32>("x").unwrap(), -5);
        assert_eq!(msg.get::<i32>("y").unwrap(), 99);
    }

    #[test]
    fn test_optional_submessage_presence_bit() {
        let field = Field::message("origin", point()).optional().build();
        let codec = bound_codec(&field);
        assert_eq!(codec.min_size(&field), 1);
        assert_eq!(codec.max_size(&field), 17);

        let mut bits = BitBuffer::new(1024);
        codec.encode(&field, None, &mut bits).unwrap();
        assert_eq!(bits.len(), 1);
        assert_eq!(codec.decode(&field, &mut bits).unwrap(), None);
    }

    #[test]
    fn test_nested_in_head_rejected() {
        let bad = MessageBuilder::embedded("Bad")
            .field(Field::uint32("time").bounds(0, 0).in_head())
            .build();
        let field = Field::message("sub", bad).build();
        let registry = CodecRegistry::with_defaults();
        let mut codec = SubMessageCodec::default();
        assert!(matches!(
            codec.bind(&field, &registry),
            Err(DcclError::SchemaInvalid(_))
        ));
    }

    #[test]
    fn test_wrong_descriptor_rejected_at_encode() {
        let field = Field::message("origin", point()).build();
        let codec = bound_codec(&field);
        let other = MessageBuilder::embedded("Other")
            .field(Field::bool("b"))
            .build();
        let mut bits = BitBuffer::new(64);
        assert!(matches!(
            codec.encode(
                &field,
                Some(&FieldValue::Message(Message::new(&other))),
                &mut bits
            ),
            Err(DcclError::EncodeOutOfRange { .. })
        ));
    }
}
