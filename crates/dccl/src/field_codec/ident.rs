// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Default identifier codec: the varint id prefix on every wire message.
//!
//! One byte for ids below 128 (high bit clear, low 7 bits carry the id);
//! two bytes otherwise (high bit of the first byte set, remaining 15 bits
//! carry the id big-endian). The encoding is prefix-free, so a receiver
//! can always delimit the id without knowing the body schema.

use crate::bits::BitBuffer;
use crate::error::{DcclError, Result};
use crate::field_codec::FieldCodec;
use crate::schema::FieldDescriptor;
use crate::value::FieldValue;

/// Largest id the two-byte form can carry.
const MAX_VARINT_ID: u32 = 0x7FFF;

/// Threshold below which the one-byte form applies.
const ONE_BYTE_LIMIT: u32 = 0x80;

/// Default identifier codec (`_default_id_codec`).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierCodec;

impl FieldCodec for IdentifierCodec {
    fn name(&self) -> &'static str {
        "_default_id_codec"
    }

    fn validate(&self, _field: &FieldDescriptor) -> Result<()> {
        Ok(())
    }

    fn min_size(&self, _field: &FieldDescriptor) -> u32 {
        8
    }

    fn max_size(&self, _field: &FieldDescriptor) -> u32 {
        16
    }

    fn value_size(&self, field: &FieldDescriptor, value: Option<&FieldValue>) -> Result<u32> {
        match value {
            Some(FieldValue::UInt32(id)) if *id < ONE_BYTE_LIMIT => Ok(8),
            Some(FieldValue::UInt32(_)) => Ok(16),
            _ => Err(DcclError::EncodeOutOfRange {
                field: field.name.clone(),
                detail: "identifier codec expects a uint32 id".to_string(),
            }),
        }
    }

    fn encode(
        &self,
        field: &FieldDescriptor,
        value: Option<&FieldValue>,
        bits: &mut BitBuffer,
    ) -> Result<()> {
        let id = match value {
            Some(FieldValue::UInt32(id)) => *id,
            _ => {
                return Err(DcclError::EncodeOutOfRange {
                    field: field.name.clone(),
                    detail: "identifier codec expects a uint32 id".to_string(),
                })
            }
        };
        if id > MAX_VARINT_ID {
            return Err(DcclError::EncodeOutOfRange {
                field: field.name.clone(),
                detail: format!("id {} exceeds the two-byte prefix form", id),
            });
        }
        if id < ONE_BYTE_LIMIT {
            bits.push_bits(u64::from(id), 8).map_err(|e| e.into_encode())
        } else {
            bits.push_bits(u64::from(0x8000 | id), 16)
                .map_err(|e| e.into_encode())
        }
    }

    fn decode(&self, field: &FieldDescriptor, bits: &mut BitBuffer) -> Result<Option<FieldValue>> {
        let first = bits.pop_bits(8).map_err(|e| e.into_decode(&field.name))?;
        let id = if first & 0x80 == 0 {
            first as u32
        } else {
            let second = bits.pop_bits(8).map_err(|e| e.into_decode(&field.name))?;
            (((first & 0x7F) << 8) | second) as u32
        };
        Ok(Some(FieldValue::UInt32(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, FieldDescriptor};

    fn id_field() -> FieldDescriptor {
        Field::uint32("_id").build()
    }

    fn roundtrip(id: u32) -> (usize, u32) {
        let codec = IdentifierCodec;
        let field = id_field();
        let mut bits = BitBuffer::new(64);
        codec
            .encode(&field, Some(&FieldValue::UInt32(id)), &mut bits)
            .unwrap();
        let width = bits.len();
        let decoded = codec.decode(&field, &mut bits).unwrap().unwrap();
        (width, decoded.as_u32().unwrap())
    }

    #[test]
    fn test_one_byte_form() {
        assert_eq!(roundtrip(0), (8, 0));
        assert_eq!(roundtrip(42), (8, 42));
        assert_eq!(roundtrip(127), (8, 127));
    }

    #[test]
    fn test_two_byte_form() {
        assert_eq!(roundtrip(128), (16, 128));
        assert_eq!(roundtrip(511), (16, 511));
        assert_eq!(roundtrip(0x7FFF), (16, 0x7FFF));
    }

    #[test]
    fn test_prefix_bytes_are_self_delimiting() {
        let codec = IdentifierCodec;
        let field = id_field();
        let mut bits = BitBuffer::new(64);
        codec
            .encode(&field, Some(&FieldValue::UInt32(300)), &mut bits)
            .unwrap();
        let bytes = bits.into_bytes();
        assert_eq!(bytes.len(), 2);
        assert_eq!(bytes[0] & 0x80, 0x80);
        assert_eq!(((u32::from(bytes[0]) & 0x7F) << 8) | u32::from(bytes[1]), 300);
    }

    #[test]
    fn test_oversized_id_rejected() {
        let codec = IdentifierCodec;
        let field = id_field();
        let mut bits = BitBuffer::new(64);
        assert!(codec
            .encode(&field, Some(&FieldValue::UInt32(0x8000)), &mut bits)
            .is_err());
    }

    #[test]
    fn test_value_size_matches_form() {
        let codec = IdentifierCodec;
        let field = id_field();
        assert_eq!(codec.value_size(&field, Some(&FieldValue::UInt32(5))).unwrap(), 8);
        assert_eq!(codec.value_size(&field, Some(&FieldValue::UInt32(200))).unwrap(), 16);
    }
}
