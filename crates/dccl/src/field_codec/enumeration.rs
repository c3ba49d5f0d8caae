// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Index-coded enumeration codec.
//!
//! The wire carries the *declared index* of the value, not its numeric
//! tag, so sparse tag numbering costs nothing. Unknown indices at decode
//! are reported, never silently dropped.

use crate::bits::BitBuffer;
use crate::error::{DcclError, Result};
use crate::field_codec::{bits_for_states, FieldCodec};
use crate::schema::{EnumDescriptor, FieldDescriptor, FieldType};
use crate::value::FieldValue;
use std::sync::Arc;

/// Default codec for enumeration fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumCodec;

impl EnumCodec {
    fn descriptor(field: &FieldDescriptor) -> Result<&Arc<EnumDescriptor>> {
        match &field.ty {
            FieldType::Enum(desc) => Ok(desc),
            _ => Err(DcclError::SchemaInvalid(format!(
                "field '{}': enum codec bound to a non-enum field",
                field.name
            ))),
        }
    }

    fn width(desc: &EnumDescriptor, optional: bool) -> u32 {
        bits_for_states(desc.values.len() as u64 + u64::from(optional))
    }
}

impl FieldCodec for EnumCodec {
    fn name(&self) -> &'static str {
        "_default_codec"
    }

    fn validate(&self, field: &FieldDescriptor) -> Result<()> {
        let desc = Self::descriptor(field)?;
        if desc.values.is_empty() {
            return Err(DcclError::SchemaInvalid(format!(
                "field '{}': enum '{}' declares no values",
                field.name, desc.name
            )));
        }
        Ok(())
    }

    fn min_size(&self, field: &FieldDescriptor) -> u32 {
        self.max_size(field)
    }

    fn max_size(&self, field: &FieldDescriptor) -> u32 {
        Self::descriptor(field)
            .map(|d| Self::width(d, field.is_optional()))
            .unwrap_or(0)
    }

    fn value_size(&self, field: &FieldDescriptor, value: Option<&FieldValue>) -> Result<u32> {
        if value.is_none() && !field.is_optional() {
            return Err(DcclError::PresenceError {
                field: field.name.clone(),
            });
        }
        Ok(self.max_size(field))
    }

    fn encode(
        &self,
        field: &FieldDescriptor,
        value: Option<&FieldValue>,
        bits: &mut BitBuffer,
    ) -> Result<()> {
        let desc = Self::descriptor(field)?;
        let width = Self::width(desc, field.is_optional());
        let raw = match value {
            Some(FieldValue::Enum(number, _)) => {
                desc.index_of(*number)
                    .ok_or_else(|| DcclError::EncodeOutOfRange {
                        field: field.name.clone(),
                        detail: format!("enum '{}' has no value numbered {}", desc.name, number),
                    })? as u64
            }
            Some(_) => {
                return Err(DcclError::EncodeOutOfRange {
                    field: field.name.clone(),
                    detail: "expected an enum value".to_string(),
                })
            }
            None if field.is_optional() => desc.values.len() as u64,
            None => {
                return Err(DcclError::PresenceError {
                    field: field.name.clone(),
                })
            }
        };
        bits.push_bits(raw, width).map_err(|e| e.into_encode())
    }

    fn decode(&self, field: &FieldDescriptor, bits: &mut BitBuffer) -> Result<Option<FieldValue>> {
        let desc = Self::descriptor(field)?;
        let width = Self::width(desc, field.is_optional());
        let raw = bits
            .pop_bits(width)
            .map_err(|e| e.into_decode(&field.name))? as usize;
        let count = desc.values.len();
        if field.is_optional() && raw == count {
            return Ok(None);
        }
        let value = desc.values.get(raw).ok_or_else(|| DcclError::DecodeOutOfRange {
            field: field.name.clone(),
            detail: format!("enum index {} has no mapping in '{}'", raw, desc.name),
        })?;
        Ok(Some(FieldValue::Enum(value.number, value.name.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumBuilder, Field};

    fn mode_enum() -> Arc<EnumDescriptor> {
        EnumBuilder::new("Mode")
            .value_number("MODE_IDLE", 10)
            .value_number("MODE_SURVEY", 3)
            .value_number("MODE_RETURN", 7)
            .build()
    }

    #[test]
    fn test_widths() {
        let codec = EnumCodec;
        let required = Field::enumeration("m", mode_enum()).build();
        let optional = Field::enumeration("m", mode_enum()).optional().build();
        assert_eq!(codec.max_size(&required), 2); // 3 states
        assert_eq!(codec.max_size(&optional), 2); // 4 states
    }

    #[test]
    fn test_index_not_tag_on_the_wire() {
        let codec = EnumCodec;
        let field = Field::enumeration("m", mode_enum()).build();
        let mut bits = BitBuffer::new(64);
        // MODE_SURVEY has tag 3 but declared index 1.
        codec
            .encode(&field, Some(&FieldValue::Enum(3, "MODE_SURVEY".into())), &mut bits)
            .unwrap();
        assert_eq!(bits.clone().pop_bits(2).unwrap(), 1);

        let decoded = codec.decode(&field, &mut bits).unwrap().unwrap();
        assert_eq!(decoded.enum_number(), Some(3));
        assert_eq!(decoded.enum_name(), Some("MODE_SURVEY"));
    }

    #[test]
    fn test_optional_sentinel() {
        let codec = EnumCodec;
        let field = Field::enumeration("m", mode_enum()).optional().build();
        let mut bits = BitBuffer::new(64);
        codec.encode(&field, None, &mut bits).unwrap();
        assert_eq!(codec.decode(&field, &mut bits).unwrap(), None);
    }

    #[test]
    fn test_unknown_index_reported_at_decode() {
        let codec = EnumCodec;
        let field = Field::enumeration("m", mode_enum()).build();
        let mut bits = BitBuffer::new(64);
        bits.push_bits(3, 2).unwrap(); // only indices 0..=2 are declared
        assert!(matches!(
            codec.decode(&field, &mut bits),
            Err(DcclError::DecodeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_unknown_tag_rejected_at_encode() {
        let codec = EnumCodec;
        let field = Field::enumeration("m", mode_enum()).build();
        let mut bits = BitBuffer::new(64);
        assert!(matches!(
            codec.encode(&field, Some(&FieldValue::Enum(99, "BOGUS".into())), &mut bits),
            Err(DcclError::EncodeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_empty_enum_rejected_at_validate() {
        let empty = EnumBuilder::new("Empty").build();
        let field = Field::enumeration("m", empty).build();
        assert!(EnumCodec.validate(&field).is_err());
    }
}
