// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Length-prefixed string and bytes codecs.
//!
//! The length prefix is a ranged integer over `[0, max_length]`, with one
//! extra sentinel state for absence when the field is optional. Values
//! longer than `max_length` are truncated at encode (with a warning), the
//! same policy the original modem deployments relied on.

use crate::bits::BitBuffer;
use crate::error::{DcclError, Result};
use crate::field_codec::{bits_for_states, FieldCodec};
use crate::schema::FieldDescriptor;
use crate::value::FieldValue;

#[cfg(feature = "logging")]
use crate::warn;

fn max_length(field: &FieldDescriptor) -> Result<usize> {
    match field.options.max_length {
        Some(len) if len > 0 => Ok(len),
        Some(_) => Err(DcclError::SchemaInvalid(format!(
            "field '{}': max_length must be positive",
            field.name
        ))),
        None => Err(DcclError::SchemaInvalid(format!(
            "field '{}': missing max_length",
            field.name
        ))),
    }
}

fn length_prefix_width(max_len: usize, optional: bool) -> u32 {
    bits_for_states(max_len as u64 + 1 + u64::from(optional))
}

/// Sentinel length value meaning "not present" (optional fields only).
fn length_sentinel(max_len: usize) -> u64 {
    max_len as u64 + 1
}

// =======================================================================
// String codec
// =======================================================================

/// Length-prefixed string codec.
///
/// The default variant stores 8 bits per byte; the `_7bit_string_codec`
/// variant packs ASCII into 7 bits per byte and rejects anything else.
#[derive(Debug, Clone, Copy)]
pub struct StringCodec {
    seven_bit: bool,
}

impl StringCodec {
    /// ASCII-packed variant: 7 bits per byte.
    pub fn seven_bit() -> Self {
        Self { seven_bit: true }
    }

    fn char_bits(&self) -> u32 {
        if self.seven_bit {
            7
        } else {
            8
        }
    }

    /// Truncate to `max_len` bytes without splitting a UTF-8 sequence.
    fn clip<'a>(&self, field: &FieldDescriptor, s: &'a str, max_len: usize) -> &'a str {
        if s.len() <= max_len {
            return s;
        }
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        #[cfg(feature = "logging")]
        warn!(
            "field '{}': string of {} bytes truncated to max_length {}",
            field.name,
            s.len(),
            max_len
        );
        #[cfg(not(feature = "logging"))]
        let _ = field;
        &s[..end]
    }
}

impl Default for StringCodec {
    fn default() -> Self {
        Self { seven_bit: false }
    }
}

impl FieldCodec for StringCodec {
    fn name(&self) -> &'static str {
        if self.seven_bit {
            "_7bit_string_codec"
        } else {
            "_default_codec"
        }
    }

    fn validate(&self, field: &FieldDescriptor) -> Result<()> {
        max_length(field).map(|_| ())
    }

    fn min_size(&self, field: &FieldDescriptor) -> u32 {
        max_length(field)
            .map(|len| length_prefix_width(len, field.is_optional()))
            .unwrap_or(0)
    }

    fn max_size(&self, field: &FieldDescriptor) -> u32 {
        max_length(field)
            .map(|len| {
                length_prefix_width(len, field.is_optional()) + len as u32 * self.char_bits()
            })
            .unwrap_or(0)
    }

    fn value_size(&self, field: &FieldDescriptor, value: Option<&FieldValue>) -> Result<u32> {
        let max_len = max_length(field)?;
        let prefix = length_prefix_width(max_len, field.is_optional());
        match value {
            Some(FieldValue::String(s)) => {
                let len = self.clip(field, s, max_len).len() as u32;
                Ok(prefix + len * self.char_bits())
            }
            Some(_) => Err(DcclError::EncodeOutOfRange {
                field: field.name.clone(),
                detail: "expected a string value".to_string(),
            }),
            None if field.is_optional() => Ok(prefix),
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
        let max_len = max_length(field)?;
        let prefix = length_prefix_width(max_len, field.is_optional());
        match value {
            Some(FieldValue::String(s)) => {
                let s = self.clip(field, s, max_len);
                bits.push_bits(s.len() as u64, prefix)
                    .map_err(|e| e.into_encode())?;
                for byte in s.bytes() {
                    if self.seven_bit && byte > 0x7F {
                        return Err(DcclError::EncodeOutOfRange {
                            field: field.name.clone(),
                            detail: format!("byte 0x{:02x} does not fit 7-bit ASCII", byte),
                        });
                    }
                    bits.push_bits(u64::from(byte), self.char_bits())
                        .map_err(|e| e.into_encode())?;
                }
                Ok(())
            }
            Some(_) => Err(DcclError::EncodeOutOfRange {
                field: field.name.clone(),
                detail: "expected a string value".to_string(),
            }),
            None if field.is_optional() => bits
                .push_bits(length_sentinel(max_len), prefix)
                .map_err(|e| e.into_encode()),
            None => Err(DcclError::PresenceError {
                field: field.name.clone(),
            }),
        }
    }

    fn decode(&self, field: &FieldDescriptor, bits: &mut BitBuffer) -> Result<Option<FieldValue>> {
        let max_len = max_length(field)?;
        let prefix = length_prefix_width(max_len, field.is_optional());
        let len = bits
            .pop_bits(prefix)
            .map_err(|e| e.into_decode(&field.name))?;
        if field.is_optional() && len >= length_sentinel(max_len) {
            return Ok(None);
        }
        if len > max_len as u64 {
            return Err(DcclError::DecodeOutOfRange {
                field: field.name.clone(),
                detail: format!("length {} exceeds max_length {}", len, max_len),
            });
        }
        let mut bytes = Vec::with_capacity(len as usize);
        for _ in 0..len {
            bytes.push(
                bits.pop_bits(self.char_bits())
                    .map_err(|e| e.into_decode(&field.name))? as u8,
            );
        }
        let s = String::from_utf8(bytes).map_err(|_| DcclError::DecodeOutOfRange {
            field: field.name.clone(),
            detail: "decoded bytes are not valid UTF-8".to_string(),
        })?;
        Ok(Some(FieldValue::String(s)))
    }
}

// =======================================================================
// Bytes codec
// =======================================================================

/// Byte-string codec: fixed layout when `min_length == max_length`
/// (no prefix), length-prefixed otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl BytesCodec {
    fn lengths(field: &FieldDescriptor) -> Result<(usize, usize)> {
        let max = max_length(field)?;
        let min = field.options.min_length.unwrap_or(0);
        if min > max {
            return Err(DcclError::SchemaInvalid(format!(
                "field '{}': min_length exceeds max_length",
                field.name
            )));
        }
        Ok((min, max))
    }

    fn is_fixed(min: usize, max: usize) -> bool {
        min == max
    }
}

impl FieldCodec for BytesCodec {
    fn name(&self) -> &'static str {
        "_default_codec"
    }

    fn validate(&self, field: &FieldDescriptor) -> Result<()> {
        Self::lengths(field).map(|_| ())
    }

    fn min_size(&self, field: &FieldDescriptor) -> u32 {
        let Ok((min, max)) = Self::lengths(field) else {
            return 0;
        };
        if Self::is_fixed(min, max) {
            if field.is_optional() {
                1 // presence bit alone when absent
            } else {
                max as u32 * 8
            }
        } else {
            length_prefix_width(max, field.is_optional())
        }
    }

    fn max_size(&self, field: &FieldDescriptor) -> u32 {
        let Ok((min, max)) = Self::lengths(field) else {
            return 0;
        };
        if Self::is_fixed(min, max) {
            u32::from(field.is_optional()) + max as u32 * 8
        } else {
            length_prefix_width(max, field.is_optional()) + max as u32 * 8
        }
    }

    fn value_size(&self, field: &FieldDescriptor, value: Option<&FieldValue>) -> Result<u32> {
        let (min, max) = Self::lengths(field)?;
        match value {
            Some(FieldValue::Bytes(b)) => {
                if Self::is_fixed(min, max) {
                    Ok(u32::from(field.is_optional()) + max as u32 * 8)
                } else {
                    let len = b.len().min(max) as u32;
                    Ok(length_prefix_width(max, field.is_optional()) + len * 8)
                }
            }
            Some(_) => Err(DcclError::EncodeOutOfRange {
                field: field.name.clone(),
                detail: "expected a bytes value".to_string(),
            }),
            None if field.is_optional() => Ok(self.min_size(field)),
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
        let (min, max) = Self::lengths(field)?;
        let fixed = Self::is_fixed(min, max);
        match value {
            Some(FieldValue::Bytes(b)) => {
                if fixed {
                    if b.len() != max {
                        return Err(DcclError::EncodeOutOfRange {
                            field: field.name.clone(),
                            detail: format!("expected exactly {} bytes, got {}", max, b.len()),
                        });
                    }
                    if field.is_optional() {
                        bits.push_bits(1, 1).map_err(|e| e.into_encode())?;
                    }
                    bits.push_bytes(b).map_err(|e| e.into_encode())
                } else {
                    let mut data: &[u8] = b;
                    if data.len() > max {
                        #[cfg(feature = "logging")]
                        warn!(
                            "field '{}': {} bytes truncated to max_length {}",
                            field.name,
                            data.len(),
                            max
                        );
                        data = &data[..max];
                    }
                    let prefix = length_prefix_width(max, field.is_optional());
                    bits.push_bits(data.len() as u64, prefix)
                        .map_err(|e| e.into_encode())?;
                    bits.push_bytes(data).map_err(|e| e.into_encode())
                }
            }
            Some(_) => Err(DcclError::EncodeOutOfRange {
                field: field.name.clone(),
                detail: "expected a bytes value".to_string(),
            }),
            None if field.is_optional() => {
                if fixed {
                    bits.push_bits(0, 1).map_err(|e| e.into_encode())
                } else {
                    let prefix = length_prefix_width(max, true);
                    bits.push_bits(length_sentinel(max), prefix)
                        .map_err(|e| e.into_encode())
                }
            }
            None => Err(DcclError::PresenceError {
                field: field.name.clone(),
            }),
        }
    }

    fn decode(&self, field: &FieldDescriptor, bits: &mut BitBuffer) -> Result<Option<FieldValue>> {
        let (min, max) = Self::lengths(field)?;
        if Self::is_fixed(min, max) {
            if field.is_optional() {
                let present = bits.pop_bits(1).map_err(|e| e.into_decode(&field.name))?;
                if present == 0 {
                    return Ok(None);
                }
            }
            let data = bits
                .pop_bytes(max)
                .map_err(|e| e.into_decode(&field.name))?;
            Ok(Some(FieldValue::Bytes(data)))
        } else {
            let prefix = length_prefix_width(max, field.is_optional());
            let len = bits
                .pop_bits(prefix)
                .map_err(|e| e.into_decode(&field.name))?;
            if field.is_optional() && len >= length_sentinel(max) {
                return Ok(None);
            }
            if len > max as u64 {
                return Err(DcclError::DecodeOutOfRange {
                    field: field.name.clone(),
                    detail: format!("length {} exceeds max_length {}", len, max),
                });
            }
            let data = bits
                .pop_bytes(len as usize)
                .map_err(|e| e.into_decode(&field.name))?;
            Ok(Some(FieldValue::Bytes(data)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    #[test]
    fn test_string_prefix_width() {
        let codec = StringCodec::default();
        let field = Field::string("s").max_length(10).build();
        // 11 length states -> 4-bit prefix.
        assert_eq!(codec.min_size(&field), 4);
        assert_eq!(codec.max_size(&field), 4 + 80);

        let optional = Field::string("s").max_length(10).optional().build();
        assert_eq!(codec.min_size(&optional), 4); // 12 states still fit 4 bits
    }

    #[test]
    fn test_string_roundtrip() {
        let codec = StringCodec::default();
        let field = Field::string("s").max_length(10).build();
        let mut bits = BitBuffer::new(1024);
        codec
            .encode(&field, Some(&FieldValue::String("abc".into())), &mut bits)
            .unwrap();
        assert_eq!(bits.len(), 4 + 24);
        assert_eq!(
            codec.decode(&field, &mut bits).unwrap(),
            Some(FieldValue::String("abc".into()))
        );
    }

    #[test]
    fn test_string_truncated_to_max_length() {
        let codec = StringCodec::default();
        let field = Field::string("s").max_length(4).build();
        let mut bits = BitBuffer::new(1024);
        codec
            .encode(&field, Some(&FieldValue::String("abc123".into())), &mut bits)
            .unwrap();
        assert_eq!(
            codec.decode(&field, &mut bits).unwrap(),
            Some(FieldValue::String("abc1".into()))
        );
    }

    #[test]
    fn test_string_truncation_respects_utf8_boundary() {
        let codec = StringCodec::default();
        let field = Field::string("s").max_length(5).build();
        let mut bits = BitBuffer::new(1024);
        // "aé" is 3 bytes; "aééé" is 7 -> clips to 5 which splits é, backs off to 4.
        codec
            .encode(&field, Some(&FieldValue::String("aééé".into())), &mut bits)
            .unwrap();
        let decoded = codec.decode(&field, &mut bits).unwrap().unwrap();
        assert_eq!(decoded.as_str(), Some("aé"));
    }

    #[test]
    fn test_string_optional_absent() {
        let codec = StringCodec::default();
        let field = Field::string("s").max_length(10).optional().build();
        let mut bits = BitBuffer::new(64);
        codec.encode(&field, None, &mut bits).unwrap();
        assert_eq!(bits.len(), 4);
        assert_eq!(codec.decode(&field, &mut bits).unwrap(), None);
    }

    #[test]
    fn test_seven_bit_variant() {
        let codec = StringCodec::seven_bit();
        let field = Field::string("s").max_length(8).build();
        let mut bits = BitBuffer::new(1024);
        codec
            .encode(&field, Some(&FieldValue::String("HI".into())), &mut bits)
            .unwrap();
        // 4-bit prefix + 2 * 7 bits.
        assert_eq!(bits.len(), 4 + 14);
        assert_eq!(
            codec.decode(&field, &mut bits).unwrap(),
            Some(FieldValue::String("HI".into()))
        );

        let mut bits = BitBuffer::new(1024);
        assert!(codec
            .encode(&field, Some(&FieldValue::String("héllo".into())), &mut bits)
            .is_err());
    }

    #[test]
    fn test_missing_max_length_rejected() {
        let field = Field::string("s").build();
        assert!(StringCodec::default().validate(&field).is_err());
        let field = Field::bytes("b").max_length(0).build();
        assert!(BytesCodec.validate(&field).is_err());
    }

    #[test]
    fn test_fixed_bytes_no_prefix() {
        let codec = BytesCodec;
        let field = Field::bytes("digest").fixed_length(4).build();
        assert_eq!(codec.min_size(&field), 32);
        assert_eq!(codec.max_size(&field), 32);

        let mut bits = BitBuffer::new(1024);
        codec
            .encode(&field, Some(&FieldValue::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF])), &mut bits)
            .unwrap();
        assert_eq!(bits.len(), 32);
        assert_eq!(
            codec.decode(&field, &mut bits).unwrap(),
            Some(FieldValue::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]))
        );
    }

    #[test]
    fn test_fixed_bytes_wrong_length_fails() {
        let codec = BytesCodec;
        let field = Field::bytes("digest").fixed_length(4).build();
        let mut bits = BitBuffer::new(1024);
        assert!(matches!(
            codec.encode(&field, Some(&FieldValue::Bytes(vec![1, 2])), &mut bits),
            Err(DcclError::EncodeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_fixed_bytes_optional_presence_bit() {
        let codec = BytesCodec;
        let field = Field::bytes("digest").fixed_length(2).optional().build();
        assert_eq!(codec.min_size(&field), 1);
        assert_eq!(codec.max_size(&field), 17);

        let mut bits = BitBuffer::new(1024);
        codec.encode(&field, None, &mut bits).unwrap();
        assert_eq!(bits.len(), 1);
        assert_eq!(codec.decode(&field, &mut bits).unwrap(), None);

        let mut bits = BitBuffer::new(1024);
        codec
            .encode(&field, Some(&FieldValue::Bytes(vec![7, 8])), &mut bits)
            .unwrap();
        assert_eq!(bits.len(), 17);
        assert_eq!(
            codec.decode(&field, &mut bits).unwrap(),
            Some(FieldValue::Bytes(vec![7, 8]))
        );
    }

    #[test]
    fn test_variable_bytes_roundtrip() {
        let codec = BytesCodec;
        let field = Field::bytes("payload").max_length(9).build();
        let mut bits = BitBuffer::new(1024);
        codec
            .encode(&field, Some(&FieldValue::Bytes(vec![1, 2, 3])), &mut bits)
            .unwrap();
        // 10 length states -> 4-bit prefix, then 24 payload bits.
        assert_eq!(bits.len(), 4 + 24);
        assert_eq!(
            codec.decode(&field, &mut bits).unwrap(),
            Some(FieldValue::Bytes(vec![1, 2, 3]))
        );
    }
}
