// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Repeated-field wrapper codec.
//!
//! Wraps any element codec: a count prefix of
//! `ceil(log2(max_repeat + 1))` bits, then exactly `count` elements
//! encoded as required singles. An empty or absent list encodes count
//! zero and decodes back to "not present".

use crate::bits::BitBuffer;
use crate::error::{DcclError, Result};
use crate::field_codec::{bits_for_states, CodecRegistry, FieldCodec};
use crate::schema::FieldDescriptor;
use crate::value::FieldValue;

#[cfg(feature = "logging")]
use crate::warn;

/// Wrapper driving a per-element codec over a bounded list.
pub struct RepeatedCodec {
    element: Box<dyn FieldCodec>,
}

impl RepeatedCodec {
    /// Wrap an element codec.
    pub fn new(element: Box<dyn FieldCodec>) -> Self {
        Self { element }
    }

    fn max_repeat(field: &FieldDescriptor) -> Result<usize> {
        match field.options.max_repeat {
            Some(n) if n > 0 => Ok(n),
            Some(_) => Err(DcclError::SchemaInvalid(format!(
                "field '{}': max_repeat must be positive",
                field.name
            ))),
            None => Err(DcclError::SchemaInvalid(format!(
                "field '{}': missing max_repeat",
                field.name
            ))),
        }
    }

    fn prefix_width(max_repeat: usize) -> u32 {
        bits_for_states(max_repeat as u64 + 1)
    }

    fn items<'a>(
        field: &FieldDescriptor,
        value: Option<&'a FieldValue>,
    ) -> Result<&'a [FieldValue]> {
        match value {
            None => Ok(&[]),
            Some(FieldValue::List(items)) => Ok(items),
            Some(_) => Err(DcclError::EncodeOutOfRange {
                field: field.name.clone(),
                detail: "expected a repeated value".to_string(),
            }),
        }
    }
}

impl FieldCodec for RepeatedCodec {
    fn name(&self) -> &'static str {
        self.element.name()
    }

    fn bind(&mut self, field: &FieldDescriptor, registry: &CodecRegistry) -> Result<()> {
        self.element.bind(field, registry)
    }

    fn validate(&self, field: &FieldDescriptor) -> Result<()> {
        Self::max_repeat(field)?;
        self.element.validate(field)
    }

    fn min_size(&self, field: &FieldDescriptor) -> u32 {
        Self::max_repeat(field).map(Self::prefix_width).unwrap_or(0)
    }

    fn max_size(&self, field: &FieldDescriptor) -> u32 {
        let Ok(max_repeat) = Self::max_repeat(field) else {
            return 0;
        };
        Self::prefix_width(max_repeat) + max_repeat as u32 * self.element.max_size(field)
    }

    fn value_size(&self, field: &FieldDescriptor, value: Option<&FieldValue>) -> Result<u32> {
        let max_repeat = Self::max_repeat(field)?;
        let items = Self::items(field, value)?;
        let count = items.len().min(max_repeat);
        let mut total = Self::prefix_width(max_repeat);
        for item in &items[..count] {
            total += self.element.value_size(field, Some(item))?;
        }
        Ok(total)
    }

    fn encode(
        &self,
        field: &FieldDescriptor,
        value: Option<&FieldValue>,
        bits: &mut BitBuffer,
    ) -> Result<()> {
        let max_repeat = Self::max_repeat(field)?;
        let mut items = Self::items(field, value)?;
        if items.len() > max_repeat {
            #[cfg(feature = "logging")]
            warn!(
                "field '{}': {} repeated values truncated to max_repeat {}",
                field.name,
                items.len(),
                max_repeat
            );
            items = &items[..max_repeat];
        }
        bits.push_bits(items.len() as u64, Self::prefix_width(max_repeat))
            .map_err(|e| e.into_encode())?;
        for item in items {
            self.element.encode(field, Some(item), bits)?;
        }
        Ok(())
    }

    fn decode(&self, field: &FieldDescriptor, bits: &mut BitBuffer) -> Result<Option<FieldValue>> {
        let max_repeat = Self::max_repeat(field)?;
        let count = bits
            .pop_bits(Self::prefix_width(max_repeat))
            .map_err(|e| e.into_decode(&field.name))?;
        if count > max_repeat as u64 {
            return Err(DcclError::DecodeOutOfRange {
                field: field.name.clone(),
                detail: format!("count {} exceeds max_repeat {}", count, max_repeat),
            });
        }
        if count == 0 {
            return Ok(None);
        }
        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let item = self.element.decode(field, bits)?.ok_or_else(|| {
                DcclError::DecodeOutOfRange {
                    field: field.name.clone(),
                    detail: "absent element inside a repeated field".to_string(),
                }
            })?;
            items.push(item);
        }
        Ok(Some(FieldValue::List(items)))
    }
}
