// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Range-coded numeric codecs: integers, quantized floats, booleans.
//!
//! An integer declared over `[min, max]` spends
//! `ceil(log2(max - min + 1))` bits; an optional field adds one sentinel
//! state (`max - min + 1`) for absence. Floats quantize onto an integer
//! proxy at the declared decimal precision and reuse the same range
//! arithmetic.

use crate::bits::BitBuffer;
use crate::error::{DcclError, Result};
use crate::field_codec::{bits_for_states, FieldCodec};
use crate::schema::{FieldDescriptor, FieldType};
use crate::value::FieldValue;

fn out_of_range(field: &FieldDescriptor, detail: impl Into<String>) -> DcclError {
    DcclError::EncodeOutOfRange {
        field: field.name.clone(),
        detail: detail.into(),
    }
}

fn absent(field: &FieldDescriptor) -> DcclError {
    DcclError::PresenceError {
        field: field.name.clone(),
    }
}

// =======================================================================
// Integer codec
// =======================================================================

/// Declared integer range with precomputed span.
#[derive(Debug, Clone, Copy)]
struct IntRange {
    min: i64,
    max: i64,
    /// `max - min`; one less than the count of representable values.
    span: u64,
}

impl IntRange {
    fn from_field(field: &FieldDescriptor) -> Result<Self> {
        let schema_err = |msg: &str| {
            DcclError::SchemaInvalid(format!("field '{}': {}", field.name, msg))
        };
        let min = field.options.min.ok_or_else(|| schema_err("missing min"))?;
        let max = field.options.max.ok_or_else(|| schema_err("missing max"))?;
        if min > max {
            return Err(schema_err("min exceeds max"));
        }
        if let Some((lo, hi)) = field.ty.integer_bounds() {
            if min < lo || max > hi {
                return Err(schema_err("bounds exceed the declared integer width"));
            }
        }
        let span_wide = i128::from(max) - i128::from(min);
        let span = u64::try_from(span_wide)
            .ok()
            .filter(|s| *s <= u64::MAX - 2)
            .ok_or_else(|| schema_err("declared range too wide"))?;
        Ok(Self { min, max, span })
    }

    fn width(&self, optional: bool) -> u32 {
        bits_for_states(self.span + 1 + u64::from(optional))
    }

    /// Sentinel raw value meaning "not present" (optional fields only).
    fn sentinel(&self) -> u64 {
        self.span + 1
    }
}

fn int_from_value(field: &FieldDescriptor, value: &FieldValue) -> Result<i64> {
    match (&field.ty, value) {
        (FieldType::Int32, FieldValue::Int32(v)) => Ok(i64::from(*v)),
        (FieldType::Int64, FieldValue::Int64(v)) => Ok(*v),
        (FieldType::UInt32, FieldValue::UInt32(v)) => Ok(i64::from(*v)),
        (FieldType::UInt64, FieldValue::UInt64(v)) => i64::try_from(*v)
            .map_err(|_| out_of_range(field, "value exceeds the supported range")),
        _ => Err(out_of_range(
            field,
            format!("expected a {} value", field.ty.kind().as_str()),
        )),
    }
}

fn int_to_value(field: &FieldDescriptor, v: i64) -> FieldValue {
    match field.ty {
        FieldType::Int32 => FieldValue::Int32(v as i32),
        FieldType::Int64 => FieldValue::Int64(v),
        FieldType::UInt32 => FieldValue::UInt32(v as u32),
        FieldType::UInt64 => FieldValue::UInt64(v as u64),
        // Binding is keyed by type kind, so only integer kinds reach here.
        _ => FieldValue::Int64(v),
    }
}

/// Default codec for the integer field types.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerCodec;

impl FieldCodec for IntegerCodec {
    fn name(&self) -> &'static str {
        "_default_codec"
    }

    fn validate(&self, field: &FieldDescriptor) -> Result<()> {
        IntRange::from_field(field).map(|_| ())
    }

    fn min_size(&self, field: &FieldDescriptor) -> u32 {
        self.max_size(field)
    }

    fn max_size(&self, field: &FieldDescriptor) -> u32 {
        // Validation already ran at load; a malformed field reports zero.
        IntRange::from_field(field)
            .map(|r| r.width(field.is_optional()))
            .unwrap_or(0)
    }

    fn value_size(&self, field: &FieldDescriptor, value: Option<&FieldValue>) -> Result<u32> {
        if value.is_none() && !field.is_optional() {
            return Err(absent(field));
        }
        Ok(self.max_size(field))
    }

    fn encode(
        &self,
        field: &FieldDescriptor,
        value: Option<&FieldValue>,
        bits: &mut BitBuffer,
    ) -> Result<()> {
        let range = IntRange::from_field(field)?;
        let width = range.width(field.is_optional());
        let raw = match value {
            Some(v) => {
                let v = int_from_value(field, v)?;
                if v < range.min || v > range.max {
                    return Err(out_of_range(
                        field,
                        format!("{} outside [{}, {}]", v, range.min, range.max),
                    ));
                }
                (i128::from(v) - i128::from(range.min)) as u64
            }
            None if field.is_optional() => range.sentinel(),
            None => return Err(absent(field)),
        };
        bits.push_bits(raw, width).map_err(|e| e.into_encode())
    }

    fn decode(&self, field: &FieldDescriptor, bits: &mut BitBuffer) -> Result<Option<FieldValue>> {
        let range = IntRange::from_field(field)?;
        let width = range.width(field.is_optional());
        let raw = bits
            .pop_bits(width)
            .map_err(|e| e.into_decode(&field.name))?;
        if field.is_optional() && raw >= range.sentinel() {
            return Ok(None);
        }
        // The read value is unconditionally valid; corrupt excess clamps
        // to the declared maximum.
        let v = (i128::from(range.min) + i128::from(raw)).min(i128::from(range.max)) as i64;
        Ok(Some(int_to_value(field, v)))
    }
}

// =======================================================================
// Float codec
// =======================================================================

/// Declared floating range quantized to `precision` decimal digits.
#[derive(Debug, Clone, Copy)]
struct FloatRange {
    min: f64,
    scale: f64,
    /// Quantized span: `round((max - min) * 10^precision)`.
    span: u64,
}

impl FloatRange {
    fn from_field(field: &FieldDescriptor) -> Result<Self> {
        let schema_err = |msg: &str| {
            DcclError::SchemaInvalid(format!("field '{}': {}", field.name, msg))
        };
        let min = field
            .options
            .min_float
            .ok_or_else(|| schema_err("missing min"))?;
        let max = field
            .options
            .max_float
            .ok_or_else(|| schema_err("missing max"))?;
        if !min.is_finite() || !max.is_finite() {
            return Err(schema_err("bounds must be finite"));
        }
        if min > max {
            return Err(schema_err("min exceeds max"));
        }
        let precision = field.options.precision.unwrap_or(0);
        if precision > 15 {
            return Err(schema_err("precision above 15 digits is unsupported"));
        }
        let scale = 10f64.powi(precision as i32);
        let span_f = ((max - min) * scale).round();
        if span_f >= (u64::MAX - 2) as f64 {
            return Err(schema_err("quantized range too wide"));
        }
        Ok(Self {
            min,
            scale,
            span: span_f as u64,
        })
    }

    fn width(&self, optional: bool) -> u32 {
        bits_for_states(self.span + 1 + u64::from(optional))
    }

    fn sentinel(&self) -> u64 {
        self.span + 1
    }
}

fn float_from_value(field: &FieldDescriptor, value: &FieldValue) -> Result<f64> {
    match (&field.ty, value) {
        (FieldType::Float, FieldValue::Float(v)) => Ok(f64::from(*v)),
        (FieldType::Double, FieldValue::Double(v)) => Ok(*v),
        _ => Err(out_of_range(
            field,
            format!("expected a {} value", field.ty.kind().as_str()),
        )),
    }
}

fn float_to_value(field: &FieldDescriptor, v: f64) -> FieldValue {
    match field.ty {
        FieldType::Float => FieldValue::Float(v as f32),
        _ => FieldValue::Double(v),
    }
}

/// Default codec for the floating field types (precision-quantized).
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatCodec;

impl FieldCodec for FloatCodec {
    fn name(&self) -> &'static str {
        "_default_codec"
    }

    fn validate(&self, field: &FieldDescriptor) -> Result<()> {
        FloatRange::from_field(field).map(|_| ())
    }

    fn min_size(&self, field: &FieldDescriptor) -> u32 {
        self.max_size(field)
    }

    fn max_size(&self, field: &FieldDescriptor) -> u32 {
        FloatRange::from_field(field)
            .map(|r| r.width(field.is_optional()))
            .unwrap_or(0)
    }

    fn value_size(&self, field: &FieldDescriptor, value: Option<&FieldValue>) -> Result<u32> {
        if value.is_none() && !field.is_optional() {
            return Err(absent(field));
        }
        Ok(self.max_size(field))
    }

    fn encode(
        &self,
        field: &FieldDescriptor,
        value: Option<&FieldValue>,
        bits: &mut BitBuffer,
    ) -> Result<()> {
        let range = FloatRange::from_field(field)?;
        let width = range.width(field.is_optional());
        let raw = match value {
            Some(v) => {
                let v = float_from_value(field, v)?;
                if v.is_nan() {
                    if field.is_optional() {
                        range.sentinel()
                    } else {
                        return Err(out_of_range(field, "NaN in a required field"));
                    }
                } else {
                    let q = ((v - range.min) * range.scale).round();
                    if q < 0.0 || q > range.span as f64 {
                        return Err(out_of_range(
                            field,
                            format!("{} outside the declared range", v),
                        ));
                    }
                    q as u64
                }
            }
            None if field.is_optional() => range.sentinel(),
            None => return Err(absent(field)),
        };
        bits.push_bits(raw, width).map_err(|e| e.into_encode())
    }

    fn decode(&self, field: &FieldDescriptor, bits: &mut BitBuffer) -> Result<Option<FieldValue>> {
        let range = FloatRange::from_field(field)?;
        let width = range.width(field.is_optional());
        let raw = bits
            .pop_bits(width)
            .map_err(|e| e.into_decode(&field.name))?;
        if field.is_optional() && raw >= range.sentinel() {
            return Ok(None);
        }
        let raw = raw.min(range.span);
        let v = range.min + (raw as f64) / range.scale;
        Ok(Some(float_to_value(field, v)))
    }
}

// =======================================================================
// Bool codec
// =======================================================================

/// Default boolean codec: one bit required, two bits optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCodec;

const BOOL_ABSENT: u64 = 2;

impl FieldCodec for BoolCodec {
    fn name(&self) -> &'static str {
        "_default_codec"
    }

    fn validate(&self, _field: &FieldDescriptor) -> Result<()> {
        Ok(())
    }

    fn min_size(&self, field: &FieldDescriptor) -> u32 {
        self.max_size(field)
    }

    fn max_size(&self, field: &FieldDescriptor) -> u32 {
        if field.is_optional() {
            2
        } else {
            1
        }
    }

    fn value_size(&self, field: &FieldDescriptor, value: Option<&FieldValue>) -> Result<u32> {
        if value.is_none() && !field.is_optional() {
            return Err(absent(field));
        }
        Ok(self.max_size(field))
    }

    fn encode(
        &self,
        field: &FieldDescriptor,
        value: Option<&FieldValue>,
        bits: &mut BitBuffer,
    ) -> Result<()> {
        let width = self.max_size(field);
        let raw = match value {
            Some(FieldValue::Bool(v)) => u64::from(*v),
            Some(_) => return Err(out_of_range(field, "expected a bool value")),
            None if field.is_optional() => BOOL_ABSENT,
            None => return Err(absent(field)),
        };
        bits.push_bits(raw, width).map_err(|e| e.into_encode())
    }

    fn decode(&self, field: &FieldDescriptor, bits: &mut BitBuffer) -> Result<Option<FieldValue>> {
        let width = self.max_size(field);
        let raw = bits
            .pop_bits(width)
            .map_err(|e| e.into_decode(&field.name))?;
        match raw {
            0 => Ok(Some(FieldValue::Bool(false))),
            1 => Ok(Some(FieldValue::Bool(true))),
            BOOL_ABSENT => Ok(None),
            other => Err(DcclError::DecodeOutOfRange {
                field: field.name.clone(),
                detail: format!("bool state {} has no mapping", other),
            }),
        }
    }
}
