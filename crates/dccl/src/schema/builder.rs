// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builders for message and enum descriptors.

use crate::schema::{
    EnumDescriptor, EnumValue, FieldDescriptor, FieldType, Label, MessageDescriptor,
};
use std::sync::Arc;

/// Builder for [`MessageDescriptor`].
///
/// # Example
///
/// ```
/// use dccl::schema::{Field, MessageBuilder};
///
/// let desc = MessageBuilder::new("NavReport", 12)
///     .max_bytes(32)
///     .field(Field::double("lat").bounds_f(-90.0, 90.0).precision(4))
///     .field(Field::double("lon").bounds_f(-180.0, 180.0).precision(4))
///     .field(Field::uint32("depth").bounds(0, 6000).optional())
///     .build();
/// assert_eq!(desc.fields.len(), 3);
/// ```
#[derive(Debug)]
pub struct MessageBuilder {
    name: String,
    id: u32,
    max_bytes: Option<usize>,
    fields: Vec<FieldDescriptor>,
}

impl MessageBuilder {
    /// Start a top-level message with its wire id.
    pub fn new(name: impl Into<String>, id: u32) -> Self {
        Self {
            name: name.into(),
            id,
            max_bytes: None,
            fields: Vec::new(),
        }
    }

    /// Start an embedded message (no wire id of its own).
    pub fn embedded(name: impl Into<String>) -> Self {
        Self::new(name, 0)
    }

    /// Set the per-message byte cap.
    pub fn max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    /// Append a field in declared (wire) order.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field.build());
        self
    }

    /// Build the descriptor, ready to share behind `Arc`.
    pub fn build(self) -> Arc<MessageDescriptor> {
        let mut desc = MessageDescriptor::new(self.name, self.id, self.fields);
        desc.max_bytes = self.max_bytes;
        Arc::new(desc)
    }
}

/// Builder for a single field, consumed by [`MessageBuilder::field`].
#[derive(Debug)]
pub struct Field {
    inner: FieldDescriptor,
}

impl Field {
    fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            inner: FieldDescriptor::new(name, ty, Label::Required),
        }
    }

    /// Signed 32-bit integer field.
    pub fn int32(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Int32)
    }

    /// Signed 64-bit integer field.
    pub fn int64(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Int64)
    }

    /// Unsigned 32-bit integer field.
    pub fn uint32(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::UInt32)
    }

    /// Unsigned 64-bit integer field.
    pub fn uint64(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::UInt64)
    }

    /// Single-precision float field.
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Float)
    }

    /// Double-precision float field.
    pub fn double(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Double)
    }

    /// Boolean field.
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Bool)
    }

    /// String field; set [`max_length`](Self::max_length).
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    /// Byte-string field; set [`max_length`](Self::max_length).
    pub fn bytes(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Bytes)
    }

    /// Enumeration field.
    pub fn enumeration(name: impl Into<String>, desc: Arc<EnumDescriptor>) -> Self {
        Self::new(name, FieldType::Enum(desc))
    }

    /// Embedded sub-message field.
    pub fn message(name: impl Into<String>, desc: Arc<MessageDescriptor>) -> Self {
        Self::new(name, FieldType::Message(desc))
    }

    /// Declared integer range, inclusive.
    pub fn bounds(mut self, min: i64, max: i64) -> Self {
        self.inner.options.min = Some(min);
        self.inner.options.max = Some(max);
        self
    }

    /// Declared floating range, inclusive.
    pub fn bounds_f(mut self, min: f64, max: f64) -> Self {
        self.inner.options.min_float = Some(min);
        self.inner.options.max_float = Some(max);
        self
    }

    /// Decimal digits retained by the float codec.
    pub fn precision(mut self, digits: u32) -> Self {
        self.inner.options.precision = Some(digits);
        self
    }

    /// Upper bound on string/bytes length, in bytes.
    pub fn max_length(mut self, len: usize) -> Self {
        self.inner.options.max_length = Some(len);
        self
    }

    /// Lower bound on bytes length.
    pub fn min_length(mut self, len: usize) -> Self {
        self.inner.options.min_length = Some(len);
        self
    }

    /// Exact bytes length: selects the prefix-free fixed layout.
    pub fn fixed_length(mut self, len: usize) -> Self {
        self.inner.options.min_length = Some(len);
        self.inner.options.max_length = Some(len);
        self
    }

    /// Mark optional.
    pub fn optional(mut self) -> Self {
        self.inner.label = Label::Optional;
        self
    }

    /// Mark repeated with the given cardinality bound.
    pub fn repeated(mut self, max_repeat: usize) -> Self {
        self.inner.label = Label::Repeated;
        self.inner.options.max_repeat = Some(max_repeat);
        self
    }

    /// Select a registered codec variant by name.
    pub fn codec(mut self, name: impl Into<String>) -> Self {
        self.inner.options.codec = Some(name.into());
        self
    }

    /// Place this field in the fixed header instead of the body.
    ///
    /// The field name selects the header slot (`time`/`_time`,
    /// `src_id`/`_src_id`, ...).
    pub fn in_head(mut self) -> Self {
        self.inner.options.in_head = true;
        self
    }

    /// Finish the field.
    pub fn build(self) -> FieldDescriptor {
        self.inner
    }
}

/// Builder for [`EnumDescriptor`].
///
/// # Example
///
/// ```
/// use dccl::schema::EnumBuilder;
///
/// let mode = EnumBuilder::new("Mode")
///     .value("MODE_IDLE")
///     .value("MODE_SURVEY")
///     .value_number("MODE_ABORT", 99)
///     .build();
/// assert_eq!(mode.values.len(), 3);
/// ```
#[derive(Debug)]
pub struct EnumBuilder {
    name: String,
    values: Vec<EnumValue>,
    next_number: i64,
}

impl EnumBuilder {
    /// Create a new enum builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            next_number: 0,
        }
    }

    /// Add a value with an auto-incrementing numeric tag.
    pub fn value(mut self, name: impl Into<String>) -> Self {
        self.values.push(EnumValue::new(name, self.next_number));
        self.next_number += 1;
        self
    }

    /// Add a value with an explicit numeric tag.
    pub fn value_number(mut self, name: impl Into<String>, number: i64) -> Self {
        self.values.push(EnumValue::new(name, number));
        self.next_number = number + 1;
        self
    }

    /// Build the descriptor, ready to share behind `Arc`.
    pub fn build(self) -> Arc<EnumDescriptor> {
        Arc::new(EnumDescriptor::new(self.name, self.values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeKind;

    #[test]
    fn test_message_builder_preserves_order() {
        let desc = MessageBuilder::new("Test", 3)
            .field(Field::int32("a").bounds(0, 10))
            .field(Field::string("b").max_length(8).optional())
            .field(Field::bool("c"))
            .build();

        let names: Vec<&str> = desc.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(desc.id, 3);
    }

    #[test]
    fn test_field_options_land() {
        let field = Field::double("lat")
            .bounds_f(-90.0, 90.0)
            .precision(4)
            .optional()
            .build();
        assert_eq!(field.options.min_float, Some(-90.0));
        assert_eq!(field.options.precision, Some(4));
        assert_eq!(field.label, Label::Optional);
    }

    #[test]
    fn test_repeated_sets_max_repeat() {
        let field = Field::string("names").max_length(10).repeated(4).build();
        assert_eq!(field.label, Label::Repeated);
        assert_eq!(field.options.max_repeat, Some(4));
    }

    #[test]
    fn test_fixed_length_bytes() {
        let field = Field::bytes("digest").fixed_length(16).build();
        assert_eq!(field.options.min_length, Some(16));
        assert_eq!(field.options.max_length, Some(16));
        assert_eq!(field.ty.kind(), TypeKind::Bytes);
    }

    #[test]
    fn test_enum_builder_auto_numbers() {
        let desc = EnumBuilder::new("Color")
            .value("RED")
            .value("GREEN")
            .value_number("BLUE", 10)
            .value("MAGENTA")
            .build();
        let numbers: Vec<i64> = desc.values.iter().map(|v| v.number).collect();
        assert_eq!(numbers, vec![0, 1, 10, 11]);
    }
}
