// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime schema descriptors.
//!
//! A [`MessageDescriptor`] is the reflection surface the codec framework
//! walks: an ordered list of fields, each carrying a declared type, a
//! repetition label and the options the bound codec consumes. Descriptors
//! are built once (see [`builder`]) and shared behind `Arc`; compiled plans
//! and bound codecs hold non-owning references into them.

mod builder;

pub use builder::{EnumBuilder, Field, MessageBuilder};

use crate::config::DEFAULT_CODEC_NAME;
use std::sync::Arc;

/// Declared primitive type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    Bool,
    String,
    Bytes,
    /// Enumeration with declared values.
    Enum(Arc<EnumDescriptor>),
    /// Embedded sub-message.
    Message(Arc<MessageDescriptor>),
}

impl FieldType {
    /// Flat kind of this type, used as a registry key.
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Int32 => TypeKind::Int32,
            Self::Int64 => TypeKind::Int64,
            Self::UInt32 => TypeKind::UInt32,
            Self::UInt64 => TypeKind::UInt64,
            Self::Float => TypeKind::Float,
            Self::Double => TypeKind::Double,
            Self::Bool => TypeKind::Bool,
            Self::String => TypeKind::String,
            Self::Bytes => TypeKind::Bytes,
            Self::Enum(_) => TypeKind::Enum,
            Self::Message(_) => TypeKind::Message,
        }
    }

    /// True for the integer kinds.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int32 | Self::Int64 | Self::UInt32 | Self::UInt64
        )
    }

    /// Natural range of the integer kinds, `None` otherwise.
    pub fn integer_bounds(&self) -> Option<(i64, i64)> {
        match self {
            Self::Int32 => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            Self::Int64 => Some((i64::MIN, i64::MAX)),
            Self::UInt32 => Some((0, i64::from(u32::MAX))),
            // The codec range arithmetic is i64; u64 values above i64::MAX
            // cannot be declared as bounds.
            Self::UInt64 => Some((0, i64::MAX)),
            _ => None,
        }
    }
}

/// Field type kind without payload; hashable registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    Bool,
    String,
    Bytes,
    Enum,
    Message,
}

impl TypeKind {
    /// Lowercase name for diagnostics and `info` tables.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Enum => "enum",
            Self::Message => "message",
        }
    }
}

/// Repetition label of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// Must be present at encode.
    Required,
    /// May be absent; absence is encoded via the codec's sentinel machinery.
    Optional,
    /// Zero or more values, bounded by `max_repeat`.
    Repeated,
}

/// Declared options a codec consumes.
///
/// Which options are mandatory depends on the bound codec: the default
/// numeric codecs require bounds, the string/bytes codecs require
/// `max_length`, repeated fields require `max_repeat`. Validation happens
/// once at `load`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
    /// Inclusive lower bound (integer fields).
    pub min: Option<i64>,
    /// Inclusive upper bound (integer fields).
    pub max: Option<i64>,
    /// Inclusive lower bound (floating fields).
    pub min_float: Option<f64>,
    /// Inclusive upper bound (floating fields).
    pub max_float: Option<f64>,
    /// Decimal digits retained by the float codec.
    pub precision: Option<u32>,
    /// Upper bound on string/bytes length, in bytes.
    pub max_length: Option<usize>,
    /// Lower bound on bytes length; equal to `max_length` selects the
    /// fixed-length (prefix-free) bytes layout.
    pub min_length: Option<usize>,
    /// Upper bound on repeated cardinality.
    pub max_repeat: Option<usize>,
    /// Name of a registered codec variant; `_default_codec` when absent.
    pub codec: Option<String>,
    /// Field belongs in the fixed header rather than the body.
    pub in_head: bool,
}

/// A single field of a message schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name, unique within its message.
    pub name: String,
    /// Declared type.
    pub ty: FieldType,
    /// Repetition label.
    pub label: Label,
    /// Declared options.
    pub options: FieldOptions,
}

impl FieldDescriptor {
    /// Create a field with empty options.
    pub fn new(name: impl Into<String>, ty: FieldType, label: Label) -> Self {
        Self {
            name: name.into(),
            ty,
            label,
            options: FieldOptions::default(),
        }
    }

    /// True when the label is [`Label::Optional`].
    pub fn is_optional(&self) -> bool {
        self.label == Label::Optional
    }

    /// True when the label is [`Label::Repeated`].
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }

    /// Codec name selecting the bound codec variant.
    pub fn codec_name(&self) -> &str {
        self.options.codec.as_deref().unwrap_or(DEFAULT_CODEC_NAME)
    }
}

/// A complete message schema.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDescriptor {
    /// Message name, used for diagnostics and id-collision checks.
    pub name: String,
    /// Wire identifier; must fit the 9-bit header slot. Zero for embedded
    /// messages, which never appear on the wire by themselves.
    pub id: u32,
    /// Per-message byte cap; the effective cap is the minimum of this and
    /// the configured global cap.
    pub max_bytes: Option<usize>,
    /// Fields in declared (wire) order.
    pub fields: Vec<FieldDescriptor>,
}

impl MessageDescriptor {
    /// Create a top-level message schema.
    pub fn new(name: impl Into<String>, id: u32, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            id,
            max_bytes: None,
            fields,
        }
    }

    /// Create an embedded message schema (no wire id of its own).
    pub fn embedded(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, 0, fields)
    }

    /// Get a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get a field index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Enumeration type: declared values in declared order.
///
/// The wire encoding is the declared *index*, not the numeric tag, so the
/// declared order is part of the wire contract.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    /// Enum name.
    pub name: String,
    /// Values in declared order.
    pub values: Vec<EnumValue>,
}

impl EnumDescriptor {
    /// Create an enum descriptor.
    pub fn new(name: impl Into<String>, values: Vec<EnumValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Get a value by name.
    pub fn value(&self, name: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.name == name)
    }

    /// Get a value by numeric tag.
    pub fn value_by_number(&self, number: i64) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.number == number)
    }

    /// Declared index of the value with the given numeric tag.
    pub fn index_of(&self, number: i64) -> Option<usize> {
        self.values.iter().position(|v| v.number == number)
    }
}

/// A single declared enum value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    /// Value name.
    pub name: String,
    /// Numeric tag (not encoded on the wire).
    pub number: i64,
}

impl EnumValue {
    /// Create an enum value.
    pub fn new(name: impl Into<String>, number: i64) -> Self {
        Self {
            name: name.into(),
            number,
        }
    }
}
