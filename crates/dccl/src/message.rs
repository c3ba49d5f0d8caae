// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message container for runtime-typed field values.

use crate::schema::{FieldType, MessageDescriptor};
use crate::value::FieldValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Errors for [`Message`] container operations.
#[derive(Debug)]
pub enum MessageError {
    FieldNotFound(String),
    TypeMismatch { field: String, expected: String },
    NotRepeated(String),
    UnknownEnumValue { field: String, value: String },
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldNotFound(name) => write!(f, "Field not found: {}", name),
            Self::TypeMismatch { field, expected } => {
                write!(f, "Field '{}' expects a {} value", field, expected)
            }
            Self::NotRepeated(name) => write!(f, "Field '{}' is not repeated", name),
            Self::UnknownEnumValue { field, value } => {
                write!(f, "Field '{}' has no enum value named '{}'", field, value)
            }
        }
    }
}

impl std::error::Error for MessageError {}

/// A populated (or partially populated) message.
///
/// Field values live in a name-keyed map; a missing key IS the
/// "not present" state, so optional absence never needs a value variant.
///
/// # Example
///
/// ```
/// use dccl::schema::{Field, MessageBuilder};
/// use dccl::Message;
///
/// let desc = MessageBuilder::new("Ping", 1)
///     .field(Field::uint32("seq").bounds(0, 1000))
///     .build();
///
/// let mut msg = Message::new(&desc);
/// msg.set("seq", 42u32).unwrap();
/// assert_eq!(msg.get::<u32>("seq").unwrap(), 42);
/// assert!(!msg.has("missing"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    descriptor: Arc<MessageDescriptor>,
    fields: HashMap<String, FieldValue>,
}

impl Message {
    /// Create an empty message for the given schema.
    pub fn new(descriptor: &Arc<MessageDescriptor>) -> Self {
        Self {
            descriptor: descriptor.clone(),
            fields: HashMap::new(),
        }
    }

    /// Get the schema descriptor.
    pub fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    /// Set a single-valued field, type-checked against the schema.
    pub fn set<T: Into<FieldValue>>(&mut self, name: &str, value: T) -> Result<(), MessageError> {
        let value = value.into();
        let field = self
            .descriptor
            .field(name)
            .ok_or_else(|| MessageError::FieldNotFound(name.to_string()))?;
        if !value_matches(&field.ty, &value) {
            return Err(MessageError::TypeMismatch {
                field: name.to_string(),
                expected: field.ty.kind().as_str().to_string(),
            });
        }
        self.fields.insert(name.to_string(), value);
        Ok(())
    }

    /// Set an enum field by declared value name.
    pub fn set_enum(&mut self, name: &str, value_name: &str) -> Result<(), MessageError> {
        let field = self
            .descriptor
            .field(name)
            .ok_or_else(|| MessageError::FieldNotFound(name.to_string()))?;
        let FieldType::Enum(ref desc) = field.ty else {
            return Err(MessageError::TypeMismatch {
                field: name.to_string(),
                expected: "enum".to_string(),
            });
        };
        let value = desc
            .value(value_name)
            .ok_or_else(|| MessageError::UnknownEnumValue {
                field: name.to_string(),
                value: value_name.to_string(),
            })?;
        self.fields.insert(
            name.to_string(),
            FieldValue::Enum(value.number, value.name.clone()),
        );
        Ok(())
    }

    /// Append a value to a repeated field.
    pub fn push<T: Into<FieldValue>>(&mut self, name: &str, value: T) -> Result<(), MessageError> {
        let value = value.into();
        let field = self
            .descriptor
            .field(name)
            .ok_or_else(|| MessageError::FieldNotFound(name.to_string()))?;
        if !field.is_repeated() {
            return Err(MessageError::NotRepeated(name.to_string()));
        }
        if !value_matches(&field.ty, &value) {
            return Err(MessageError::TypeMismatch {
                field: name.to_string(),
                expected: field.ty.kind().as_str().to_string(),
            });
        }
        match self
            .fields
            .entry(name.to_string())
            .or_insert_with(|| FieldValue::List(Vec::new()))
        {
            FieldValue::List(items) => items.push(value),
            // A repeated field only ever holds a List.
            _ => return Err(MessageError::NotRepeated(name.to_string())),
        }
        Ok(())
    }

    /// Get a field value, converted to a plain Rust type.
    pub fn get<T: FromFieldValue>(&self, name: &str) -> Result<T, MessageError> {
        let value = self
            .fields
            .get(name)
            .ok_or_else(|| MessageError::FieldNotFound(name.to_string()))?;
        T::from_field_value(value).ok_or_else(|| MessageError::TypeMismatch {
            field: name.to_string(),
            expected: std::any::type_name::<T>().to_string(),
        })
    }

    /// Get a field's raw value, `None` when absent.
    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// True when the field is present.
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Remove a field value (mark it absent).
    pub fn clear(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Insert a raw value without schema checks.
    ///
    /// Used by the decode path, which produces values already shaped by the
    /// bound codecs.
    pub(crate) fn insert_raw(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }
}

/// Check a value variant against a declared field type.
///
/// For repeated fields the caller passes each element; a `List` matches
/// when all of its elements match.
pub(crate) fn value_matches(ty: &FieldType, value: &FieldValue) -> bool {
    match (ty, value) {
        (_, FieldValue::List(items)) => items.iter().all(|v| value_matches(ty, v)),
        (FieldType::Bool, FieldValue::Bool(_)) => true,
        (FieldType::Int32, FieldValue::Int32(_)) => true,
        (FieldType::Int64, FieldValue::Int64(_)) => true,
        (FieldType::UInt32, FieldValue::UInt32(_)) => true,
        (FieldType::UInt64, FieldValue::UInt64(_)) => true,
        (FieldType::Float, FieldValue::Float(_)) => true,
        (FieldType::Double, FieldValue::Double(_)) => true,
        (FieldType::String, FieldValue::String(_)) => true,
        (FieldType::Bytes, FieldValue::Bytes(_)) => true,
        (FieldType::Enum(desc), FieldValue::Enum(number, _)) => {
            desc.value_by_number(*number).is_some()
        }
        (FieldType::Message(desc), FieldValue::Message(msg)) => {
            msg.descriptor().name == desc.name
        }
        _ => false,
    }
}

/// Conversion out of a [`FieldValue`], used by [`Message::get`].
pub trait FromFieldValue: Sized {
    /// Extract a typed value; `None` on variant mismatch.
    fn from_field_value(value: &FieldValue) -> Option<Self>;
}

macro_rules! impl_from_field_value {
    ($ty:ty, $accessor:ident) => {
        impl FromFieldValue for $ty {
            fn from_field_value(value: &FieldValue) -> Option<Self> {
                value.$accessor()
            }
        }
    };
}

impl_from_field_value!(bool, as_bool);
impl_from_field_value!(i32, as_i32);
impl_from_field_value!(i64, as_i64);
impl_from_field_value!(u32, as_u32);
impl_from_field_value!(u64, as_u64);
impl_from_field_value!(f32, as_f32);
impl_from_field_value!(f64, as_f64);

impl FromFieldValue for String {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromFieldValue for Vec<u8> {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_bytes().map(<[u8]>::to_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumBuilder, Field, MessageBuilder};

    fn test_descriptor() -> Arc<MessageDescriptor> {
        let mode = EnumBuilder::new("Mode")
            .value("MODE_IDLE")
            .value("MODE_SURVEY")
            .build();
        MessageBuilder::new("Test", 9)
            .field(Field::uint32("depth").bounds(0, 6000))
            .field(Field::string("note").max_length(16).optional())
            .field(Field::int32("samples").bounds(-100, 100).repeated(5))
            .field(Field::enumeration("mode", mode).optional())
            .build()
    }

    #[test]
    fn test_set_get_roundtrip() {
        let desc = test_descriptor();
        let mut msg = Message::new(&desc);
        msg.set("depth", 123u32).unwrap();
        msg.set("note", "hello").unwrap();

        assert_eq!(msg.get::<u32>("depth").unwrap(), 123);
        assert_eq!(msg.get::<String>("note").unwrap(), "hello");
        assert!(!msg.has("samples"));
    }

    #[test]
    fn test_set_rejects_wrong_type() {
        let desc = test_descriptor();
        let mut msg = Message::new(&desc);
        assert!(matches!(
            msg.set("depth", "not a number"),
            Err(MessageError::TypeMismatch { .. })
        ));
        assert!(matches!(
            msg.set("nonexistent", 1u32),
            Err(MessageError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_push_builds_list() {
        let desc = test_descriptor();
        let mut msg = Message::new(&desc);
        msg.push("samples", -3i32).unwrap();
        msg.push("samples", 7i32).unwrap();

        let list = msg.get_field("samples").and_then(FieldValue::as_list).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].as_i32(), Some(7));

        assert!(matches!(
            msg.push("depth", 1u32),
            Err(MessageError::NotRepeated(_))
        ));
    }

    #[test]
    fn test_set_enum_by_name() {
        let desc = test_descriptor();
        let mut msg = Message::new(&desc);
        msg.set_enum("mode", "MODE_SURVEY").unwrap();
        assert_eq!(
            msg.get_field("mode").and_then(FieldValue::enum_number),
            Some(1)
        );
        assert!(matches!(
            msg.set_enum("mode", "MODE_BOGUS"),
            Err(MessageError::UnknownEnumValue { .. })
        ));
    }

    #[test]
    fn test_clear_marks_absent() {
        let desc = test_descriptor();
        let mut msg = Message::new(&desc);
        msg.set("depth", 5u32).unwrap();
        assert!(msg.has("depth"));
        msg.clear("depth");
        assert!(!msg.has("depth"));
    }
}
