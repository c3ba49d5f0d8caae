// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec registry: `(field type, codec name)` to factory.
//!
//! The registry is consulted only while loading a schema; once plans are
//! compiled and cached it is never touched on the encode/decode path.
//! Population is monotonic: codecs may be added but never replaced, and
//! re-adding an occupied key is an error.

use crate::config::{
    DEFAULT_CODEC_NAME, DEFAULT_ID_CODEC_NAME, SEVEN_BIT_STRING_CODEC_NAME,
};
use crate::error::{DcclError, Result};
use crate::field_codec::{
    BoolCodec, BytesCodec, EnumCodec, FieldCodec, FloatCodec, IdentifierCodec, IntegerCodec,
    StringCodec, SubMessageCodec,
};
use crate::schema::TypeKind;
use std::collections::HashMap;

/// Factory producing fresh codec instances for plan binding.
pub type CodecFactory = Box<dyn Fn() -> Box<dyn FieldCodec> + Send + Sync>;

/// Table of codec factories keyed by `(type kind, codec name)`.
pub struct CodecRegistry {
    table: HashMap<(TypeKind, String), CodecFactory>,
}

impl CodecRegistry {
    /// Create an empty registry (tests and fully custom stacks).
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Create a registry populated with the default codec set.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.install_defaults();
        registry
    }

    fn install_defaults(&mut self) {
        // Default registration cannot collide in an empty table.
        let defaults: Vec<(TypeKind, &str, CodecFactory)> = vec![
            (TypeKind::Int32, DEFAULT_CODEC_NAME, Box::new(|| Box::<IntegerCodec>::default())),
            (TypeKind::Int64, DEFAULT_CODEC_NAME, Box::new(|| Box::<IntegerCodec>::default())),
            (TypeKind::UInt32, DEFAULT_CODEC_NAME, Box::new(|| Box::<IntegerCodec>::default())),
            (TypeKind::UInt64, DEFAULT_CODEC_NAME, Box::new(|| Box::<IntegerCodec>::default())),
            (TypeKind::Float, DEFAULT_CODEC_NAME, Box::new(|| Box::<FloatCodec>::default())),
            (TypeKind::Double, DEFAULT_CODEC_NAME, Box::new(|| Box::<FloatCodec>::default())),
            (TypeKind::Bool, DEFAULT_CODEC_NAME, Box::new(|| Box::<BoolCodec>::default())),
            (TypeKind::String, DEFAULT_CODEC_NAME, Box::new(|| Box::<StringCodec>::default())),
            (
                TypeKind::String,
                SEVEN_BIT_STRING_CODEC_NAME,
                Box::new(|| Box::new(StringCodec::seven_bit())),
            ),
            (TypeKind::Bytes, DEFAULT_CODEC_NAME, Box::new(|| Box::<BytesCodec>::default())),
            (TypeKind::Enum, DEFAULT_CODEC_NAME, Box::new(|| Box::<EnumCodec>::default())),
            (TypeKind::Message, DEFAULT_CODEC_NAME, Box::new(|| Box::<SubMessageCodec>::default())),
            (
                TypeKind::UInt32,
                DEFAULT_ID_CODEC_NAME,
                Box::new(|| Box::<IdentifierCodec>::default()),
            ),
        ];
        for (kind, name, factory) in defaults {
            self.table.insert((kind, name.to_string()), factory);
        }
    }

    /// Register a codec factory under `(kind, name)`.
    ///
    /// Fails [`DcclError::DuplicateCodec`] when the key is occupied; the
    /// table never silently replaces a factory.
    pub fn add(
        &mut self,
        kind: TypeKind,
        name: impl Into<String>,
        factory: CodecFactory,
    ) -> Result<()> {
        let name = name.into();
        if self.table.contains_key(&(kind, name.clone())) {
            return Err(DcclError::DuplicateCodec {
                type_kind: kind.as_str(),
                name,
            });
        }
        self.table.insert((kind, name), factory);
        Ok(())
    }

    /// Instantiate a fresh codec for `(kind, name)`.
    pub fn build(&self, kind: TypeKind, name: &str) -> Result<Box<dyn FieldCodec>> {
        self.table
            .get(&(kind, name.to_string()))
            .map(|factory| factory())
            .ok_or_else(|| {
                DcclError::SchemaInvalid(format!(
                    "no codec named '{}' registered for type {}",
                    name,
                    kind.as_str()
                ))
            })
    }

    /// True when `(kind, name)` is registered.
    pub fn contains(&self, kind: TypeKind, name: &str) -> bool {
        self.table.contains_key(&(kind, name.to_string()))
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_kind() {
        let registry = CodecRegistry::with_defaults();
        for kind in [
            TypeKind::Int32,
            TypeKind::Int64,
            TypeKind::UInt32,
            TypeKind::UInt64,
            TypeKind::Float,
            TypeKind::Double,
            TypeKind::Bool,
            TypeKind::String,
            TypeKind::Bytes,
            TypeKind::Enum,
            TypeKind::Message,
        ] {
            assert!(registry.contains(kind, DEFAULT_CODEC_NAME), "{:?}", kind);
        }
        assert!(registry.contains(TypeKind::UInt32, DEFAULT_ID_CODEC_NAME));
        assert!(registry.contains(TypeKind::String, SEVEN_BIT_STRING_CODEC_NAME));
    }

    #[test]
    fn test_re_adding_occupied_key_fails() {
        let mut registry = CodecRegistry::with_defaults();
        let err = registry
            .add(
                TypeKind::Int32,
                DEFAULT_CODEC_NAME,
                Box::new(|| Box::<IntegerCodec>::default()),
            )
            .unwrap_err();
        assert!(matches!(err, DcclError::DuplicateCodec { .. }));
    }

    #[test]
    fn test_custom_registration_resolves() {
        let mut registry = CodecRegistry::empty();
        registry
            .add(
                TypeKind::Bool,
                "flag",
                Box::new(|| Box::<BoolCodec>::default()),
            )
            .unwrap();
        assert!(registry.build(TypeKind::Bool, "flag").is_ok());
        assert!(registry.build(TypeKind::Bool, "missing").is_err());
    }
}
