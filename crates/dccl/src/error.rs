// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for DCCL operations.
//!
//! Schema errors are raised once at `load` and never at encode/decode time.
//! Encode errors are always caller-data errors; decode errors indicate
//! corrupt or truncated input. No error is retried internally and none is
//! logged-and-swallowed: `encode` and `decode` are all-or-nothing.

use std::fmt;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, DcclError>;

/// Errors returned by DCCL operations.
#[derive(Debug)]
pub enum DcclError {
    // ========================================================================
    // Schema Errors (raised by `load`, never by encode/decode)
    // ========================================================================
    /// A field option violation or unsupported type was detected.
    SchemaInvalid(String),
    /// Computed maximum encoded size exceeds the configured byte cap.
    SchemaOversize {
        /// Maximum bytes the schema can encode to.
        need: usize,
        /// Configured cap in bytes.
        cap: usize,
    },
    /// Two distinct descriptors share a message id.
    DuplicateId(u32),
    /// A codec was registered twice under the same `(type, name)` key.
    DuplicateCodec {
        /// Field type kind the codec was keyed under.
        type_kind: &'static str,
        /// Codec name.
        name: String,
    },

    // ========================================================================
    // Encode Errors (caller-data errors)
    // ========================================================================
    /// A field value lies outside its declared range.
    EncodeOutOfRange {
        /// Offending field name.
        field: String,
        /// What was violated.
        detail: String,
    },
    /// Encoded byte count exceeds the cap (dynamic path).
    EncodeOversize {
        /// Bytes the encoding would need.
        size: usize,
        /// Configured cap in bytes.
        cap: usize,
    },
    /// A required field was absent at encode.
    PresenceError {
        /// Name of the absent field.
        field: String,
    },

    // ========================================================================
    // Decode Errors (corrupt or truncated input)
    // ========================================================================
    /// Decode received an id with no cached plan.
    UnknownId(u32),
    /// Buffer exhausted mid-field.
    DecodeTruncated {
        /// Field (or message) being decoded when bits ran out.
        field: String,
    },
    /// Decoded enum index or similar has no mapping.
    DecodeOutOfRange {
        /// Offending field name.
        field: String,
        /// What was out of range.
        detail: String,
    },

    // ========================================================================
    // Crypto Errors
    // ========================================================================
    /// Key derivation or cipher operation failed.
    CryptoError(String),
}

impl fmt::Display for DcclError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Schema
            Self::SchemaInvalid(msg) => write!(f, "Invalid schema: {}", msg),
            Self::SchemaOversize { need, cap } => {
                write!(f, "Schema oversize: needs {} bytes, cap is {}", need, cap)
            }
            Self::DuplicateId(id) => {
                write!(f, "Duplicate message id {} for a different descriptor", id)
            }
            Self::DuplicateCodec { type_kind, name } => {
                write!(f, "Codec '{}' already registered for type {}", name, type_kind)
            }
            // Encode
            Self::EncodeOutOfRange { field, detail } => {
                write!(f, "Field '{}' out of range at encode: {}", field, detail)
            }
            Self::EncodeOversize { size, cap } => {
                write!(f, "Encoded size {} bytes exceeds cap of {}", size, cap)
            }
            Self::PresenceError { field } => {
                write!(f, "Required field '{}' absent at encode", field)
            }
            // Decode
            Self::UnknownId(id) => write!(f, "Message id {} has not been loaded", id),
            Self::DecodeTruncated { field } => {
                write!(f, "Input exhausted while decoding '{}'", field)
            }
            Self::DecodeOutOfRange { field, detail } => {
                write!(f, "Field '{}' out of range at decode: {}", field, detail)
            }
            // Crypto
            Self::CryptoError(msg) => write!(f, "Crypto operation failed: {}", msg),
        }
    }
}

impl std::error::Error for DcclError {}
