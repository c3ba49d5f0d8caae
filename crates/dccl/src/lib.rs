// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # DCCL - Dynamic Compact Control Language
//!
//! A bit-packed message codec for acoustic underwater networking, where
//! effective channel capacity is tens of bytes per second. Given a runtime
//! message schema (field types, ranges, precisions), DCCL encodes messages
//! into the minimum number of bits consistent with the declared options
//! and decodes them back.
//!
//! ## Quick Start
//!
//! ```rust
//! use dccl::schema::{Field, MessageBuilder};
//! use dccl::{Codec, Message};
//!
//! // Declare a schema at runtime.
//! let desc = MessageBuilder::new("NavReport", 12)
//!     .field(Field::double("lat").bounds_f(-90.0, 90.0).precision(4))
//!     .field(Field::double("lon").bounds_f(-180.0, 180.0).precision(4))
//!     .field(Field::uint32("depth").bounds(0, 6000).optional())
//!     .build();
//!
//! // Validate once, then encode/decode.
//! let codec = Codec::new();
//! codec.load(&desc)?;
//!
//! let mut msg = Message::new(&desc);
//! msg.set("lat", 41.5246f64).unwrap();
//! msg.set("lon", -70.6712f64).unwrap();
//!
//! let bytes = codec.encode(&msg)?;
//! let decoded = codec.decode(&bytes)?;
//! assert!((decoded.get::<f64>("lat").unwrap() - 41.5246).abs() < 5e-5);
//! # Ok::<(), dccl::DcclError>(())
//! ```
//!
//! ## Wire Format
//!
//! ```text
//! +------------------+----------------------+--------------------------+
//! | id prefix (1-2B) | header (48 bits)     | body (bit-packed, padded)|
//! |  cleartext       |  cleartext, = nonce  |  optionally encrypted    |
//! +------------------+----------------------+--------------------------+
//! ```
//!
//! The header layout is identical across all DCCL messages (CCL tag, id,
//! time of day, source, destination, flags), so receivers dispatch on
//! [`Codec::decode_id`] before decrypting or decoding anything.
//!
//! ## Architecture
//!
//! - [`schema`] - runtime message descriptors and fluent builders
//! - [`Message`] / [`FieldValue`] - dynamic message values
//! - [`field_codec`] - the codec framework: one flat trait, a registry
//!   keyed by `(field type, codec name)`, and the default codec set
//!   (range-coded integers, quantized floats, length-prefixed strings,
//!   recursive sub-messages, count-prefixed repeats)
//! - [`Codec`] - the orchestrator: `load` validates and caches a plan,
//!   `encode`/`decode` drive it over a single [`bits::BitBuffer`]
//! - [`logging`] - compile-time configurable logging (feature `logging`)
//!
//! ## Concurrency
//!
//! Load schemas and register codecs during startup; afterwards a `Codec`
//! is effectively read-only and may be shared across threads, one
//! in-flight message at a time per thread of use. Nothing blocks on I/O;
//! encode and decode are CPU-bound and synchronous.

/// Bit-buffer primitive (append-at-back, pop-at-front).
pub mod bits;
/// Top-level message codec.
mod codec;
/// Wire constants and runtime configuration.
pub mod config;
/// Passphrase-derived body encryption.
mod crypto;
/// Error taxonomy.
mod error;
/// Field codec framework and default codec set.
pub mod field_codec;
/// Fixed 48-bit header layout and logical slot binding.
pub mod header;
/// Compile-time configurable logging (zero-cost when disabled).
pub mod logging;
/// Dynamic message container.
mod message;
/// Compiled plans (bound codecs + size bounds).
mod plan;
/// Runtime schema descriptors and builders.
pub mod schema;
/// Dynamic field values.
mod value;

pub use codec::{Codec, DcclType};
pub use config::CodecConfig;
pub use error::{DcclError, Result};
pub use message::{FromFieldValue, Message, MessageError};
pub use plan::Plan;
pub use value::FieldValue;

// Most-used schema types at the crate root; the full set stays in `schema`.
pub use schema::{EnumBuilder, Field, MessageBuilder, MessageDescriptor};
