// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field codec framework.
//!
//! Every codec (primitive, embedded message or repeated wrapper) obeys
//! one flat contract: validate a field description, report its encoded
//! size bounds in bits, and encode/decode against a shared [`BitBuffer`].
//! Codecs compose by delegation: the repeated wrapper drives a per-element
//! codec, and the embedded-message codec drives the nested schema's bound
//! codecs, all threading the same bit-buffer.
//!
//! Absence discipline: the sentinel state a codec reserves for "not
//! present" exists only when the field is optional. Required fields spend
//! no bits on presence and fail [`PresenceError`](crate::DcclError) when
//! absent at encode.

mod enumeration;
mod ident;
mod numeric;
mod registry;
mod repeated;
mod submessage;
mod text;

pub use enumeration::EnumCodec;
pub use ident::IdentifierCodec;
pub use numeric::{BoolCodec, FloatCodec, IntegerCodec};
pub use registry::{CodecFactory, CodecRegistry};
pub use repeated::RepeatedCodec;
pub use submessage::SubMessageCodec;
pub use text::{BytesCodec, StringCodec};

use crate::bits::BitBuffer;
use crate::error::Result;
use crate::schema::FieldDescriptor;
use crate::value::FieldValue;

/// Contract every field codec implements.
///
/// Codecs are stateless with respect to the field they serve: the field
/// descriptor is passed into every operation, so one codec instance can be
/// cloned out of the registry and bound to any field of its type. The one
/// exception is [`bind`](Self::bind), which runs once at `load` and lets a
/// codec compile derived state (the embedded-message codec compiles the
/// nested schema's bindings there).
pub trait FieldCodec: Send + Sync {
    /// Registered name of this codec.
    fn name(&self) -> &'static str;

    /// One-time hook at `load`, before [`validate`](Self::validate).
    fn bind(&mut self, _field: &FieldDescriptor, _registry: &CodecRegistry) -> Result<()> {
        Ok(())
    }

    /// Check the field's options are internally consistent and supported.
    fn validate(&self, field: &FieldDescriptor) -> Result<()>;

    /// Minimum bits [`encode`](Self::encode) may consume.
    fn min_size(&self, field: &FieldDescriptor) -> u32;

    /// Maximum bits [`encode`](Self::encode) may consume.
    ///
    /// Equal to [`min_size`](Self::min_size) for fixed-size codecs.
    fn max_size(&self, field: &FieldDescriptor) -> u32;

    /// Bits a specific value would consume, without encoding it.
    fn value_size(&self, field: &FieldDescriptor, value: Option<&FieldValue>) -> Result<u32>;

    /// Append the value's bit representation.
    ///
    /// `None` means the field is absent on the message.
    fn encode(
        &self,
        field: &FieldDescriptor,
        value: Option<&FieldValue>,
        bits: &mut BitBuffer,
    ) -> Result<()>;

    /// Consume bits from the front of the buffer; `Ok(None)` marks an
    /// absent optional field.
    fn decode(&self, field: &FieldDescriptor, bits: &mut BitBuffer) -> Result<Option<FieldValue>>;
}

/// Bits needed to distinguish `states` values: `ceil(log2(states))`.
///
/// A single-state range is zero bits wide; such fields occupy no space on
/// the wire.
pub fn bits_for_states(states: u64) -> u32 {
    match states {
        0 | 1 => 0,
        n => 64 - (n - 1).leading_zeros(),
    }
}
