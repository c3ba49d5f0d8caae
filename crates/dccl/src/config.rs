// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire constants and codec configuration.
//!
//! This module centralizes the fixed wire-format constants of the DCCL
//! header and the runtime configuration of a [`Codec`](crate::Codec).
//! **Never hardcode these values elsewhere.**

// =======================================================================
// Fixed header layout (48 bits, identical across all DCCL messages)
// =======================================================================

/// CCL compatibility tag carried in the first header byte.
///
/// Reserves dispatch space alongside the predecessor CCL codec family:
/// receivers can tell a DCCL message from a CCL one by this byte alone.
pub const CCL_COMPATIBILITY_TAG: u8 = 32;

/// Fixed header length in bytes.
pub const HEADER_BYTES: usize = 6;

/// Fixed header length in bits.
pub const HEADER_BITS: u32 = 48;

/// Width of the CCL compatibility tag.
pub const HEAD_CCL_ID_BITS: u32 = 8;

/// Width of the message id repeated inside the header.
pub const HEAD_DCCL_ID_BITS: u32 = 9;

/// Width of the coarse timestamp (seconds since start of day).
pub const HEAD_TIME_BITS: u32 = 17;

/// Width of the source address.
pub const HEAD_SRC_ID_BITS: u32 = 5;

/// Width of the destination address.
pub const HEAD_DEST_ID_BITS: u32 = 5;

/// Width of each of the multimessage and broadcast flags.
pub const HEAD_FLAG_BITS: u32 = 1;

/// Width of the reserved tail bits (always zero).
pub const HEAD_UNUSED_BITS: u32 = 2;

/// Seconds in a day; modulus of the header time slot.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Destination address meaning "all receivers".
pub const BROADCAST_ID: u8 = 0;

/// Largest message id that fits the 9-bit header slot.
pub const MAX_MESSAGE_ID: u32 = (1 << HEAD_DCCL_ID_BITS) - 1;

// =======================================================================
// Defaults
// =======================================================================

/// Codec name used when a field declares no `codec` option.
pub const DEFAULT_CODEC_NAME: &str = "_default_codec";

/// Name of the default identifier codec (varint id prefix).
pub const DEFAULT_ID_CODEC_NAME: &str = "_default_id_codec";

/// Name of the 7-bit (ASCII-packed) string codec variant.
pub const SEVEN_BIT_STRING_CODEC_NAME: &str = "_7bit_string_codec";

/// Default cap on any encoded message, in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 256;

/// Runtime configuration for a [`Codec`](crate::Codec).
///
/// # Example
///
/// ```
/// use dccl::CodecConfig;
///
/// let cfg = CodecConfig {
///     crypto_passphrase: Some("secret".into()),
///     ..CodecConfig::default()
/// };
/// assert_eq!(cfg.max_message_size_bytes, 256);
/// ```
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Registered name of the identifier codec prefixing every message.
    pub id_codec_name: String,
    /// Passphrase for body encryption; `None` leaves bodies in cleartext.
    pub crypto_passphrase: Option<String>,
    /// Hard cap on any encoded message, in bytes.
    pub max_message_size_bytes: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            id_codec_name: DEFAULT_ID_CODEC_NAME.to_string(),
            crypto_passphrase: None,
            max_message_size_bytes: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_widths_sum_to_48() {
        let total = HEAD_CCL_ID_BITS
            + HEAD_DCCL_ID_BITS
            + HEAD_TIME_BITS
            + HEAD_SRC_ID_BITS
            + HEAD_DEST_ID_BITS
            + 2 * HEAD_FLAG_BITS
            + HEAD_UNUSED_BITS;
        assert_eq!(total, HEADER_BITS);
        assert_eq!(HEADER_BITS as usize, HEADER_BYTES * 8);
    }

    #[test]
    fn test_time_slot_holds_a_day() {
        assert!(u64::from(SECONDS_PER_DAY) <= 1 << HEAD_TIME_BITS);
    }

    #[test]
    fn test_default_config() {
        let cfg = CodecConfig::default();
        assert_eq!(cfg.id_codec_name, DEFAULT_ID_CODEC_NAME);
        assert!(cfg.crypto_passphrase.is_none());
        assert_eq!(cfg.max_message_size_bytes, DEFAULT_MAX_MESSAGE_SIZE);
    }
}
