// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed 48-bit message header.
//!
//! Layout, MSB of the first header byte first: 8-bit CCL compatibility tag
//! (fixed 32), 9-bit message id, 17-bit time of day in seconds, 5-bit
//! source, 5-bit destination, 1-bit multimessage flag, 1-bit broadcast
//! flag, 2 reserved zero bits. The layout is identical across all DCCL
//! messages so receivers can dispatch without knowing the body schema.

use crate::bits::BitBuffer;
use crate::config::{
    CCL_COMPATIBILITY_TAG, HEAD_CCL_ID_BITS, HEAD_DCCL_ID_BITS, HEAD_DEST_ID_BITS,
    HEAD_FLAG_BITS, HEAD_SRC_ID_BITS, HEAD_TIME_BITS, HEAD_UNUSED_BITS,
};
use crate::error::{DcclError, Result};

/// A logical header slot user fields may bind to via the `in_head` option.
///
/// The CCL tag, the id copy and the reserved bits are not bindable; the
/// codec fills them itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderSlot {
    /// `_time`: seconds since the start of the current day.
    Time,
    /// `_src_id`: source address.
    SrcId,
    /// `_dest_id`: destination address (0 broadcasts).
    DestId,
    /// `_multimessage_flag`: message continues in a following frame.
    MultimessageFlag,
    /// `_broadcast_flag`: addressed to all receivers.
    BroadcastFlag,
}

impl HeaderSlot {
    /// Canonical slot name (leading underscore included).
    pub fn name(self) -> &'static str {
        match self {
            Self::Time => "_time",
            Self::SrcId => "_src_id",
            Self::DestId => "_dest_id",
            Self::MultimessageFlag => "_multimessage_flag",
            Self::BroadcastFlag => "_broadcast_flag",
        }
    }

    /// Slot width in bits.
    pub fn bits(self) -> u32 {
        match self {
            Self::Time => HEAD_TIME_BITS,
            Self::SrcId => HEAD_SRC_ID_BITS,
            Self::DestId => HEAD_DEST_ID_BITS,
            Self::MultimessageFlag | Self::BroadcastFlag => HEAD_FLAG_BITS,
        }
    }

    /// True for the one-bit flag slots (bound fields must be bool).
    pub fn is_flag(self) -> bool {
        matches!(self, Self::MultimessageFlag | Self::BroadcastFlag)
    }

    /// Resolve a field name to its slot; the leading underscore is
    /// optional (`time` and `_time` both bind `_time`).
    pub fn from_field_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix('_').unwrap_or(name);
        match name {
            "time" => Some(Self::Time),
            "src_id" => Some(Self::SrcId),
            "dest_id" => Some(Self::DestId),
            "multimessage_flag" => Some(Self::MultimessageFlag),
            "broadcast_flag" => Some(Self::BroadcastFlag),
            _ => None,
        }
    }
}

/// The variable parts of the fixed header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    /// Seconds since the start of the day (`< 86400`).
    pub time: u32,
    /// Source address (`< 32`).
    pub src: u8,
    /// Destination address (`< 32`; 0 broadcasts).
    pub dest: u8,
    /// Message continues in a following frame.
    pub multimessage: bool,
    /// Addressed to all receivers.
    pub broadcast: bool,
}

impl Header {
    /// Write all 48 header bits, id included.
    pub fn encode(&self, id: u32, bits: &mut BitBuffer) -> Result<()> {
        let push = |bits: &mut BitBuffer, value: u64, width: u32| {
            bits.push_bits(value, width).map_err(|e| e.into_encode())
        };
        push(bits, u64::from(CCL_COMPATIBILITY_TAG), HEAD_CCL_ID_BITS)?;
        push(bits, u64::from(id), HEAD_DCCL_ID_BITS)?;
        push(bits, u64::from(self.time), HEAD_TIME_BITS)?;
        push(bits, u64::from(self.src), HEAD_SRC_ID_BITS)?;
        push(bits, u64::from(self.dest), HEAD_DEST_ID_BITS)?;
        push(bits, u64::from(self.multimessage), HEAD_FLAG_BITS)?;
        push(bits, u64::from(self.broadcast), HEAD_FLAG_BITS)?;
        push(bits, 0, HEAD_UNUSED_BITS)
    }

    /// Read all 48 header bits; returns the embedded id alongside.
    pub fn decode(bits: &mut BitBuffer) -> Result<(u32, Self)> {
        let pop = |bits: &mut BitBuffer, width: u32| {
            bits.pop_bits(width).map_err(|e| e.into_decode("header"))
        };
        let tag = pop(bits, HEAD_CCL_ID_BITS)?;
        if tag != u64::from(CCL_COMPATIBILITY_TAG) {
            return Err(DcclError::DecodeOutOfRange {
                field: "_ccl_id".to_string(),
                detail: format!("tag {} is not a DCCL message", tag),
            });
        }
        let id = pop(bits, HEAD_DCCL_ID_BITS)? as u32;
        let time = pop(bits, HEAD_TIME_BITS)? as u32;
        let src = pop(bits, HEAD_SRC_ID_BITS)? as u8;
        let dest = pop(bits, HEAD_DEST_ID_BITS)? as u8;
        let multimessage = pop(bits, HEAD_FLAG_BITS)? == 1;
        let broadcast = pop(bits, HEAD_FLAG_BITS)? == 1;
        pop(bits, HEAD_UNUSED_BITS)?;
        Ok((
            id,
            Self {
                time,
                src,
                dest,
                multimessage,
                broadcast,
            },
        ))
    }
}
