// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use dccl::schema::{EnumBuilder, Field, MessageBuilder};
use dccl::Codec;
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

fn codec() -> &'static Codec {
    static CODEC: OnceLock<Codec> = OnceLock::new();
    CODEC.get_or_init(|| {
        let mode = EnumBuilder::new("Mode")
            .value("A")
            .value("B")
            .value("C")
            .build();
        let inner = MessageBuilder::embedded("Inner")
            .field(Field::uint32("val").bounds(0, 1000).optional())
            .build();
        let desc = MessageBuilder::new("Fuzzed", 9)
            .field(Field::int32("a").bounds(-500, 500))
            .field(Field::double("b").bounds_f(-90.0, 90.0).precision(4).optional())
            .field(Field::string("c").max_length(16).optional())
            .field(Field::bytes("d").max_length(8))
            .field(Field::enumeration("e", mode).optional())
            .field(Field::message("f", inner).optional())
            .field(Field::uint32("g").bounds(0, 30).repeated(5))
            .build();
        let codec = Codec::new();
        codec.load(&desc).expect("fuzz schema is valid");
        codec
    })
}

fuzz_target!(|data: &[u8]| {
    let codec = codec();

    // Neither path may panic on arbitrary input.
    let _ = codec.decode_id(data);
    if let Ok(msg) = codec.decode(data) {
        // Whatever decodes must re-encode cleanly.
        let _ = codec.encode(&msg);
    }
});
