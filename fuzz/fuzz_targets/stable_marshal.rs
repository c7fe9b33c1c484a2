//! Fuzz harness for the stable encoder.
//!
//! Builds a meta header from arbitrary field content and checks the
//! two-pass contract: `stable_size` matches the bytes actually written,
//! marshal into an exact-size buffer succeeds, and marshal into a
//! too-short buffer fails cleanly instead of panicking or writing out
//! of bounds.

#![no_main]

use arbitrary::Arbitrary;
use hivenet_api::refs::Version;
use hivenet_api::session::{BearerToken, MetaHeader, SessionToken, XHeader};
use hivenet_api::StableMessage;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    version: Option<(u32, u32)>,
    epoch: u64,
    ttl: u32,
    x_headers: Vec<(String, String)>,
    session_token: Option<Vec<u8>>,
    bearer_token: Option<Vec<u8>>,
    origin_depth: u8,
    magic: u64,
}

fn build(input: &Input) -> MetaHeader {
    let mut meta = MetaHeader {
        version: input
            .version
            .map(|(major, minor)| Version { major, minor }),
        epoch: input.epoch,
        ttl: input.ttl,
        x_headers: input
            .x_headers
            .iter()
            .map(|(key, value)| XHeader::new(key.clone(), value.clone()))
            .collect(),
        session_token: input.session_token.clone().map(SessionToken),
        bearer_token: input.bearer_token.clone().map(BearerToken),
        origin: None,
        magic: input.magic,
    };
    for _ in 0..input.origin_depth.min(8) {
        meta = MetaHeader::wrap(meta);
    }
    meta
}

fuzz_target!(|input: Input| {
    let meta = build(&input);

    let size = meta.stable_size();
    let mut buf = vec![0u8; size];
    let written = meta
        .stable_marshal(&mut buf)
        .expect("exact-size buffer must fit");
    assert_eq!(written, size);
    assert_eq!(meta.stable_bytes().expect("encoding must succeed"), buf);

    if size > 0 {
        assert!(meta.stable_marshal(&mut buf[..size - 1]).is_err());
    }
});
