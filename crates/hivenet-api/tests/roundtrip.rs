//! Round-trips through a standard protobuf decoder.
//!
//! The stable encoder promises protobuf wire compatibility, not just
//! self-consistency. These tests decode its output with `prost` mirror
//! types declared from the same schema, then re-encode with prost and
//! demand byte equality — proving both that a standard decoder accepts
//! the bytes and that the stable field ordering matches what a standard
//! encoder would emit for these messages.

use prost::Message as _;

use hivenet_api::accounting::{BalanceRequest, BalanceRequestBody};
use hivenet_api::refs::{OwnerId, Version};
use hivenet_api::session::{MetaHeader, SessionToken, XHeader};
use hivenet_api::signing::sign_service_message;
use hivenet_api::StableMessage;
use hivenet_crypto::{EcdsaSigner, SignatureScheme};

#[derive(Clone, PartialEq, prost::Message)]
struct PbVersion {
    #[prost(uint32, tag = "1")]
    major: u32,
    #[prost(uint32, tag = "2")]
    minor: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
struct PbXHeader {
    #[prost(string, tag = "1")]
    key: String,
    #[prost(string, tag = "2")]
    value: String,
}

#[derive(Clone, PartialEq, prost::Message)]
struct PbMetaHeader {
    #[prost(message, optional, tag = "1")]
    version: Option<PbVersion>,
    #[prost(uint64, tag = "2")]
    epoch: u64,
    #[prost(uint32, tag = "3")]
    ttl: u32,
    #[prost(message, repeated, tag = "4")]
    x_headers: Vec<PbXHeader>,
    #[prost(bytes = "vec", optional, tag = "5")]
    session_token: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "6")]
    bearer_token: Option<Vec<u8>>,
    #[prost(message, optional, boxed, tag = "7")]
    origin: Option<Box<PbMetaHeader>>,
    #[prost(uint64, tag = "8")]
    magic: u64,
}

#[derive(Clone, PartialEq, prost::Message)]
struct PbSignature {
    #[prost(bytes = "vec", tag = "1")]
    key: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    sign: Vec<u8>,
    #[prost(uint64, tag = "3")]
    scheme: u64,
}

#[derive(Clone, PartialEq, prost::Message)]
struct PbVerificationHeader {
    #[prost(message, optional, tag = "1")]
    body_signature: Option<PbSignature>,
    #[prost(message, optional, tag = "2")]
    meta_signature: Option<PbSignature>,
    #[prost(message, optional, tag = "3")]
    origin_signature: Option<PbSignature>,
    #[prost(message, optional, boxed, tag = "4")]
    origin: Option<Box<PbVerificationHeader>>,
}

#[derive(Clone, PartialEq, prost::Message)]
struct PbOwnerId {
    #[prost(bytes = "vec", tag = "1")]
    value: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
struct PbBalanceRequestBody {
    #[prost(message, optional, tag = "1")]
    owner_id: Option<PbOwnerId>,
}

#[derive(Clone, PartialEq, prost::Message)]
struct PbBalanceRequest {
    #[prost(message, optional, tag = "1")]
    body: Option<PbBalanceRequestBody>,
    #[prost(message, optional, tag = "2")]
    meta_header: Option<PbMetaHeader>,
    #[prost(message, optional, tag = "3")]
    verify_header: Option<PbVerificationHeader>,
}

fn sample_meta() -> MetaHeader {
    MetaHeader {
        version: Some(Version { major: 2, minor: 11 }),
        epoch: 77,
        ttl: 3,
        x_headers: vec![XHeader::new("trace", "abc"), XHeader::new("prio", "high")],
        session_token: Some(SessionToken(vec![0xDE, 0xAD])),
        bearer_token: None,
        origin: None,
        magic: 0x4C55,
    }
}

#[test]
fn meta_header_decodes_with_prost() {
    let meta = sample_meta();
    let bytes = meta.stable_bytes().unwrap();

    let decoded = PbMetaHeader::decode(bytes.as_slice()).unwrap();
    assert_eq!(decoded.version, Some(PbVersion { major: 2, minor: 11 }));
    assert_eq!(decoded.epoch, 77);
    assert_eq!(decoded.ttl, 3);
    assert_eq!(decoded.x_headers.len(), 2);
    assert_eq!(decoded.x_headers[0].key, "trace");
    assert_eq!(decoded.x_headers[1].value, "high");
    assert_eq!(decoded.session_token, Some(vec![0xDE, 0xAD]));
    assert_eq!(decoded.bearer_token, None);
    assert_eq!(decoded.magic, 0x4C55);

    // A standard encoder emits these fields identically.
    assert_eq!(decoded.encode_to_vec(), bytes);
}

#[test]
fn chained_meta_header_round_trips() {
    let inner = sample_meta();
    let outer = MetaHeader::wrap(inner);
    let bytes = outer.stable_bytes().unwrap();

    let decoded = PbMetaHeader::decode(bytes.as_slice()).unwrap();
    assert_eq!(decoded.ttl, 2);
    let origin = decoded.origin.as_deref().unwrap();
    assert_eq!(origin.ttl, 3);
    assert_eq!(origin.epoch, 77);

    assert_eq!(decoded.encode_to_vec(), bytes);
}

#[test]
fn signed_two_hop_request_round_trips() {
    let secret = [0x42u8; 32];
    let signer =
        EcdsaSigner::from_secret_bytes(&secret, SignatureScheme::EcdsaRfc6979Sha256).unwrap();

    let body = BalanceRequestBody {
        owner_id: Some(OwnerId {
            value: vec![1, 2, 3],
        }),
    };
    let mut request = BalanceRequest::new(body, sample_meta());
    sign_service_message(&signer, &mut request).unwrap();
    request.meta_header = MetaHeader::wrap(std::mem::take(&mut request.meta_header));
    sign_service_message(&signer, &mut request).unwrap();

    let bytes = request.stable_bytes().unwrap();
    let decoded = PbBalanceRequest::decode(bytes.as_slice()).unwrap();

    let verify = decoded.verify_header.as_ref().unwrap();
    // Outer layer: meta + origin signatures, no body signature.
    assert!(verify.body_signature.is_none());
    assert!(verify.meta_signature.is_some());
    assert!(verify.origin_signature.is_some());
    // Inner layer: body + meta signatures only.
    let origin = verify.origin.as_deref().unwrap();
    assert!(origin.body_signature.is_some());
    assert!(origin.origin_signature.is_none());
    assert!(origin.origin.is_none());
    assert_eq!(
        origin.body_signature.as_ref().unwrap().scheme,
        SignatureScheme::EcdsaRfc6979Sha256.wire_tag()
    );

    assert_eq!(decoded.encode_to_vec(), bytes);
}
