//! Session layer: per-hop meta headers, nested verification headers, and
//! the request/response envelopes that carry them.
//!
//! # The parallel chains
//!
//! A message that has crossed `n` hops carries two singly-linked chains of
//! equal depth, outermost node first:
//!
//! - the [`MetaHeader`] chain — each hop wraps the meta header it received
//!   as its own `origin` and may rewrite TTL, epoch, and X-headers in the
//!   new outer node;
//! - the [`VerificationHeader`] chain — each hop's signing pass displaces
//!   the header it received into the `origin` slot of a fresh outer layer.
//!
//! Equal depth is a protocol invariant. The verification walk in
//! [`crate::signing`] descends both chains in lockstep and treats a
//! mismatch as a violation, not something to tolerate.
//!
//! # Presence invariants
//!
//! Only the innermost verification layer ever signs the body, and only
//! non-innermost layers carry an origin signature. Rather than four
//! optional fields policed at runtime, [`VerificationHeader`] holds the
//! always-present meta signature plus a [`VerificationLink`] — the invalid
//! combinations are unrepresentable.

use crate::encoding::{
    bytes_marshal, bytes_size, message_marshal, message_size, repeated_message_marshal,
    repeated_message_size, uint32_marshal, uint32_size, uint64_marshal, uint64_size, EncodeError,
    StableMessage,
};
use crate::refs::{Signature, Version};

/// An application-defined key/value pair attached to a meta header for
/// out-of-band signaling.
///
/// X-headers are an ordered list, never a map: their wire order is exactly
/// the order the sender set, which keeps the canonical encoding stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XHeader {
    /// Header name.
    pub key: String,
    /// Header value.
    pub value: String,
}

impl XHeader {
    /// Convenience constructor.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl StableMessage for XHeader {
    fn stable_size(&self) -> usize {
        bytes_size(1, self.key.as_bytes()) + bytes_size(2, self.value.as_bytes())
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        bytes_marshal(buf, &mut offset, 1, self.key.as_bytes())?;
        bytes_marshal(buf, &mut offset, 2, self.value.as_bytes())?;
        Ok(offset)
    }
}

/// Opaque session token payload, carried verbatim.
///
/// The token's inner structure belongs to the session service; this layer
/// only promises to pass the bytes through unchanged, so the canonical
/// encoding is the payload itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionToken(pub Vec<u8>);

impl StableMessage for SessionToken {
    fn stable_size(&self) -> usize {
        self.0.len()
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        if buf.len() < self.0.len() {
            return Err(EncodeError::BufferTooSmall {
                required: self.0.len(),
                available: buf.len(),
            });
        }
        buf[..self.0.len()].copy_from_slice(&self.0);
        Ok(self.0.len())
    }
}

/// Opaque bearer token payload, carried verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BearerToken(pub Vec<u8>);

impl StableMessage for BearerToken {
    fn stable_size(&self) -> usize {
        self.0.len()
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        if buf.len() < self.0.len() {
            return Err(EncodeError::BufferTooSmall {
                required: self.0.len(),
                available: buf.len(),
            });
        }
        buf[..self.0.len()].copy_from_slice(&self.0);
        Ok(self.0.len())
    }
}

/// Per-hop routing and control metadata, distinct from the message body.
///
/// One node is added per hop, outermost first; the `origin` link holds the
/// header as the previous hop sent it. Chaining is the caller's job (see
/// [`MetaHeader::wrap`]) and must happen *before* the signing pass — the
/// signing engine signs whatever meta state it is handed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaHeader {
    /// Protocol version of the hop that built this node.
    pub version: Option<Version>,
    /// Network epoch at sending time.
    pub epoch: u64,
    /// Remaining time-to-live in hops; each forwarder decrements it.
    pub ttl: u32,
    /// Application X-headers, wire order preserved.
    pub x_headers: Vec<XHeader>,
    /// Session token, if the operation runs inside a session.
    pub session_token: Option<SessionToken>,
    /// Bearer token, if the sender acts under delegated rights.
    pub bearer_token: Option<BearerToken>,
    /// Meta header of the previous hop, if any.
    pub origin: Option<Box<MetaHeader>>,
    /// Network magic number; zero means unset.
    pub magic: u64,
}

impl MetaHeader {
    /// Builds the next hop's meta header around `origin`.
    ///
    /// Version, epoch, and magic are inherited; the TTL is decremented
    /// (saturating at zero); X-headers and tokens start empty because they
    /// describe a single hop, not the whole path.
    #[must_use]
    pub fn wrap(origin: Self) -> Self {
        Self {
            version: origin.version,
            epoch: origin.epoch,
            ttl: origin.ttl.saturating_sub(1),
            magic: origin.magic,
            origin: Some(Box::new(origin)),
            ..Self::default()
        }
    }

    /// Number of chained nodes, counting this one.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut node = self;
        while let Some(origin) = &node.origin {
            depth += 1;
            node = origin;
        }
        depth
    }
}

impl StableMessage for MetaHeader {
    fn stable_size(&self) -> usize {
        let mut size = 0;
        if let Some(version) = &self.version {
            size += message_size(1, version);
        }
        size += uint64_size(2, self.epoch);
        size += uint32_size(3, self.ttl);
        size += repeated_message_size(4, &self.x_headers);
        if let Some(token) = &self.session_token {
            size += message_size(5, token);
        }
        if let Some(token) = &self.bearer_token {
            size += message_size(6, token);
        }
        if let Some(origin) = &self.origin {
            size += message_size(7, origin.as_ref());
        }
        size + uint64_size(8, self.magic)
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        if let Some(version) = &self.version {
            message_marshal(buf, &mut offset, 1, version)?;
        }
        uint64_marshal(buf, &mut offset, 2, self.epoch)?;
        uint32_marshal(buf, &mut offset, 3, self.ttl)?;
        repeated_message_marshal(buf, &mut offset, 4, &self.x_headers)?;
        if let Some(token) = &self.session_token {
            message_marshal(buf, &mut offset, 5, token)?;
        }
        if let Some(token) = &self.bearer_token {
            message_marshal(buf, &mut offset, 6, token)?;
        }
        if let Some(origin) = &self.origin {
            message_marshal(buf, &mut offset, 7, origin.as_ref())?;
        }
        uint64_marshal(buf, &mut offset, 8, self.magic)?;
        Ok(offset)
    }
}

/// Link from a verification layer to what lies beneath it.
///
/// `Root` is the innermost (originating) layer and is the only place a
/// body signature exists; `Forwarded` layers instead sign the entire
/// displaced previous-hop header they enclose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationLink {
    /// Innermost layer, produced by the message originator.
    Root {
        /// Signature over the body's canonical bytes.
        body_signature: Signature,
    },
    /// A layer added by a forwarding hop.
    Forwarded {
        /// Signature over the enclosed header's canonical bytes.
        origin_signature: Signature,
        /// The previous hop's verification header, unchanged.
        origin: Box<VerificationHeader>,
    },
}

/// One layer of the nested ("matryoshka") verification chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationHeader {
    /// Signature over the paired meta header's canonical bytes. Every hop
    /// re-signs the meta header it sends, since each hop may rewrite TTL,
    /// epoch, or X-headers.
    pub meta_signature: Signature,
    /// What this layer encloses.
    pub link: VerificationLink,
}

impl VerificationHeader {
    /// The enclosed previous-hop header, if this is a forwarded layer.
    #[must_use]
    pub fn origin(&self) -> Option<&VerificationHeader> {
        match &self.link {
            VerificationLink::Root { .. } => None,
            VerificationLink::Forwarded { origin, .. } => Some(origin),
        }
    }

    /// The body signature, present only on the innermost layer.
    #[must_use]
    pub fn body_signature(&self) -> Option<&Signature> {
        match &self.link {
            VerificationLink::Root { body_signature } => Some(body_signature),
            VerificationLink::Forwarded { .. } => None,
        }
    }

    /// Number of nested layers, counting this one.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut node = self;
        while let Some(origin) = node.origin() {
            depth += 1;
            node = origin;
        }
        depth
    }
}

impl StableMessage for VerificationHeader {
    fn stable_size(&self) -> usize {
        let mut size = 0;
        if let VerificationLink::Root { body_signature } = &self.link {
            size += message_size(1, body_signature);
        }
        size += message_size(2, &self.meta_signature);
        if let VerificationLink::Forwarded {
            origin_signature,
            origin,
        } = &self.link
        {
            size += message_size(3, origin_signature);
            size += message_size(4, origin.as_ref());
        }
        size
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        if let VerificationLink::Root { body_signature } = &self.link {
            message_marshal(buf, &mut offset, 1, body_signature)?;
        }
        message_marshal(buf, &mut offset, 2, &self.meta_signature)?;
        if let VerificationLink::Forwarded {
            origin_signature,
            origin,
        } = &self.link
        {
            message_marshal(buf, &mut offset, 3, origin_signature)?;
            message_marshal(buf, &mut offset, 4, origin.as_ref())?;
        }
        Ok(offset)
    }
}

/// A message carrying a body, a meta header, and (once signed) a
/// verification header.
///
/// This is the seam the signing engine works through. [`Request`] and
/// [`Response`] implement it for any stable-marshalable body type, which
/// replaces the reference implementation's central per-type dispatch.
pub trait Envelope {
    /// The domain payload type.
    type Body: StableMessage;

    /// The domain payload.
    fn body(&self) -> &Self::Body;

    /// The current (possibly chained) meta header.
    fn meta_header(&self) -> &MetaHeader;

    /// The verification header, if the message has been signed.
    fn verify_header(&self) -> Option<&VerificationHeader>;

    /// Removes and returns the verification header.
    fn take_verify_header(&mut self) -> Option<VerificationHeader>;

    /// Attaches a verification header, replacing any existing one.
    fn set_verify_header(&mut self, header: VerificationHeader);
}

/// A service request: body, meta header, verification header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request<B> {
    /// The domain payload.
    pub body: B,
    /// Per-hop routing and control metadata.
    pub meta_header: MetaHeader,
    /// Nested signature layers; `None` until the first signing pass.
    pub verify_header: Option<VerificationHeader>,
}

impl<B> Request<B> {
    /// Builds an unsigned request.
    #[must_use]
    pub const fn new(body: B, meta_header: MetaHeader) -> Self {
        Self {
            body,
            meta_header,
            verify_header: None,
        }
    }
}

impl<B: StableMessage> Envelope for Request<B> {
    type Body = B;

    fn body(&self) -> &B {
        &self.body
    }

    fn meta_header(&self) -> &MetaHeader {
        &self.meta_header
    }

    fn verify_header(&self) -> Option<&VerificationHeader> {
        self.verify_header.as_ref()
    }

    fn take_verify_header(&mut self) -> Option<VerificationHeader> {
        self.verify_header.take()
    }

    fn set_verify_header(&mut self, header: VerificationHeader) {
        self.verify_header = Some(header);
    }
}

impl<B: StableMessage> StableMessage for Request<B> {
    fn stable_size(&self) -> usize {
        let mut size = message_size(1, &self.body) + message_size(2, &self.meta_header);
        if let Some(header) = &self.verify_header {
            size += message_size(3, header);
        }
        size
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        message_marshal(buf, &mut offset, 1, &self.body)?;
        message_marshal(buf, &mut offset, 2, &self.meta_header)?;
        if let Some(header) = &self.verify_header {
            message_marshal(buf, &mut offset, 3, header)?;
        }
        Ok(offset)
    }
}

/// A service response: body, meta header, verification header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response<B> {
    /// The domain payload.
    pub body: B,
    /// Per-hop routing and control metadata.
    pub meta_header: MetaHeader,
    /// Nested signature layers; `None` until the first signing pass.
    pub verify_header: Option<VerificationHeader>,
}

impl<B> Response<B> {
    /// Builds an unsigned response.
    #[must_use]
    pub const fn new(body: B, meta_header: MetaHeader) -> Self {
        Self {
            body,
            meta_header,
            verify_header: None,
        }
    }
}

impl<B: StableMessage> Envelope for Response<B> {
    type Body = B;

    fn body(&self) -> &B {
        &self.body
    }

    fn meta_header(&self) -> &MetaHeader {
        &self.meta_header
    }

    fn verify_header(&self) -> Option<&VerificationHeader> {
        self.verify_header.as_ref()
    }

    fn take_verify_header(&mut self) -> Option<VerificationHeader> {
        self.verify_header.take()
    }

    fn set_verify_header(&mut self, header: VerificationHeader) {
        self.verify_header = Some(header);
    }
}

impl<B: StableMessage> StableMessage for Response<B> {
    fn stable_size(&self) -> usize {
        let mut size = message_size(1, &self.body) + message_size(2, &self.meta_header);
        if let Some(header) = &self.verify_header {
            size += message_size(3, header);
        }
        size
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        message_marshal(buf, &mut offset, 1, &self.body)?;
        message_marshal(buf, &mut offset, 2, &self.meta_header)?;
        if let Some(header) = &self.verify_header {
            message_marshal(buf, &mut offset, 3, header)?;
        }
        Ok(offset)
    }
}

/// Body of a session creation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSessionRequestBody {
    /// Session initiator.
    pub owner_id: Option<crate::refs::OwnerId>,
    /// Last epoch the session stays valid in.
    pub expiration: u64,
}

impl StableMessage for CreateSessionRequestBody {
    fn stable_size(&self) -> usize {
        self.owner_id
            .as_ref()
            .map_or(0, |owner_id| message_size(1, owner_id))
            + uint64_size(2, self.expiration)
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        if let Some(owner_id) = &self.owner_id {
            message_marshal(buf, &mut offset, 1, owner_id)?;
        }
        uint64_marshal(buf, &mut offset, 2, self.expiration)?;
        Ok(offset)
    }
}

/// Body of a session creation reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSessionResponseBody {
    /// Identifier of the opened session.
    pub id: Vec<u8>,
    /// Session public key.
    pub session_key: Vec<u8>,
}

impl StableMessage for CreateSessionResponseBody {
    fn stable_size(&self) -> usize {
        bytes_size(1, &self.id) + bytes_size(2, &self.session_key)
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        bytes_marshal(buf, &mut offset, 1, &self.id)?;
        bytes_marshal(buf, &mut offset, 2, &self.session_key)?;
        Ok(offset)
    }
}

/// Session creation request.
pub type CreateSessionRequest = Request<CreateSessionRequestBody>;
/// Session creation response.
pub type CreateSessionResponse = Response<CreateSessionResponseBody>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_header_golden_encoding() {
        let header = XHeader::new("k", "v");
        assert_eq!(hex::encode(header.stable_bytes().unwrap()), "0a016b120176");
    }

    #[test]
    fn meta_header_golden_encoding() {
        let meta = MetaHeader {
            version: Some(Version { major: 2, minor: 11 }),
            epoch: 13,
            ttl: 2,
            x_headers: vec![XHeader::new("k", "v")],
            ..MetaHeader::default()
        };
        assert_eq!(
            hex::encode(meta.stable_bytes().unwrap()),
            "0a040802100b100d180222060a016b120176"
        );
    }

    #[test]
    fn wrap_links_and_decrements_ttl() {
        let first = MetaHeader {
            epoch: 7,
            ttl: 5,
            magic: 42,
            x_headers: vec![XHeader::new("trace", "abc")],
            ..MetaHeader::default()
        };
        let second = MetaHeader::wrap(first.clone());

        assert_eq!(second.ttl, 4);
        assert_eq!(second.epoch, 7);
        assert_eq!(second.magic, 42);
        assert!(second.x_headers.is_empty(), "x-headers are per-hop");
        assert_eq!(second.origin.as_deref(), Some(&first));
        assert_eq!(second.depth(), 2);
    }

    #[test]
    fn ttl_wrap_saturates_at_zero() {
        let exhausted = MetaHeader::wrap(MetaHeader::default());
        assert_eq!(exhausted.ttl, 0);
    }

    #[test]
    fn empty_session_token_is_still_emitted_when_present() {
        let meta = MetaHeader {
            session_token: Some(SessionToken(vec![])),
            ..MetaHeader::default()
        };
        // Presence is the Option: tag 2a (field 5, wire type 2), length 0.
        assert_eq!(hex::encode(meta.stable_bytes().unwrap()), "2a00");
    }

    #[test]
    fn verification_header_field_order_is_fixed() {
        let signature = |tag: u8| Signature {
            key: vec![0x02, tag],
            sign: vec![tag],
            ..Signature::default()
        };
        let root = VerificationHeader {
            meta_signature: signature(0x01),
            link: VerificationLink::Root {
                body_signature: signature(0x02),
            },
        };
        // body (field 1) before meta (field 2).
        assert_eq!(
            hex::encode(root.stable_bytes().unwrap()),
            "0a070a02020212010212070a020201120101"
        );

        let forwarded = VerificationHeader {
            meta_signature: signature(0x03),
            link: VerificationLink::Forwarded {
                origin_signature: signature(0x04),
                origin: Box::new(root.clone()),
            },
        };
        assert_eq!(forwarded.depth(), 2);
        assert_eq!(forwarded.origin(), Some(&root));
        assert!(forwarded.body_signature().is_none());
        assert_eq!(root.body_signature().map(|s| s.sign.as_slice()), Some(&[0x02u8][..]));
    }
}
