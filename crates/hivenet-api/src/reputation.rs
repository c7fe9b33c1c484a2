//! Reputation service message contracts.

use crate::encoding::{
    bytes_marshal, bytes_size, message_marshal, message_size, repeated_message_marshal,
    repeated_message_size, uint32_marshal, uint32_size, uint64_marshal, uint64_size, EncodeError,
    StableMessage,
};
use crate::session::{Request, Response};

/// Identifier of a network peer in reputation exchanges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerId {
    /// Peer's public key bytes.
    pub public_key: Vec<u8>,
}

impl StableMessage for PeerId {
    fn stable_size(&self) -> usize {
        bytes_size(1, &self.public_key)
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        bytes_marshal(buf, &mut offset, 1, &self.public_key)?;
        Ok(offset)
    }
}

/// A single trust assessment of one peer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trust {
    /// The assessed peer.
    pub peer: Option<PeerId>,
    /// Trust value, fixed-point in parts per million.
    pub value: u32,
}

impl StableMessage for Trust {
    fn stable_size(&self) -> usize {
        self.peer.as_ref().map_or(0, |peer| message_size(1, peer)) + uint32_size(2, self.value)
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        if let Some(peer) = &self.peer {
            message_marshal(buf, &mut offset, 1, peer)?;
        }
        uint32_marshal(buf, &mut offset, 2, self.value)?;
        Ok(offset)
    }
}

/// Body of a local trust announcement.
///
/// The `trusts` list is encoded in the order given; producing a canonical
/// ordering (if the service wants one) is the sender's responsibility
/// before signing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnounceTrustRequestBody {
    /// Epoch the trust values were computed for.
    pub epoch: u64,
    /// Trust assessments, one per peer.
    pub trusts: Vec<Trust>,
}

impl StableMessage for AnnounceTrustRequestBody {
    fn stable_size(&self) -> usize {
        uint64_size(1, self.epoch) + repeated_message_size(2, &self.trusts)
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        uint64_marshal(buf, &mut offset, 1, self.epoch)?;
        repeated_message_marshal(buf, &mut offset, 2, &self.trusts)?;
        Ok(offset)
    }
}

/// Body of a trust announcement reply; deliberately empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnounceTrustResponseBody;

impl StableMessage for AnnounceTrustResponseBody {
    fn stable_size(&self) -> usize {
        0
    }

    fn stable_marshal(&self, _buf: &mut [u8]) -> Result<usize, EncodeError> {
        Ok(0)
    }
}

/// Local trust announcement request.
pub type AnnounceTrustRequest = Request<AnnounceTrustRequestBody>;
/// Local trust announcement response.
pub type AnnounceTrustResponse = Response<AnnounceTrustResponseBody>;
