//! Shared reference types used across all HiveNet services.

use hivenet_crypto::SignatureScheme;

use crate::encoding::{
    bytes_marshal, bytes_size, message_marshal, message_size, uint32_marshal, uint32_size,
    uint64_marshal, uint64_size, EncodeError, StableMessage,
};

/// Protocol version of the message originator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Version {
    /// Major version, incompatible changes.
    pub major: u32,
    /// Minor version, backwards-compatible changes.
    pub minor: u32,
}

impl StableMessage for Version {
    fn stable_size(&self) -> usize {
        uint32_size(1, self.major) + uint32_size(2, self.minor)
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        uint32_marshal(buf, &mut offset, 1, self.major)?;
        uint32_marshal(buf, &mut offset, 2, self.minor)?;
        Ok(offset)
    }
}

/// Identifier of an account owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerId {
    /// Raw identifier bytes.
    pub value: Vec<u8>,
}

impl StableMessage for OwnerId {
    fn stable_size(&self) -> usize {
        bytes_size(1, &self.value)
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        bytes_marshal(buf, &mut offset, 1, &self.value)?;
        Ok(offset)
    }
}

/// Identifier of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerId {
    /// Raw identifier bytes.
    pub value: Vec<u8>,
}

impl StableMessage for ContainerId {
    fn stable_size(&self) -> usize {
        bytes_size(1, &self.value)
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        bytes_marshal(buf, &mut offset, 1, &self.value)?;
        Ok(offset)
    }
}

/// Identifier of a stored object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectId {
    /// Raw identifier bytes.
    pub value: Vec<u8>,
}

impl StableMessage for ObjectId {
    fn stable_size(&self) -> usize {
        bytes_size(1, &self.value)
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        bytes_marshal(buf, &mut offset, 1, &self.value)?;
        Ok(offset)
    }
}

/// Full address of an object: the container holding it plus its identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    /// Container the object lives in.
    pub container_id: Option<ContainerId>,
    /// The object itself.
    pub object_id: Option<ObjectId>,
}

impl StableMessage for Address {
    fn stable_size(&self) -> usize {
        let mut size = 0;
        if let Some(container_id) = &self.container_id {
            size += message_size(1, container_id);
        }
        if let Some(object_id) = &self.object_id {
            size += message_size(2, object_id);
        }
        size
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        if let Some(container_id) = &self.container_id {
            message_marshal(buf, &mut offset, 1, container_id)?;
        }
        if let Some(object_id) = &self.object_id {
            message_marshal(buf, &mut offset, 2, object_id)?;
        }
        Ok(offset)
    }
}

/// A signature over some canonical byte sequence.
///
/// Immutable once created; owned by the verification-header slot that
/// created it. The embedded public key lets a verifier check the layer
/// without any key directory, and the scheme tag says how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    /// Public key of the signer, SEC1 compressed.
    pub key: Vec<u8>,
    /// Raw signature bytes.
    pub sign: Vec<u8>,
    /// Scheme the signature was produced under.
    pub scheme: SignatureScheme,
}

impl StableMessage for Signature {
    fn stable_size(&self) -> usize {
        bytes_size(1, &self.key)
            + bytes_size(2, &self.sign)
            + uint64_size(3, self.scheme.wire_tag())
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        bytes_marshal(buf, &mut offset, 1, &self.key)?;
        bytes_marshal(buf, &mut offset, 2, &self.sign)?;
        uint64_marshal(buf, &mut offset, 3, self.scheme.wire_tag())?;
        Ok(offset)
    }
}
