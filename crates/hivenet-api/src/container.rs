//! Container service message contracts.
//!
//! Container bodies are carried as opaque payloads: their inner structure
//! belongs to the container service and plays no part in the signing
//! mechanics.

use crate::encoding::{
    bytes_marshal, bytes_size, message_marshal, message_size, EncodeError, StableMessage,
};
use crate::refs::{ContainerId, Signature};
use crate::session::{Request, Response};

/// Body of a container creation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutContainerRequestBody {
    /// Marshaled container structure, carried verbatim.
    pub container: Vec<u8>,
    /// Owner's signature over the container payload.
    pub signature: Option<Signature>,
}

impl StableMessage for PutContainerRequestBody {
    fn stable_size(&self) -> usize {
        bytes_size(1, &self.container)
            + self
                .signature
                .as_ref()
                .map_or(0, |signature| message_size(2, signature))
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        bytes_marshal(buf, &mut offset, 1, &self.container)?;
        if let Some(signature) = &self.signature {
            message_marshal(buf, &mut offset, 2, signature)?;
        }
        Ok(offset)
    }
}

/// Body of a container creation reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutContainerResponseBody {
    /// Identifier assigned to the stored container.
    pub container_id: Option<ContainerId>,
}

impl StableMessage for PutContainerResponseBody {
    fn stable_size(&self) -> usize {
        self.container_id
            .as_ref()
            .map_or(0, |container_id| message_size(1, container_id))
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        if let Some(container_id) = &self.container_id {
            message_marshal(buf, &mut offset, 1, container_id)?;
        }
        Ok(offset)
    }
}

/// Body of a container fetch request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetContainerRequestBody {
    /// Container to fetch.
    pub container_id: Option<ContainerId>,
}

impl StableMessage for GetContainerRequestBody {
    fn stable_size(&self) -> usize {
        self.container_id
            .as_ref()
            .map_or(0, |container_id| message_size(1, container_id))
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        if let Some(container_id) = &self.container_id {
            message_marshal(buf, &mut offset, 1, container_id)?;
        }
        Ok(offset)
    }
}

/// Body of a container fetch reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetContainerResponseBody {
    /// Marshaled container structure, carried verbatim.
    pub container: Vec<u8>,
}

impl StableMessage for GetContainerResponseBody {
    fn stable_size(&self) -> usize {
        bytes_size(1, &self.container)
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        bytes_marshal(buf, &mut offset, 1, &self.container)?;
        Ok(offset)
    }
}

/// Container creation request.
pub type PutContainerRequest = Request<PutContainerRequestBody>;
/// Container creation response.
pub type PutContainerResponse = Response<PutContainerResponseBody>;
/// Container fetch request.
pub type GetContainerRequest = Request<GetContainerRequestBody>;
/// Container fetch response.
pub type GetContainerResponse = Response<GetContainerResponseBody>;
