//! Object service message contracts.

use crate::encoding::{
    bool_marshal, bool_size, bytes_marshal, bytes_size, message_marshal, message_size,
    EncodeError, StableMessage,
};
use crate::refs::{Address, ObjectId};
use crate::session::{Request, Response};

/// Body of an object fetch request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetObjectRequestBody {
    /// Address of the requested object.
    pub address: Option<Address>,
    /// When set, return the object physically stored on the node without
    /// reassembling it.
    pub raw: bool,
}

impl StableMessage for GetObjectRequestBody {
    fn stable_size(&self) -> usize {
        self.address
            .as_ref()
            .map_or(0, |address| message_size(1, address))
            + bool_size(2, self.raw)
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        if let Some(address) = &self.address {
            message_marshal(buf, &mut offset, 1, address)?;
        }
        bool_marshal(buf, &mut offset, 2, self.raw)?;
        Ok(offset)
    }
}

/// Body of an object fetch reply: one chunk of the payload stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetObjectResponseBody {
    /// Raw payload chunk.
    pub chunk: Vec<u8>,
}

impl StableMessage for GetObjectResponseBody {
    fn stable_size(&self) -> usize {
        bytes_size(1, &self.chunk)
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        bytes_marshal(buf, &mut offset, 1, &self.chunk)?;
        Ok(offset)
    }
}

/// Body of an object store request: one chunk of the payload stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutObjectRequestBody {
    /// Raw payload chunk.
    pub chunk: Vec<u8>,
}

impl StableMessage for PutObjectRequestBody {
    fn stable_size(&self) -> usize {
        bytes_size(1, &self.chunk)
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        bytes_marshal(buf, &mut offset, 1, &self.chunk)?;
        Ok(offset)
    }
}

/// Body of an object store reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutObjectResponseBody {
    /// Identifier assigned to the stored object.
    pub object_id: Option<ObjectId>,
}

impl StableMessage for PutObjectResponseBody {
    fn stable_size(&self) -> usize {
        self.object_id
            .as_ref()
            .map_or(0, |object_id| message_size(1, object_id))
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        if let Some(object_id) = &self.object_id {
            message_marshal(buf, &mut offset, 1, object_id)?;
        }
        Ok(offset)
    }
}

/// Object fetch request.
pub type GetObjectRequest = Request<GetObjectRequestBody>;
/// Object fetch response.
pub type GetObjectResponse = Response<GetObjectResponseBody>;
/// Object store request.
pub type PutObjectRequest = Request<PutObjectRequestBody>;
/// Object store response.
pub type PutObjectResponse = Response<PutObjectResponseBody>;
