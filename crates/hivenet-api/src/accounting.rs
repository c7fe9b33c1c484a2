//! Accounting service message contracts.

use crate::encoding::{
    int64_marshal, int64_size, message_marshal, message_size, uint32_marshal, uint32_size,
    EncodeError, StableMessage,
};
use crate::refs::OwnerId;
use crate::session::{Request, Response};

/// Fixed-point decimal balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decimal {
    /// Value scaled by `10^precision`.
    pub value: i64,
    /// Number of decimal digits after the point.
    pub precision: u32,
}

impl StableMessage for Decimal {
    fn stable_size(&self) -> usize {
        int64_size(1, self.value) + uint32_size(2, self.precision)
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        int64_marshal(buf, &mut offset, 1, self.value)?;
        uint32_marshal(buf, &mut offset, 2, self.precision)?;
        Ok(offset)
    }
}

/// Body of a balance query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceRequestBody {
    /// Account to query.
    pub owner_id: Option<OwnerId>,
}

impl StableMessage for BalanceRequestBody {
    fn stable_size(&self) -> usize {
        self.owner_id
            .as_ref()
            .map_or(0, |owner_id| message_size(1, owner_id))
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        if let Some(owner_id) = &self.owner_id {
            message_marshal(buf, &mut offset, 1, owner_id)?;
        }
        Ok(offset)
    }
}

/// Body of a balance reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceResponseBody {
    /// Current account balance.
    pub balance: Option<Decimal>,
}

impl StableMessage for BalanceResponseBody {
    fn stable_size(&self) -> usize {
        self.balance
            .as_ref()
            .map_or(0, |balance| message_size(1, balance))
    }

    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut offset = 0;
        if let Some(balance) = &self.balance {
            message_marshal(buf, &mut offset, 1, balance)?;
        }
        Ok(offset)
    }
}

/// Balance query request.
pub type BalanceRequest = Request<BalanceRequestBody>;
/// Balance query response.
pub type BalanceResponse = Response<BalanceResponseBody>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_request_body_golden_encoding() {
        let body = BalanceRequestBody {
            owner_id: Some(OwnerId {
                value: vec![0x01, 0x02, 0x03],
            }),
        };
        assert_eq!(hex::encode(body.stable_bytes().unwrap()), "0a050a03010203");
    }

    #[test]
    fn negative_balance_uses_full_width_varint() {
        let body = BalanceResponseBody {
            balance: Some(Decimal {
                value: -1,
                precision: 0,
            }),
        };
        assert_eq!(
            hex::encode(body.stable_bytes().unwrap()),
            "0a0b08ffffffffffffffffff01"
        );
    }
}
