//! # hivenet-api
//!
//! Wire-level message contracts for the HiveNet RPC API and the mechanism
//! that lets any request or response be deterministically serialized and
//! cryptographically signed as it crosses intermediary nodes.
//!
//! Two leaf concerns and one composition:
//!
//! - [`encoding`] — the stable encoder: protobuf-wire-compatible output
//!   that is bit-for-bit reproducible for a given field content,
//!   independent of map ordering or encoder library quirks. Every message
//!   type here implements [`encoding::StableMessage`].
//! - `hivenet-crypto` — the signature primitive behind the
//!   [`hivenet_crypto::Signer`] seam.
//! - [`signing`] — the nested ("matryoshka") header engine composing the
//!   two: [`signing::sign_service_message`] adds one verification layer
//!   per hop, [`signing::verify_service_message`] walks the layers
//!   outermost to innermost.
//!
//! The service modules ([`accounting`], [`container`], [`object`],
//! [`reputation`], plus the session service in [`session`]) define the
//! request/response bodies; their business semantics are opaque to the
//! signing mechanics.
//!
//! # Example
//!
//! ```
//! use hivenet_api::accounting::{BalanceRequest, BalanceRequestBody};
//! use hivenet_api::session::MetaHeader;
//! use hivenet_api::signing::{sign_service_message, verify_service_message};
//! use hivenet_crypto::{EcdsaSigner, SignatureScheme};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let signer = EcdsaSigner::generate(SignatureScheme::EcdsaRfc6979Sha256);
//!
//! // Originating hop: build, then sign.
//! let meta = MetaHeader { ttl: 2, ..MetaHeader::default() };
//! let mut request = BalanceRequest::new(BalanceRequestBody::default(), meta);
//! sign_service_message(&signer, &mut request)?;
//!
//! // Any receiver on the path:
//! verify_service_message(&request)?;
//! # Ok(())
//! # }
//! ```

pub mod accounting;
pub mod container;
pub mod encoding;
pub mod object;
pub mod refs;
pub mod reputation;
pub mod session;
pub mod signing;

pub use encoding::{EncodeError, StableMessage};
pub use session::{
    Envelope, MetaHeader, Request, Response, VerificationHeader, VerificationLink, XHeader,
};
pub use signing::{sign_service_message, verify_service_message, SignError, VerifyError};
