//! The nested header signing and verification engine.
//!
//! [`sign_service_message`] adds one verification layer to a message;
//! [`verify_service_message`] walks all layers from outermost to
//! innermost. Both are synchronous, CPU-bound, and free of shared state:
//! safe to call from any number of threads on independently-owned
//! messages.
//!
//! # Signing
//!
//! At the originating hop (no verification header yet) the pass signs the
//! body's canonical bytes and the meta header's canonical bytes. At a
//! forwarding hop the pass signs the meta header and the *entire* received
//! verification header, which becomes the `origin` of the new outer layer;
//! the body is never re-signed — its signature lives only in the innermost
//! layer.
//!
//! The caller must finalize body and meta before signing, and at a
//! forwarding hop must already have wrapped the received meta header (see
//! [`MetaHeader::wrap`]). Mutating signed bytes afterwards is a caller
//! error that verification will detect and reject.
//!
//! # Verification
//!
//! Each layer checks the meta signature against the parallel
//! [`MetaHeader`] chain node, then either the body signature (innermost)
//! or the origin signature plus a recursive step inward. A single failing
//! signature rejects the whole message — there is no partial trust and no
//! retry at this layer. The error names the failing check and its
//! zero-based depth for diagnosability.

use thiserror::Error;
use tracing::{debug, trace};

use hivenet_crypto::{verify_signature, Signer};

use crate::encoding::{EncodeError, StableMessage};
use crate::refs::Signature;
use crate::session::{Envelope, MetaHeader, VerificationHeader, VerificationLink};

/// Errors produced while adding a verification layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SignError {
    /// A payload could not be canonically encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The signer rejected the operation.
    #[error(transparent)]
    Crypto(#[from] hivenet_crypto::SignError),
}

/// Errors produced while verifying a message.
///
/// Any variant means the message must be rejected; the distinctions exist
/// for diagnosability, not for differentiated handling.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VerifyError {
    /// The message carries no verification header at all.
    #[error("message has no verification header")]
    MissingVerifyHeader,

    /// The meta signature of the layer at `depth` does not check out.
    #[error("meta header signature invalid at depth {depth}: {source}")]
    MetaSignature {
        /// Zero-based layer depth, outermost first.
        depth: usize,
        /// The underlying signature failure.
        source: hivenet_crypto::VerifyError,
    },

    /// The origin signature of the layer at `depth` does not check out.
    #[error("origin header signature invalid at depth {depth}: {source}")]
    OriginSignature {
        /// Zero-based layer depth, outermost first.
        depth: usize,
        /// The underlying signature failure.
        source: hivenet_crypto::VerifyError,
    },

    /// The innermost body signature does not check out.
    #[error("body signature invalid at depth {depth}: {source}")]
    BodySignature {
        /// Zero-based depth of the innermost layer.
        depth: usize,
        /// The underlying signature failure.
        source: hivenet_crypto::VerifyError,
    },

    /// The meta and verification chains have different depths.
    #[error("meta and verification header chains diverge at depth {depth}")]
    DepthMismatch {
        /// Zero-based depth at which one chain ended early.
        depth: usize,
    },

    /// A payload could not be canonically re-encoded for checking.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Adds one verification layer to `message`, replacing its verification
/// header.
///
/// # Errors
///
/// Returns [`SignError`] if a payload fails to encode or the signer fails.
/// On error the message is left unchanged.
pub fn sign_service_message<E: Envelope>(
    signer: &dyn Signer,
    message: &mut E,
) -> Result<(), SignError> {
    // Root layers sign the body; forwarding layers sign the displaced
    // header instead. Compute every signature before mutating the message
    // so a failure leaves it intact.
    let layer_signature = match message.verify_header() {
        None => sign_payload(signer, message.body())?,
        Some(origin) => sign_payload(signer, origin)?,
    };
    let meta_signature = sign_payload(signer, message.meta_header())?;

    let link = match message.take_verify_header() {
        None => VerificationLink::Root {
            body_signature: layer_signature,
        },
        Some(origin) => VerificationLink::Forwarded {
            origin_signature: layer_signature,
            origin: Box::new(origin),
        },
    };
    message.set_verify_header(VerificationHeader {
        meta_signature,
        link,
    });
    trace!(
        depth = message.verify_header().map_or(0, VerificationHeader::depth),
        "verification layer added"
    );
    Ok(())
}

/// Verifies every signature layer of `message`, outermost to innermost.
///
/// # Errors
///
/// Returns the first failing check; see [`VerifyError`]. A depth mismatch
/// between the meta and verification chains is a protocol violation of
/// the same severity as a bad signature.
pub fn verify_service_message<E: Envelope>(message: &E) -> Result<(), VerifyError> {
    let header = message
        .verify_header()
        .ok_or(VerifyError::MissingVerifyHeader)?;
    verify_layer(message.body(), Some(message.meta_header()), header, 0)
}

fn sign_payload(
    signer: &dyn Signer,
    payload: &impl StableMessage,
) -> Result<Signature, SignError> {
    let bytes = payload.stable_bytes()?;
    let sign = signer.sign(&bytes)?;
    Ok(Signature {
        key: signer.public_key(),
        sign,
        scheme: signer.scheme(),
    })
}

/// Re-encodes `payload` and checks `signature` over it, reporting a
/// cryptographic failure through `reject`.
fn check_signature(
    payload: &impl StableMessage,
    signature: &Signature,
    reject: impl FnOnce(hivenet_crypto::VerifyError) -> VerifyError,
) -> Result<(), VerifyError> {
    let bytes = payload.stable_bytes()?;
    verify_signature(signature.scheme, &signature.key, &bytes, &signature.sign).map_err(reject)
}

fn verify_layer<B: StableMessage>(
    body: &B,
    meta: Option<&MetaHeader>,
    header: &VerificationHeader,
    depth: usize,
) -> Result<(), VerifyError> {
    // The verification chain continues here; the meta chain must too.
    let Some(meta) = meta else {
        debug!(depth, "verification rejected: meta chain ended early");
        return Err(VerifyError::DepthMismatch { depth });
    };

    check_signature(meta, &header.meta_signature, |source| {
        debug!(depth, %source, "verification rejected: meta header signature");
        VerifyError::MetaSignature { depth, source }
    })?;
    trace!(depth, "meta header signature verified");

    match &header.link {
        VerificationLink::Root { body_signature } => {
            if meta.origin.is_some() {
                debug!(depth, "verification rejected: verification chain ended early");
                return Err(VerifyError::DepthMismatch { depth: depth + 1 });
            }
            check_signature(body, body_signature, |source| {
                debug!(depth, %source, "verification rejected: body signature");
                VerifyError::BodySignature { depth, source }
            })?;
            trace!(depth, "body signature verified");
            Ok(())
        },
        VerificationLink::Forwarded {
            origin_signature,
            origin,
        } => {
            check_signature(origin.as_ref(), origin_signature, |source| {
                debug!(depth, %source, "verification rejected: origin header signature");
                VerifyError::OriginSignature { depth, source }
            })?;
            trace!(depth, "origin header signature verified");
            verify_layer(body, meta.origin.as_deref(), origin, depth + 1)
        },
    }
}
