//! Signature scheme identifiers.

use thiserror::Error;

/// Identifies the signature scheme a [`crate::Signer`] produced.
///
/// The numeric tag travels on the wire inside every signature, so a
/// verifier can check a layer without out-of-band negotiation. Unknown
/// tags are rejected, never defaulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    /// ECDSA over P-256; the signed payload is prehashed with SHA-512.
    #[default]
    EcdsaSha512,
    /// Deterministic ECDSA (RFC 6979) over P-256 with SHA-256.
    EcdsaRfc6979Sha256,
}

/// An unrecognized signature scheme tag was encountered.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unknown signature scheme tag {tag}")]
pub struct UnknownSchemeError {
    /// The tag value that failed to resolve.
    pub tag: u64,
}

impl SignatureScheme {
    /// Returns the numeric tag carried on the wire.
    #[must_use]
    pub const fn wire_tag(self) -> u64 {
        match self {
            Self::EcdsaSha512 => 0,
            Self::EcdsaRfc6979Sha256 => 1,
        }
    }

    /// Resolves a wire tag back to a scheme.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownSchemeError`] for tags this crate does not
    /// implement.
    pub const fn from_wire_tag(tag: u64) -> Result<Self, UnknownSchemeError> {
        match tag {
            0 => Ok(Self::EcdsaSha512),
            1 => Ok(Self::EcdsaRfc6979Sha256),
            _ => Err(UnknownSchemeError { tag }),
        }
    }
}
