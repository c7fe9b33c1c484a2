//! ECDSA P-256 signing and verification.
//!
//! Public keys travel as 33-byte SEC1 compressed points; signatures as the
//! fixed 64-byte `r || s` form. Malformed keys and signatures produce typed
//! errors, never panics — both arrive from the network inside verification
//! headers and must be treated as attacker-controlled.

use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::signature::{Signer as _, Verifier as _};
use p256::ecdsa::{Signature as P256Signature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha512};
use thiserror::Error;

use crate::SignatureScheme;

/// Length of a SEC1 compressed P-256 public key in bytes.
pub const PUBLIC_KEY_LEN: usize = 33;

/// Length of a fixed-form `r || s` P-256 signature in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Errors produced while signing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SignError {
    /// The supplied secret scalar bytes do not form a valid P-256 key.
    #[error("malformed secret key: {reason}")]
    MalformedSecretKey {
        /// Reason reported by the underlying curve implementation.
        reason: String,
    },

    /// The curve implementation rejected the signing operation.
    #[error("signing failed: {reason}")]
    Failed {
        /// Reason reported by the underlying curve implementation.
        reason: String,
    },
}

/// Errors produced while verifying a signature.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VerifyError {
    /// The public key bytes could not be parsed as a SEC1 point.
    #[error("malformed public key ({got} bytes): {reason}")]
    MalformedPublicKey {
        /// Length of the rejected key material.
        got: usize,
        /// Reason reported by the underlying curve implementation.
        reason: String,
    },

    /// The signature bytes are not a valid fixed-form signature.
    #[error("malformed signature: expected {SIGNATURE_LEN} bytes, got {got}")]
    MalformedSignature {
        /// Length of the rejected signature material.
        got: usize,
    },

    /// The signature is well-formed but does not match the data and key.
    #[error("signature mismatch")]
    Mismatch,
}

/// A capability to sign byte sequences under some public-key scheme.
///
/// The header-signing engine is generic over this trait; it never sees key
/// material, only the scheme tag, the public key bytes to embed in the
/// signature, and the signing operation itself.
pub trait Signer {
    /// The scheme this signer produces signatures under.
    fn scheme(&self) -> SignatureScheme;

    /// The public key bytes to embed alongside each signature.
    fn public_key(&self) -> Vec<u8>;

    /// Signs `data`, returning the raw signature bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::Failed`] if the underlying scheme rejects the
    /// operation.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignError>;
}

/// ECDSA P-256 signer over a caller-supplied private key.
#[derive(Debug, Clone)]
pub struct EcdsaSigner {
    key: SigningKey,
    scheme: SignatureScheme,
}

impl EcdsaSigner {
    /// Wraps an existing signing key.
    #[must_use]
    pub const fn new(key: SigningKey, scheme: SignatureScheme) -> Self {
        Self { key, scheme }
    }

    /// Builds a signer from a big-endian secret scalar.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::MalformedSecretKey`] if the bytes are not a
    /// valid non-zero scalar.
    pub fn from_secret_bytes(
        bytes: &[u8],
        scheme: SignatureScheme,
    ) -> Result<Self, SignError> {
        let key = SigningKey::from_slice(bytes).map_err(|e| SignError::MalformedSecretKey {
            reason: e.to_string(),
        })?;
        Ok(Self { key, scheme })
    }

    /// Generates a fresh signer from OS randomness.
    #[must_use]
    pub fn generate(scheme: SignatureScheme) -> Self {
        Self {
            key: SigningKey::random(&mut rand::rngs::OsRng),
            scheme,
        }
    }

    /// Returns the verifying half of the key pair.
    #[must_use]
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.key.verifying_key()
    }
}

impl Signer for EcdsaSigner {
    fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    fn public_key(&self) -> Vec<u8> {
        self.verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignError> {
        let signature: P256Signature = match self.scheme {
            SignatureScheme::EcdsaSha512 => self
                .key
                .sign_prehash(&Sha512::digest(data))
                .map_err(|e| SignError::Failed {
                    reason: e.to_string(),
                })?,
            SignatureScheme::EcdsaRfc6979Sha256 => {
                self.key.try_sign(data).map_err(|e| SignError::Failed {
                    reason: e.to_string(),
                })?
            },
        };
        Ok(signature.to_bytes().to_vec())
    }
}

/// Verifies `signature` over `data` under `public_key` and `scheme`.
///
/// # Errors
///
/// Returns [`VerifyError::MalformedPublicKey`] or
/// [`VerifyError::MalformedSignature`] when the inputs cannot be parsed,
/// and [`VerifyError::Mismatch`] when the signature does not check out.
pub fn verify_signature(
    scheme: SignatureScheme,
    public_key: &[u8],
    data: &[u8],
    signature: &[u8],
) -> Result<(), VerifyError> {
    let key =
        VerifyingKey::from_sec1_bytes(public_key).map_err(|e| VerifyError::MalformedPublicKey {
            got: public_key.len(),
            reason: e.to_string(),
        })?;
    let signature = P256Signature::from_slice(signature).map_err(|_| {
        VerifyError::MalformedSignature {
            got: signature.len(),
        }
    })?;
    let checked = match scheme {
        SignatureScheme::EcdsaSha512 => key.verify_prehash(&Sha512::digest(data), &signature),
        SignatureScheme::EcdsaRfc6979Sha256 => key.verify(data, &signature),
    };
    checked.map_err(|_| VerifyError::Mismatch)
}
