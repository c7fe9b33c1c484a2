//! # hivenet-crypto
//!
//! Public-key signature primitives for the HiveNet RPC API.
//!
//! This crate is the cryptographic leaf of the API stack: it knows how to
//! produce and check signatures over byte slices, and nothing about the
//! messages those bytes came from. The header-signing engine in
//! `hivenet-api` drives it through two seams:
//!
//! - [`Signer`] — a capability-typed signing interface. Anything that can
//!   turn `(private key, bytes)` into signature bytes and expose the
//!   matching public key can sign service messages.
//! - [`verify_signature`] — the stateless counterpart, checking
//!   `(public key, bytes, signature)` for a given [`SignatureScheme`].
//!
//! The reference implementation is ECDSA over NIST P-256 ([`EcdsaSigner`]).
//! Both supported schemes are deterministic (RFC 6979 nonces), so signing
//! the same bytes with the same key always yields the same signature —
//! which keeps golden test vectors stable across runs and platforms.
//!
//! Key lifecycle, storage, and protection are explicitly out of scope;
//! callers supply key material as read-only input.

mod ecdsa;
mod scheme;

pub use ecdsa::{
    EcdsaSigner, SignError, Signer, VerifyError, verify_signature, PUBLIC_KEY_LEN, SIGNATURE_LEN,
};
pub use scheme::{SignatureScheme, UnknownSchemeError};
