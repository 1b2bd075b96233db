//! # Certwright - X.509 Certificate Builder
//!
//! Certwright builds, signs, parses and verifies X.509 v3 certificates with
//! the rustcrypto libraries. Its builder follows the construction rules of
//! OpenSSL's certificate object:
//!
//! - a dirty flag tracks whether the builder still matches its signature,
//!   and [`verify`](cert::Certificate::verify) answers `false` while it does
//!   not;
//! - Subject Alternative Names added twice are merged into one extension;
//! - the public key of a parsed certificate stays encoded until it is used.
//!
//! ## Supported Key Types
//!
//! - **RSA** (PKCS#1 v1.5 signatures with MD5, SHA-1 and SHA-2)
//! - **DSA** (SHA-1, SHA-224, SHA-256)
//! - **ECDSA**: P-256 and P-384 curves
//!
//! Keys are imported from PKCS#8; generating keys is left to other tools.
//!
//! ## Signing a Certificate
//!
//! ```rust,no_run
//! use certwright::cert::Certificate;
//! use certwright::cert::params::{DistinguishedName, Validity};
//! use certwright::digest::MessageDigest;
//! use certwright::key::KeyPair;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let key = KeyPair::from_pkcs8_pem(&std::fs::read_to_string("key.pem")?)?;
//!
//! let subject = DistinguishedName::builder()
//!     .common_name("example.com")
//!     .organization("Example Corp")
//!     .country("US")
//!     .build()
//!     .to_name()?;
//!
//! let mut cert = Certificate::new();
//! cert.set_serial(1u32.into());
//! cert.set_subject(subject.clone());
//! cert.set_issuer(subject);
//! cert.set_validity(&Validity::for_days(365));
//! cert.set_public_key(&key)?;
//! cert.sign(&key, MessageDigest::Sha256)?;
//!
//! println!("{}", cert.to_pem()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Parsing and Re-signing
//!
//! ```rust,no_run
//! use certwright::cert::Certificate;
//! use certwright::digest::MessageDigest;
//! use certwright::key::KeyPair;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut cert = Certificate::parse(&std::fs::read("cert.pem")?)?;
//! let key = KeyPair::from_pkcs8_pem(&std::fs::read_to_string("key.pem")?)?;
//!
//! assert!(cert.verify(&key)?);
//! cert.set_serial_str("1001")?;
//! assert!(!cert.verify(&key)?); // edited since signing
//!
//! cert.sign(&key, MessageDigest::Sha384)?;
//! assert!(cert.verify(&key)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`error::CertwrightError`]:
//!
//! ```rust
//! use certwright::cert::Certificate;
//! use certwright::error::CertwrightError;
//!
//! match Certificate::parse(b"not a certificate") {
//!     Ok(_) => unreachable!(),
//!     Err(CertwrightError::CertificateDecodeError(msg)) => println!("bad input: {msg}"),
//!     Err(e) => println!("other error: {e}"),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`cert`]: The certificate builder, parsing, signing, names and extensions
//! - [`key`]: Key import and the signing/verification primitives
//! - [`digest`]: Message digests
//! - [`registry`]: Extension factories and OID name resolution
//! - [`config`]: The collaborators injected into a certificate
//! - [`tbs_certificate`]: Assembly of the to-be-signed structure
//! - [`error`]: Error types

pub mod cert;
pub mod config;
pub mod digest;
pub mod error;
pub mod key;
pub mod pem_utils;
pub mod registry;
pub mod tbs_certificate;
