//! The mutable certificate builder.
//!
//! A [`Certificate`] collects serial, names, validity, public key and
//! extensions, and keeps a dirty flag recording whether anything changed
//! since it was last signed or parsed. Signing (see [`sign`]) produces a
//! [`SignedCertificate`] that stays attached to the builder; it remains
//! serializable after further edits, but [`Certificate::verify`] refuses to
//! vouch for it until the builder is signed again.
//!
//! ```rust,no_run
//! use certwright::cert::Certificate;
//! use certwright::cert::extensions::{ExtensionEntry, SubjectAltName};
//! use certwright::cert::name::Name;
//! use certwright::digest::MessageDigest;
//! use certwright::key::KeyPair;
//! use time::OffsetDateTime;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let key = KeyPair::from_pkcs8_pem(&std::fs::read_to_string("ca-key.pem")?)?;
//! let name = Name::parse("/CN=example.com")?;
//!
//! let mut cert = Certificate::new();
//! cert.set_serial(42u32.into());
//! cert.set_subject(name.clone());
//! cert.set_issuer(name);
//! cert.set_not_before(OffsetDateTime::now_utc());
//! cert.set_not_after(OffsetDateTime::now_utc() + time::Duration::days(30));
//! cert.set_public_key(&key)?;
//! cert.add_extension(ExtensionEntry::from_extension(
//!     &SubjectAltName::dns(["example.com"]),
//!     false,
//! )?)?;
//! cert.sign(&key, MessageDigest::Sha256)?;
//!
//! assert!(cert.verify(&key)?);
//! println!("{}", cert.to_pem()?);
//! # Ok(())
//! # }
//! ```

pub mod extensions;
pub mod name;
pub mod params;
pub mod parse;
pub mod sign;
pub mod signed;
pub mod text;

use core::fmt;
use core::str::FromStr;

use const_oid::ObjectIdentifier;
use num_bigint::BigInt;
use time::{Duration, OffsetDateTime, UtcOffset};

pub use crate::error::Result;
use crate::config::CertificateConfig;
use crate::error::CertwrightError;
use crate::key::{PublicKey, PublicKeyHolder};
use crate::tbs_certificate::TbsCertificate;
use extensions::{ExtensionEntry, merge_general_names};
use name::Name;
use params::Validity;
pub use signed::SignedCertificate;

/// Subject Alternative Name, the one extension that is merged rather than
/// appended.
const SUBJECT_ALT_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.17");

/// Whether the builder matches its signed artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateState {
    /// Edited since the last sign or parse, or never signed.
    Draft,
    /// Freshly signed or parsed.
    Signed,
}

/// An X.509 certificate under construction.
#[derive(Clone)]
pub struct Certificate {
    config: CertificateConfig,
    generator: TbsCertificate,
    serial: BigInt,
    subject: Option<Name>,
    issuer: Option<Name>,
    not_before: Option<OffsetDateTime>,
    not_after: Option<OffsetDateTime>,
    public_key: Option<PublicKey>,
    public_key_algorithm: Option<String>,
    public_key_encoded: Option<Vec<u8>>,
    version: Option<u32>,
    signature_algorithm: Option<String>,
    extensions: Vec<ExtensionEntry>,
    signed: Option<SignedCertificate>,
    dirty: bool,
}

impl Default for Certificate {
    fn default() -> Self {
        Self::with_config(CertificateConfig::default())
    }
}

/// Converts to UTC and drops the sub-second part.
fn truncate_to_second(value: OffsetDateTime) -> OffsetDateTime {
    let utc = value.to_offset(UtcOffset::UTC);
    utc - Duration::nanoseconds(i64::from(utc.nanosecond()))
}

impl Certificate {
    /// An empty draft using the default [`CertificateConfig`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CertificateConfig) -> Self {
        Self {
            config,
            generator: TbsCertificate::new(),
            serial: BigInt::from(0),
            subject: None,
            issuer: None,
            not_before: None,
            not_after: None,
            public_key: None,
            public_key_algorithm: None,
            public_key_encoded: None,
            version: None,
            signature_algorithm: None,
            extensions: Vec::new(),
            signed: None,
            dirty: true,
        }
    }

    pub fn config(&self) -> &CertificateConfig {
        &self.config
    }

    pub fn serial(&self) -> &BigInt {
        &self.serial
    }

    /// Sets the serial number.
    ///
    /// A serial of zero is stored and generated as one. The certificate is
    /// always generated with the absolute value.
    pub fn set_serial(&mut self, serial: BigInt) {
        if serial != self.serial {
            self.dirty = true;
        }
        let serial = if serial == BigInt::from(0) {
            BigInt::from(1)
        } else {
            serial
        };
        self.generator.serial_number = Some(serial.magnitude().clone());
        self.serial = serial;
    }

    /// [`set_serial`](Self::set_serial) from a decimal string.
    pub fn set_serial_str(&mut self, serial: &str) -> Result<()> {
        let value = BigInt::from_str(serial.trim()).map_err(|_| {
            CertwrightError::TypeMismatch(format!("integer expected but got '{serial}'"))
        })?;
        self.set_serial(value);
        Ok(())
    }

    pub fn subject(&self) -> Option<&Name> {
        self.subject.as_ref()
    }

    pub fn set_subject(&mut self, subject: Name) {
        if self.subject.as_ref() != Some(&subject) {
            self.dirty = true;
        }
        self.generator.subject = Some(subject.clone());
        self.subject = Some(subject);
    }

    pub fn issuer(&self) -> Option<&Name> {
        self.issuer.as_ref()
    }

    pub fn set_issuer(&mut self, issuer: Name) {
        if self.issuer.as_ref() != Some(&issuer) {
            self.dirty = true;
        }
        self.generator.issuer = Some(issuer.clone());
        self.issuer = Some(issuer);
    }

    pub fn not_before(&self) -> Option<OffsetDateTime> {
        self.not_before
    }

    /// Sets the start of validity, in UTC with whole seconds. Always marks
    /// the certificate dirty.
    ///
    /// Dates before 1970 are accepted here but fail at signing time with
    /// [`CertwrightError::CertificateSigningError`].
    pub fn set_not_before(&mut self, not_before: OffsetDateTime) {
        self.dirty = true;
        let value = truncate_to_second(not_before);
        self.generator.not_before = Some(value);
        self.not_before = Some(value);
    }

    pub fn not_after(&self) -> Option<OffsetDateTime> {
        self.not_after
    }

    /// Sets the end of validity, in UTC with whole seconds. Always marks
    /// the certificate dirty.
    ///
    /// Dates before 1970 are accepted here but fail at signing time with
    /// [`CertwrightError::CertificateSigningError`].
    pub fn set_not_after(&mut self, not_after: OffsetDateTime) {
        self.dirty = true;
        let value = truncate_to_second(not_after);
        self.generator.not_after = Some(value);
        self.not_after = Some(value);
    }

    pub fn set_validity(&mut self, validity: &Validity) {
        self.set_not_before(validity.not_before);
        self.set_not_after(validity.not_after);
    }

    /// The subject public key.
    ///
    /// For a parsed certificate the key is built on first access from the
    /// encoded `SubjectPublicKeyInfo`; only RSA and DSA keys can be built
    /// this way. Building it does not mark the certificate dirty.
    pub fn public_key(&mut self) -> Result<PublicKey> {
        if self.public_key.is_none() {
            self.lazy_initialize_public_key()?;
        }
        self.public_key
            .clone()
            .ok_or(CertwrightError::UnsupportedAlgorithm { algorithm: None })
    }

    /// Sets the subject public key from anything that carries one.
    pub fn set_public_key<K: PublicKeyHolder + ?Sized>(&mut self, key: &K) -> Result<()> {
        let public_key = key.public_key().ok_or_else(|| {
            CertwrightError::TypeMismatch(format!(
                "public key expected but got a {} value without one",
                key.algorithm_name()
            ))
        })?;
        if self.public_key.as_ref() != Some(&public_key) {
            self.dirty = true;
        }
        self.generator.subject_public_key = Some(public_key.clone());
        self.public_key = Some(public_key);
        Ok(())
    }

    /// Algorithm name recorded when the certificate was parsed, e.g. `"RSA"`.
    pub fn public_key_algorithm(&self) -> Option<&str> {
        self.public_key_algorithm.as_deref()
    }

    pub(crate) fn set_deferred_public_key(&mut self, algorithm: String, encoded: Vec<u8>) {
        self.public_key_algorithm = Some(algorithm);
        self.public_key_encoded = Some(encoded);
    }

    fn lazy_initialize_public_key(&mut self) -> Result<()> {
        let was_dirty = self.dirty;
        let key = match (&self.public_key_algorithm, &self.public_key_encoded) {
            (Some(algorithm), Some(encoded))
                if algorithm.eq_ignore_ascii_case("RSA")
                    || algorithm.eq_ignore_ascii_case("DSA") =>
            {
                PublicKey::from_encoded(algorithm, encoded)?
            }
            (algorithm, _) => {
                return Err(CertwrightError::UnsupportedAlgorithm {
                    algorithm: algorithm.clone(),
                });
            }
        };
        log::debug!("materialized {} public key", key.algorithm().name());
        self.set_public_key(&key)?;
        self.dirty = was_dirty;
        Ok(())
    }

    /// Zero-based X.509 version (2 is v3). Set on parse, otherwise only
    /// whatever the caller stored; certificates are always generated as v3.
    pub fn version(&self) -> Option<u32> {
        self.version
    }

    pub fn set_version(&mut self, version: u32) {
        if self.version != Some(version) {
            self.dirty = true;
        }
        self.version = Some(version);
    }

    /// Readable name of the signature algorithm, available after signing or
    /// parsing.
    pub fn signature_algorithm(&self) -> Option<&str> {
        self.signature_algorithm.as_deref()
    }

    pub fn extensions(&self) -> &[ExtensionEntry] {
        &self.extensions
    }

    /// Adds an extension and marks the certificate dirty.
    ///
    /// A Subject Alternative Name is folded into an existing one: the new
    /// names are appended after the existing names. Every other extension
    /// is appended, even if its OID is already present.
    pub fn add_extension(&mut self, extension: ExtensionEntry) -> Result<()> {
        self.dirty = true;
        if extension.oid() == SUBJECT_ALT_NAME {
            if let Some(existing) = self
                .extensions
                .iter_mut()
                .find(|e| e.oid() == extension.oid())
            {
                let merged = merge_general_names(existing.value(), extension.value())?;
                existing.set_value(merged);
                return Ok(());
            }
        }
        self.extensions.push(extension);
        Ok(())
    }

    /// Replaces the extension list as given, without merging.
    pub fn set_extensions(&mut self, extensions: Vec<ExtensionEntry>) {
        if self.extensions != extensions {
            self.dirty = true;
        }
        self.extensions = extensions;
    }

    /// `true` while there are edits not covered by the last signature.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn state(&self) -> CertificateState {
        if self.dirty || self.signed.is_none() {
            CertificateState::Draft
        } else {
            CertificateState::Signed
        }
    }

    /// The last signed or parsed certificate, even if edited since.
    pub fn signed(&self) -> Option<&SignedCertificate> {
        self.signed.as_ref()
    }

    fn require_signed(&self) -> Result<&SignedCertificate> {
        self.signed.as_ref().ok_or(CertwrightError::NotSigned)
    }

    /// DER encoding of the last signed or parsed certificate.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(self.require_signed()?.der().to_vec())
    }

    /// PEM encoding of the last signed or parsed certificate.
    pub fn to_pem(&self) -> Result<String> {
        Ok(self.require_signed()?.to_pem())
    }

    /// Human readable dump of the last signed or parsed certificate.
    pub fn to_text(&self) -> Result<String> {
        self.require_signed()?
            .to_text(self.config.oid_resolver.as_ref())
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject.as_ref().map(Name::to_string))
            .field("issuer", &self.issuer.as_ref().map(Name::to_string))
            .field("serial", &self.serial.to_string())
            .field("not_before", &self.not_before)
            .field("not_after", &self.not_after)
            .finish()
    }
}
