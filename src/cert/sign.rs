//! Signing and verification.

use const_oid::ObjectIdentifier;
use der::Tag;
use der::asn1::Any;
use x509_cert::spki::AlgorithmIdentifierOwned;

use super::{Certificate, SignedCertificate};
use crate::digest::MessageDigest;
use crate::error::{CertwrightError, Result};
use crate::key::{KeyAlgorithm, KeyPair, PublicKey, PublicKeyHolder};

/// Represents the supported signature algorithms for certificates.
///
/// This enum provides a mapping to the corresponding OIDs for each algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    Md5WithRsa,
    Sha1WithRsa,
    Sha224WithRsa,
    Sha256WithRsa,
    Sha384WithRsa,
    Sha512WithRsa,
    Sha1WithDsa,
    Sha224WithDsa,
    Sha256WithDsa,
    Sha1WithEcdsa,
    Sha224WithEcdsa,
    Sha256WithEcdsa,
    Sha384WithEcdsa,
    Sha512WithEcdsa,
}

impl SignatureAlgorithm {
    pub const ALL: [SignatureAlgorithm; 14] = [
        SignatureAlgorithm::Md5WithRsa,
        SignatureAlgorithm::Sha1WithRsa,
        SignatureAlgorithm::Sha224WithRsa,
        SignatureAlgorithm::Sha256WithRsa,
        SignatureAlgorithm::Sha384WithRsa,
        SignatureAlgorithm::Sha512WithRsa,
        SignatureAlgorithm::Sha1WithDsa,
        SignatureAlgorithm::Sha224WithDsa,
        SignatureAlgorithm::Sha256WithDsa,
        SignatureAlgorithm::Sha1WithEcdsa,
        SignatureAlgorithm::Sha224WithEcdsa,
        SignatureAlgorithm::Sha256WithEcdsa,
        SignatureAlgorithm::Sha384WithEcdsa,
        SignatureAlgorithm::Sha512WithEcdsa,
    ];

    pub fn digest(&self) -> MessageDigest {
        use SignatureAlgorithm::*;
        match self {
            Md5WithRsa => MessageDigest::Md5,
            Sha1WithRsa | Sha1WithDsa | Sha1WithEcdsa => MessageDigest::Sha1,
            Sha224WithRsa | Sha224WithDsa | Sha224WithEcdsa => MessageDigest::Sha224,
            Sha256WithRsa | Sha256WithDsa | Sha256WithEcdsa => MessageDigest::Sha256,
            Sha384WithRsa | Sha384WithEcdsa => MessageDigest::Sha384,
            Sha512WithRsa | Sha512WithEcdsa => MessageDigest::Sha512,
        }
    }

    pub fn key_algorithm(&self) -> KeyAlgorithm {
        use SignatureAlgorithm::*;
        match self {
            Md5WithRsa | Sha1WithRsa | Sha224WithRsa | Sha256WithRsa | Sha384WithRsa
            | Sha512WithRsa => KeyAlgorithm::Rsa,
            Sha1WithDsa | Sha224WithDsa | Sha256WithDsa => KeyAlgorithm::Dsa,
            Sha1WithEcdsa | Sha224WithEcdsa | Sha256WithEcdsa | Sha384WithEcdsa
            | Sha512WithEcdsa => KeyAlgorithm::Ecdsa,
        }
    }

    /// `<DIGEST>WITH<KEY>`, e.g. `SHA256WITHRSA`.
    pub fn name(&self) -> String {
        format!("{}WITH{}", self.digest().short_name(), self.key_algorithm().name())
    }

    pub fn oid(&self) -> ObjectIdentifier {
        use SignatureAlgorithm::*;
        let oid = match self {
            Md5WithRsa => "1.2.840.113549.1.1.4",
            Sha1WithRsa => "1.2.840.113549.1.1.5",
            Sha224WithRsa => "1.2.840.113549.1.1.14",
            Sha256WithRsa => "1.2.840.113549.1.1.11",
            Sha384WithRsa => "1.2.840.113549.1.1.12",
            Sha512WithRsa => "1.2.840.113549.1.1.13",
            Sha1WithDsa => "1.2.840.10040.4.3",
            Sha224WithDsa => "2.16.840.1.101.3.4.3.1",
            Sha256WithDsa => "2.16.840.1.101.3.4.3.2",
            Sha1WithEcdsa => "1.2.840.10045.4.1",
            Sha224WithEcdsa => "1.2.840.10045.4.3.1",
            Sha256WithEcdsa => "1.2.840.10045.4.3.2",
            Sha384WithEcdsa => "1.2.840.10045.4.3.3",
            Sha512WithEcdsa => "1.2.840.10045.4.3.4",
        };
        ObjectIdentifier::new_unwrap(oid)
    }

    /// Looks up a `<DIGEST>WITH<KEY>` name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.name().eq_ignore_ascii_case(name))
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        Self::ALL.into_iter().find(|alg| &alg.oid() == oid)
    }

    /// RSA identifiers carry NULL parameters; DSA and ECDSA ones omit them.
    pub fn algorithm_identifier(&self) -> Result<AlgorithmIdentifierOwned> {
        let parameters = match self.key_algorithm() {
            KeyAlgorithm::Rsa => Some(Any::new(Tag::Null, Vec::<u8>::new())?),
            KeyAlgorithm::Dsa | KeyAlgorithm::Ecdsa => None,
        };
        Ok(AlgorithmIdentifierOwned {
            oid: self.oid(),
            parameters,
        })
    }
}

/// Key and digest pairings refused before anything is touched.
fn check_pairing(key: KeyAlgorithm, digest: MessageDigest) -> Result<()> {
    let refused = matches!(
        (key, digest),
        (KeyAlgorithm::Dsa, MessageDigest::Md5) | (KeyAlgorithm::Rsa, MessageDigest::Dss1)
    );
    if refused {
        return Err(CertwrightError::UnsupportedSignatureAlgorithm(format!(
            "{}WITH{}",
            digest.name(),
            key.name()
        )));
    }
    Ok(())
}

impl Certificate {
    /// Signs the certificate with `key` using `digest`.
    ///
    /// On success the builder is clean, holds the new signed artifact and
    /// records the signature algorithm name. A DSA key with MD5 or an RSA
    /// key with DSS1 is refused with
    /// [`CertwrightError::UnsupportedSignatureAlgorithm`] before any state
    /// changes. If no public key was set, the one recorded at parse time is
    /// materialized first.
    pub fn sign(&mut self, key: &KeyPair, digest: MessageDigest) -> Result<&mut Self> {
        check_pairing(key.algorithm(), digest)?;

        self.generator.clear_extensions();
        for extension in &self.extensions {
            self.generator.add_extension(extension)?;
        }

        self.generator.signature_algorithm = Some(format!(
            "{}WITH{}",
            digest.short_name(),
            key.algorithm().name()
        ));

        if self.public_key.is_none() {
            self.lazy_initialize_public_key()?;
        }

        let certificate = self.generator.generate(key)?;
        let signed = SignedCertificate::from_x509(certificate)?;

        let oid = signed.signature_algorithm_oid();
        let name = self
            .config
            .oid_resolver
            .resolve(&oid)
            .unwrap_or_else(|| oid.to_string());
        log::debug!("signed certificate serial {} with {name}", self.serial);

        self.signature_algorithm = Some(name);
        self.signed = Some(signed);
        self.dirty = false;
        Ok(self)
    }

    /// Checks the signature of the signed artifact against `key`.
    ///
    /// Returns `false` without checking anything when the builder has edits
    /// that were not signed. A signature that does not match, or a key of
    /// the wrong type, is also `false`; a signature algorithm this crate
    /// cannot verify is a [`CertwrightError::VerificationSetupError`].
    pub fn verify<K: PublicKeyHolder + ?Sized>(&self, key: &K) -> Result<bool> {
        if self.dirty {
            log::debug!("certificate has unsigned changes, not verifying");
            return Ok(false);
        }
        let Some(signed) = self.signed.as_ref() else {
            return Ok(false);
        };
        let public_key = key.public_key().ok_or_else(|| {
            CertwrightError::TypeMismatch(format!(
                "public key expected but got a {} value without one",
                key.algorithm_name()
            ))
        })?;

        let oid = signed.signature_algorithm_oid();
        let algorithm = SignatureAlgorithm::from_oid(&oid).ok_or_else(|| {
            CertwrightError::VerificationSetupError(format!(
                "unsupported signature algorithm {oid}"
            ))
        })?;
        if algorithm.key_algorithm() != public_key.algorithm() {
            return Ok(false);
        }
        Ok(public_key.verify_data(algorithm.digest(), signed.tbs_der(), signed.signature()))
    }

    /// `true` when `key` carries the public key of the signed artifact.
    pub fn check_private_key<K: PublicKeyHolder + ?Sized>(&self, key: &K) -> Result<bool> {
        let public_key = key.public_key().ok_or_else(|| {
            CertwrightError::TypeMismatch(format!(
                "key expected but got a {} value without one",
                key.algorithm_name()
            ))
        })?;
        let Some(signed) = self.signed.as_ref() else {
            return Ok(false);
        };
        let certificate_key = signed.public_key_der()?;
        Ok(match PublicKey::from_public_key_der(&certificate_key) {
            Ok(certificate_key) => certificate_key == public_key,
            Err(_) => public_key.to_public_key_der()? == certificate_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::Tagged;

    #[test]
    fn test_names_round_trip_through_table() {
        for algorithm in SignatureAlgorithm::ALL {
            assert_eq!(SignatureAlgorithm::from_name(&algorithm.name()), Some(algorithm));
            assert_eq!(SignatureAlgorithm::from_oid(&algorithm.oid()), Some(algorithm));
        }
        assert_eq!(
            SignatureAlgorithm::from_name("sha256withrsa"),
            Some(SignatureAlgorithm::Sha256WithRsa)
        );
        assert_eq!(SignatureAlgorithm::from_name("SHA512WITHDSA"), None);
    }

    #[test]
    fn test_rsa_identifiers_carry_null_parameters() {
        let rsa = SignatureAlgorithm::Sha256WithRsa.algorithm_identifier().unwrap();
        assert_eq!(rsa.parameters.map(|p| p.tag()), Some(Tag::Null));
        let ecdsa = SignatureAlgorithm::Sha256WithEcdsa.algorithm_identifier().unwrap();
        assert!(ecdsa.parameters.is_none());
    }

    #[test]
    fn test_refused_pairings() {
        assert!(check_pairing(KeyAlgorithm::Dsa, MessageDigest::Md5).is_err());
        assert!(check_pairing(KeyAlgorithm::Rsa, MessageDigest::Dss1).is_err());
        assert!(check_pairing(KeyAlgorithm::Dsa, MessageDigest::Dss1).is_ok());
        assert!(check_pairing(KeyAlgorithm::Rsa, MessageDigest::Md5).is_ok());
    }
}
