use const_oid::ObjectIdentifier;
use der::asn1::{AnyRef, BitStringRef};
use der::{Decode, Encode};
use num_bigint::BigInt;
use time::OffsetDateTime;
use x509_cert::Version;

use super::name::Name;
use crate::error::{CertwrightError, Result};
use crate::key::algorithm_name_for_oid;
use crate::pem_utils::der_to_pem;
use crate::tbs_certificate::from_x509_time;

/// Outer certificate structure with the TBS part left undecoded, so the
/// exact signed bytes can be recovered.
#[derive(der::Sequence)]
struct RawCertificate<'a> {
    tbs_certificate: AnyRef<'a>,
    signature_algorithm: AnyRef<'a>,
    signature: BitStringRef<'a>,
}

/// A signed certificate, as produced by signing or read by parsing.
///
/// Never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCertificate {
    der: Vec<u8>,
    tbs_der: Vec<u8>,
    inner: x509_cert::Certificate,
}

impl SignedCertificate {
    /// Decodes a DER certificate. Any failure is a
    /// [`CertwrightError::CertificateDecodeError`].
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let decode_error = |e: der::Error| CertwrightError::CertificateDecodeError(e.to_string());
        if der.is_empty() {
            return Err(CertwrightError::CertificateDecodeError(
                "empty input".to_string(),
            ));
        }
        let inner = x509_cert::Certificate::from_der(der).map_err(decode_error)?;
        let raw = RawCertificate::from_der(der).map_err(decode_error)?;
        let tbs_der = raw.tbs_certificate.to_der().map_err(decode_error)?;
        Ok(Self {
            der: der.to_vec(),
            tbs_der,
            inner,
        })
    }

    pub(crate) fn from_x509(inner: x509_cert::Certificate) -> Result<Self> {
        let der = inner
            .to_der()
            .map_err(|e| CertwrightError::CertificateSigningError(e.to_string()))?;
        let tbs_der = inner
            .tbs_certificate
            .to_der()
            .map_err(|e| CertwrightError::CertificateSigningError(e.to_string()))?;
        Ok(Self {
            der,
            tbs_der,
            inner,
        })
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn to_pem(&self) -> String {
        der_to_pem(&self.der, "CERTIFICATE")
    }

    /// The `x509-cert` structure.
    pub fn inner(&self) -> &x509_cert::Certificate {
        &self.inner
    }

    /// The signed `TBSCertificate` bytes.
    pub fn tbs_der(&self) -> &[u8] {
        &self.tbs_der
    }

    pub fn serial(&self) -> BigInt {
        BigInt::from_signed_bytes_be(self.inner.tbs_certificate.serial_number.as_bytes())
    }

    pub fn subject(&self) -> Name {
        Name::from_x509(&self.inner.tbs_certificate.subject)
    }

    pub fn issuer(&self) -> Name {
        Name::from_x509(&self.inner.tbs_certificate.issuer)
    }

    pub fn not_before(&self) -> OffsetDateTime {
        from_x509_time(&self.inner.tbs_certificate.validity.not_before)
    }

    pub fn not_after(&self) -> OffsetDateTime {
        from_x509_time(&self.inner.tbs_certificate.validity.not_after)
    }

    /// Zero-based version (2 for v3).
    pub fn version(&self) -> u32 {
        match self.inner.tbs_certificate.version {
            Version::V1 => 0,
            Version::V2 => 1,
            Version::V3 => 2,
        }
    }

    /// `"RSA"`, `"DSA"`, `"EC"`, or the dotted OID of other key types.
    pub fn public_key_algorithm(&self) -> String {
        algorithm_name_for_oid(
            &self
                .inner
                .tbs_certificate
                .subject_public_key_info
                .algorithm
                .oid,
        )
    }

    pub fn public_key_algorithm_oid(&self) -> ObjectIdentifier {
        self.inner
            .tbs_certificate
            .subject_public_key_info
            .algorithm
            .oid
    }

    /// DER `SubjectPublicKeyInfo`.
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        Ok(self
            .inner
            .tbs_certificate
            .subject_public_key_info
            .to_der()?)
    }

    pub fn signature_algorithm_oid(&self) -> ObjectIdentifier {
        self.inner.signature_algorithm.oid
    }

    pub fn signature(&self) -> &[u8] {
        self.inner.signature.raw_bytes()
    }

    pub fn extensions(&self) -> &[x509_cert::ext::Extension] {
        self.inner
            .tbs_certificate
            .extensions
            .as_deref()
            .unwrap_or_default()
    }

    fn extension_oids(&self, critical: bool) -> Vec<ObjectIdentifier> {
        let mut oids: Vec<ObjectIdentifier> = Vec::new();
        for extension in self.extensions() {
            if extension.critical == critical && !oids.contains(&extension.extn_id) {
                oids.push(extension.extn_id);
            }
        }
        oids
    }

    /// OIDs of the critical extensions, each once, in encoding order.
    pub fn critical_extension_oids(&self) -> Vec<ObjectIdentifier> {
        self.extension_oids(true)
    }

    /// OIDs of the non-critical extensions, each once, in encoding order.
    pub fn non_critical_extension_oids(&self) -> Vec<ObjectIdentifier> {
        self.extension_oids(false)
    }

    /// Value of the first extension with `oid`.
    pub fn extension_value(&self, oid: &ObjectIdentifier) -> Option<&[u8]> {
        self.extensions()
            .iter()
            .find(|e| &e.extn_id == oid)
            .map(|e| e.extn_value.as_bytes())
    }
}
