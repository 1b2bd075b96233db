use std::time::SystemTime;

use der::Encode;
use der::asn1::{BitString, GeneralizedTime, UtcTime};
use num_bigint::BigUint;
use time::OffsetDateTime;
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::{Time, Validity};

use crate::cert::extensions::ExtensionEntry;
use crate::cert::name::Name;
use crate::cert::sign::SignatureAlgorithm;
use crate::error::{CertwrightError, Result};
use crate::key::{KeyPair, PublicKey};

/// Represents the "To Be Signed" (TBS) portion of an X.509 certificate
/// while it is being assembled.
///
/// Every field starts unset; [`generate`](Self::generate) refuses to run
/// until serial, names, validity, public key and signature algorithm are all
/// present. The certificate is always emitted as version 3.
#[derive(Debug, Clone, Default)]
pub struct TbsCertificate {
    /// Serial number magnitude
    pub serial_number: Option<BigUint>,
    /// Signature algorithm name, e.g. `SHA256WITHRSA`
    pub signature_algorithm: Option<String>,
    /// Certificate issuer distinguished name
    pub issuer: Option<Name>,
    /// Not before time, whole seconds in UTC
    pub not_before: Option<OffsetDateTime>,
    /// Not after time, whole seconds in UTC
    pub not_after: Option<OffsetDateTime>,
    /// Certificate subject distinguished name
    pub subject: Option<Name>,
    /// Subject's public key
    pub subject_public_key: Option<PublicKey>,
    /// Certificate extensions
    pub extensions: Vec<ExtensionEntry>,
}

fn missing(field: &str) -> CertwrightError {
    CertwrightError::CertificateSigningError(format!("{field} not set"))
}

/// UTCTime through 2049, GeneralizedTime from 2050 (RFC 5280, section 4.1.2.5).
pub(crate) fn to_x509_time(value: OffsetDateTime) -> Result<Time> {
    // der cannot encode dates before the Unix epoch, although UTCTime starts at 1950.
    if value.year() < 1970 {
        return Err(CertwrightError::CertificateSigningError(format!(
            "{value}: validity dates before 1970 cannot be encoded"
        )));
    }
    let system: SystemTime = value.into();
    let date_time = der::DateTime::from_system_time(system)
        .map_err(|e| CertwrightError::CertificateSigningError(format!("{value}: {e}")))?;
    if date_time.year() >= 2050 {
        Ok(Time::GeneralTime(GeneralizedTime::from_date_time(date_time)))
    } else {
        Ok(Time::UtcTime(UtcTime::from_date_time(date_time).map_err(
            |e| CertwrightError::CertificateSigningError(format!("{value}: {e}")),
        )?))
    }
}

pub(crate) fn from_x509_time(value: &Time) -> OffsetDateTime {
    match value {
        Time::UtcTime(ut) => OffsetDateTime::from(ut.to_system_time()),
        Time::GeneralTime(gt) => OffsetDateTime::from(gt.to_system_time()),
    }
}

impl TbsCertificate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an extension, checking that its value is well-formed DER.
    pub fn add_extension(&mut self, extension: &ExtensionEntry) -> Result<()> {
        extension.to_x509()?;
        self.extensions.push(extension.clone());
        Ok(())
    }

    pub fn clear_extensions(&mut self) {
        self.extensions.clear();
    }

    /// Resolves the configured signature algorithm name.
    pub fn algorithm(&self) -> Result<SignatureAlgorithm> {
        let name = self
            .signature_algorithm
            .as_deref()
            .ok_or_else(|| missing("signature algorithm"))?;
        SignatureAlgorithm::from_name(name).ok_or_else(|| {
            CertwrightError::CertificateSigningError(format!(
                "unknown signature algorithm {name}"
            ))
        })
    }

    /// Converts the `TbsCertificate` into a `TbsCertificateInner` for DER encoding.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner> {
        let algorithm = self.algorithm()?;

        let serial = self
            .serial_number
            .as_ref()
            .ok_or_else(|| missing("serial number"))?;
        let serial_number = SerialNumber::new(&serial.to_bytes_be())
            .map_err(|e| CertwrightError::CertificateSigningError(format!("serial: {e}")))?;

        let issuer = self.issuer.as_ref().ok_or_else(|| missing("issuer"))?;
        let subject = self.subject.as_ref().ok_or_else(|| missing("subject"))?;

        let validity = Validity {
            not_before: to_x509_time(self.not_before.ok_or_else(|| missing("not before"))?)?,
            not_after: to_x509_time(self.not_after.ok_or_else(|| missing("not after"))?)?,
        };

        let subject_public_key_info = self
            .subject_public_key
            .as_ref()
            .ok_or_else(|| missing("public key"))?
            .to_spki()?;

        let extensions = self
            .extensions
            .iter()
            .map(ExtensionEntry::to_x509)
            .collect::<Result<Vec<_>>>()?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number,
            signature: algorithm.algorithm_identifier()?,
            issuer: issuer.to_x509()?,
            validity,
            subject: subject.to_x509()?,
            subject_public_key_info,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: if extensions.is_empty() {
                None
            } else {
                Some(extensions)
            },
        })
    }

    /// Encodes the `TbsCertificate` into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.to_tbs_certificate_inner()?
            .to_der()
            .map_err(|e| CertwrightError::CertificateSigningError(e.to_string()))
    }

    /// Builds and signs the certificate with `key`.
    ///
    /// The key must belong to the family named by the signature algorithm;
    /// any failure is reported as [`CertwrightError::CertificateSigningError`].
    pub fn generate(&self, key: &KeyPair) -> Result<x509_cert::Certificate> {
        let algorithm = self.algorithm()?;
        if algorithm.key_algorithm() != key.algorithm() {
            return Err(CertwrightError::CertificateSigningError(format!(
                "{} cannot be produced with a {} key",
                algorithm.name(),
                key.algorithm().name()
            )));
        }

        let tbs_certificate = self.to_tbs_certificate_inner()?;
        let tbs_der = tbs_certificate
            .to_der()
            .map_err(|e| CertwrightError::CertificateSigningError(e.to_string()))?;

        let signature = key
            .sign_data(algorithm.digest(), &tbs_der)
            .map_err(|e| match e {
                CertwrightError::CertificateSigningError(_) => e,
                other => CertwrightError::CertificateSigningError(other.to_string()),
            })?;

        Ok(x509_cert::Certificate {
            tbs_certificate,
            signature_algorithm: algorithm.algorithm_identifier()?,
            signature: BitString::from_bytes(&signature)
                .map_err(|e| CertwrightError::CertificateSigningError(e.to_string()))?,
        })
    }
}
