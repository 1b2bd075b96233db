use std::net::IpAddr;

use const_oid::AssociatedOid;
use der::{
    Decode, Encode,
    asn1::{AnyRef, Ia5String, OctetString},
    oid::ObjectIdentifier,
};
use x509_cert::ext::pkix::name::GeneralName;

use crate::error::{CertwrightError, Result};
use crate::key::PublicKey;

/// One X.509v3 extension: OID, criticality and the DER encoded value.
///
/// Entries are compared by all three parts; the builder looks them up by
/// OID only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionEntry {
    oid: ObjectIdentifier,
    critical: bool,
    value: Vec<u8>,
}

impl ExtensionEntry {
    pub fn new(oid: ObjectIdentifier, critical: bool, value: Vec<u8>) -> Self {
        Self {
            oid,
            critical,
            value,
        }
    }

    /// Like [`new`](Self::new) with a dotted-decimal OID.
    pub fn from_oid_str(oid: &str, critical: bool, value: Vec<u8>) -> Result<Self> {
        let oid = ObjectIdentifier::new(oid)
            .map_err(|e| CertwrightError::InvalidInput(format!("invalid OID '{oid}': {e}")))?;
        Ok(Self::new(oid, critical, value))
    }

    /// Encodes a typed extension value.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: &E, critical: bool) -> Result<Self> {
        Ok(Self::new(E::OID, critical, extension.to_x509_extension_value()?))
    }

    /// Decodes the value as `E`.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        if self.oid != E::OID {
            return Err(CertwrightError::TypeMismatch(format!(
                "extension {} is not {}",
                self.oid,
                E::OID
            )));
        }
        E::from_x509_extension_value(&self.value)
    }

    pub fn oid(&self) -> ObjectIdentifier {
        self.oid
    }

    pub fn critical(&self) -> bool {
        self.critical
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub(crate) fn set_value(&mut self, value: Vec<u8>) {
        self.value = value;
    }

    /// The `x509-cert` form placed in a TBS certificate.
    ///
    /// The value must be exactly one DER element; anything else fails with
    /// [`CertwrightError::ExtensionEncodingError`].
    pub fn to_x509(&self) -> Result<x509_cert::ext::Extension> {
        AnyRef::from_der(&self.value).map_err(|e| {
            CertwrightError::ExtensionEncodingError(format!("{}: {e}", self.oid))
        })?;
        let extn_value = OctetString::new(self.value.clone()).map_err(|e| {
            CertwrightError::ExtensionEncodingError(format!("{}: {e}", self.oid))
        })?;
        Ok(x509_cert::ext::Extension {
            extn_id: self.oid,
            critical: self.critical,
            extn_value,
        })
    }

    pub fn from_x509(extension: &x509_cert::ext::Extension) -> Self {
        Self::new(
            extension.extn_id,
            extension.critical,
            extension.extn_value.as_bytes().to_vec(),
        )
    }
}

/// Concatenates two encoded `GeneralNames` lists, `existing` first.
pub(crate) fn merge_general_names(existing: &[u8], new: &[u8]) -> Result<Vec<u8>> {
    let decode = |bytes: &[u8]| {
        x509_cert::ext::pkix::SubjectAltName::from_der(bytes)
            .map_err(|e| CertwrightError::ExtensionEncodingError(format!("subjectAltName: {e}")))
    };
    let mut merged = decode(existing)?;
    let added = decode(new)?;
    log::trace!(
        "merging {} subjectAltName entries into {}",
        added.0.len(),
        merged.0.len()
    );
    merged.0.extend(added.0);
    merged
        .to_der()
        .map_err(|e| CertwrightError::ExtensionEncodingError(format!("subjectAltName: {e}")))
}

/// Trait for converting to and from X.509 extensions.
///
/// This trait provides methods to encode and decode X.509 extension values.
///
/// # Example
/// ```
/// use certwright::cert::extensions::{AltName, SubjectAltName, ToAndFromX509Extension};
/// let san = SubjectAltName { names: vec![AltName::Dns("example.com".to_string())] };
/// let encoded = san.to_x509_extension_value().unwrap();
/// let decoded = SubjectAltName::from_x509_extension_value(&encoded).unwrap();
/// assert_eq!(san, decoded);
/// ```
pub trait ToAndFromX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension into a DER-encoded byte vector.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>>;

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self>
    where
        Self: Sized;
}

/// A single subject alternative name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AltName {
    Dns(String),
    Email(String),
    Uri(String),
    Ip(IpAddr),
}

impl AltName {
    fn to_general_name(&self) -> Result<GeneralName> {
        let ia5 = |s: &str| {
            Ia5String::new(s).map_err(|e| CertwrightError::InvalidInput(e.to_string()))
        };
        Ok(match self {
            AltName::Dns(name) => GeneralName::DnsName(ia5(name)?),
            AltName::Email(email) => GeneralName::Rfc822Name(ia5(email)?),
            AltName::Uri(uri) => GeneralName::UniformResourceIdentifier(ia5(uri)?),
            AltName::Ip(ip) => {
                let octets = match ip {
                    IpAddr::V4(v4) => v4.octets().to_vec(),
                    IpAddr::V6(v6) => v6.octets().to_vec(),
                };
                GeneralName::IpAddress(OctetString::new(octets)?)
            }
        })
    }

    fn from_general_name(name: &GeneralName) -> Result<Self> {
        match name {
            GeneralName::DnsName(dns) => Ok(AltName::Dns(dns.to_string())),
            GeneralName::Rfc822Name(email) => Ok(AltName::Email(email.to_string())),
            GeneralName::UniformResourceIdentifier(uri) => Ok(AltName::Uri(uri.to_string())),
            GeneralName::IpAddress(octets) => {
                let bytes = octets.as_bytes();
                if let Ok(v4) = <[u8; 4]>::try_from(bytes) {
                    Ok(AltName::Ip(IpAddr::from(v4)))
                } else if let Ok(v6) = <[u8; 16]>::try_from(bytes) {
                    Ok(AltName::Ip(IpAddr::from(v6)))
                } else {
                    Err(CertwrightError::InvalidInput(format!(
                        "IP address of {} bytes",
                        bytes.len()
                    )))
                }
            }
            _ => Err(CertwrightError::InvalidInput(
                "Unsupported general name type".to_string(),
            )),
        }
    }
}

impl core::fmt::Display for AltName {
    /// OpenSSL's rendering, e.g. `DNS:example.com` or `IP Address:10.0.0.1`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AltName::Dns(name) => write!(f, "DNS:{name}"),
            AltName::Email(email) => write!(f, "email:{email}"),
            AltName::Uri(uri) => write!(f, "URI:{uri}"),
            AltName::Ip(ip) => write!(f, "IP Address:{ip}"),
        }
    }
}

/// Represents the Subject Alternative Name (SAN) extension.
///
/// This extension specifies additional identities for the subject of the certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectAltName {
    pub names: Vec<AltName>,
}

impl SubjectAltName {
    /// SAN holding only DNS names.
    pub fn dns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(|n| AltName::Dns(n.into())).collect(),
        }
    }
}

impl ToAndFromX509Extension for SubjectAltName {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectAltName::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let san = x509_cert::ext::pkix::SubjectAltName(
            self.names
                .iter()
                .map(AltName::to_general_name)
                .collect::<Result<Vec<_>>>()?,
        );

        Ok(san.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let san = x509_cert::ext::pkix::SubjectAltName::from_der(extension)?;
        let names = san
            .0
            .iter()
            .map(AltName::from_general_name)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { names })
    }
}

/// Represents the Basic Constraints extension.
///
/// This extension indicates whether the certificate is a CA certificate and its path length.
///
/// # Fields
/// * `is_ca` - Indicates if the certificate is a CA.
/// * `max_path_length` - The maximum number of intermediate CAs allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub max_path_length: Option<u8>,
}

impl ToAndFromX509Extension for BasicConstraints {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::BasicConstraints::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let bc = x509_cert::ext::pkix::BasicConstraints {
            ca: self.is_ca,
            path_len_constraint: self.max_path_length,
        };

        Ok(bc.to_der()?)
    }

    fn from_x509_extension_value(der_bytes: &[u8]) -> Result<Self> {
        let bc = x509_cert::ext::pkix::BasicConstraints::from_der(der_bytes)?;
        Ok(Self {
            is_ca: bc.ca,
            max_path_length: bc.path_len_constraint,
        })
    }
}

pub use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsage as X509KeyUsage;
pub use x509_cert::ext::pkix::KeyUsages;

/// Represents the Key Usage extension.
///
/// This extension defines the purpose of the key contained in the certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(pub FlagSet<KeyUsages>);

impl ToAndFromX509Extension for KeyUsage {
    const OID: ObjectIdentifier = <X509KeyUsage as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let ku = X509KeyUsage::from(self.0);
        Ok(ku.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let ku = X509KeyUsage::from_der(extension)?;
        Ok(Self(ku.0))
    }
}

/// Represents the Extended Key Usage extension.
///
/// This extension indicates purposes for which the public key may be used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedKeyUsage {
    pub usage: Vec<ExtendedKeyUsageOption>,
}

impl ToAndFromX509Extension for ExtendedKeyUsage {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::ExtendedKeyUsage::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let oids: Vec<ObjectIdentifier> = self.usage.iter().map(|v| (*v).into()).collect();
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage(oids);
        Ok(eku.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage::from_der(extension)?;
        let usage = eku
            .0
            .iter()
            .map(|v| match *v {
                const_oid::db::rfc5912::ID_KP_OCSP_SIGNING => ExtendedKeyUsageOption::OcspSigning,
                const_oid::db::rfc5912::ID_KP_SERVER_AUTH => ExtendedKeyUsageOption::ServerAuth,
                const_oid::db::rfc5912::ID_KP_CLIENT_AUTH => ExtendedKeyUsageOption::ClientAuth,
                const_oid::db::rfc5912::ID_KP_CODE_SIGNING => ExtendedKeyUsageOption::CodeSigning,
                const_oid::db::rfc5912::ID_KP_EMAIL_PROTECTION => {
                    ExtendedKeyUsageOption::EmailProtection
                }
                const_oid::db::rfc5912::ID_KP_TIME_STAMPING => {
                    ExtendedKeyUsageOption::TimeStamping
                }
                other => ExtendedKeyUsageOption::Other(other),
            })
            .collect();
        Ok(Self { usage })
    }
}

/// Represents an option for the Extended Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedKeyUsageOption {
    ServerAuth,
    ClientAuth,
    CodeSigning,
    EmailProtection,
    TimeStamping,
    OcspSigning,
    Other(ObjectIdentifier),
}

impl From<ExtendedKeyUsageOption> for ObjectIdentifier {
    fn from(value: ExtendedKeyUsageOption) -> Self {
        match value {
            ExtendedKeyUsageOption::OcspSigning => const_oid::db::rfc5912::ID_KP_OCSP_SIGNING,
            ExtendedKeyUsageOption::ServerAuth => const_oid::db::rfc5912::ID_KP_SERVER_AUTH,
            ExtendedKeyUsageOption::ClientAuth => const_oid::db::rfc5912::ID_KP_CLIENT_AUTH,
            ExtendedKeyUsageOption::CodeSigning => const_oid::db::rfc5912::ID_KP_CODE_SIGNING,
            ExtendedKeyUsageOption::EmailProtection => {
                const_oid::db::rfc5912::ID_KP_EMAIL_PROTECTION
            }
            ExtendedKeyUsageOption::TimeStamping => const_oid::db::rfc5912::ID_KP_TIME_STAMPING,
            ExtendedKeyUsageOption::Other(oid) => oid,
        }
    }
}

/// Subject Key Identifier extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectKeyIdentifier(pub Vec<u8>);

impl SubjectKeyIdentifier {
    /// SHA-1 of the subject public key bits (RFC 5280, section 4.2.1.2, method 1).
    pub fn from_public_key(key: &PublicKey) -> Result<Self> {
        let spki = key.to_spki()?;
        let digest = <sha1::Sha1 as sha1::Digest>::digest(spki.subject_public_key.raw_bytes());
        Ok(Self(digest.to_vec()))
    }
}

impl ToAndFromX509Extension for SubjectKeyIdentifier {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectKeyIdentifier::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier(OctetString::new(self.0.clone())?);
        Ok(ski.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier::from_der(extension)?;
        Ok(Self(ski.0.as_bytes().to_vec()))
    }
}

/// Represents the Authority Key Identifier (AKI) extension.
///
/// Only the key identifier form is supported; issuer name and serial are
/// neither written nor read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityKeyIdentifier {
    pub key_identifier: Vec<u8>,
}

impl ToAndFromX509Extension for AuthorityKeyIdentifier {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::AuthorityKeyIdentifier::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let aki = x509_cert::ext::pkix::AuthorityKeyIdentifier {
            key_identifier: Some(OctetString::new(self.key_identifier.as_slice())?),
            authority_cert_issuer: None,
            authority_cert_serial_number: None,
        };

        Ok(aki.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let aki = x509_cert::ext::pkix::AuthorityKeyIdentifier::from_der(extension)?;
        Ok(Self {
            key_identifier: aki
                .key_identifier
                .map(|id| id.as_bytes().to_vec())
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_constraints_encoding_decoding() {
        let original = BasicConstraints {
            is_ca: true,
            max_path_length: Some(3),
        };
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = BasicConstraints::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_subject_alt_name_mixed_types() {
        let original = SubjectAltName {
            names: vec![
                AltName::Dns("example.com".to_string()),
                AltName::Email("ops@example.com".to_string()),
                AltName::Ip("10.0.0.1".parse().unwrap()),
                AltName::Ip("::1".parse().unwrap()),
            ],
        };
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = SubjectAltName::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
        assert_eq!(decoded.names[2].to_string(), "IP Address:10.0.0.1");
    }

    #[test]
    fn test_merge_general_names_keeps_existing_first() {
        let a = SubjectAltName::dns(["a.example"]).to_x509_extension_value().unwrap();
        let b = SubjectAltName::dns(["b.example", "c.example"])
            .to_x509_extension_value()
            .unwrap();
        let merged = merge_general_names(&a, &b).unwrap();
        assert_eq!(
            SubjectAltName::from_x509_extension_value(&merged).unwrap(),
            SubjectAltName::dns(["a.example", "b.example", "c.example"])
        );
        assert!(matches!(
            merge_general_names(&a, &[0x04, 0x00]),
            Err(CertwrightError::ExtensionEncodingError(_))
        ));
    }

    #[test]
    fn test_key_usage_encoding_decoding() {
        let original = KeyUsage(KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment);
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = KeyUsage::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_extended_key_usage_keeps_unknown_purposes() {
        let custom = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.10.3.4");
        let original = ExtendedKeyUsage {
            usage: vec![
                ExtendedKeyUsageOption::ServerAuth,
                ExtendedKeyUsageOption::Other(custom),
            ],
        };
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = ExtendedKeyUsage::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_entry_rejects_value_that_is_not_der() {
        let entry = ExtensionEntry::from_oid_str("1.2.3.4", false, vec![0x0c, 0x05, b'a']).unwrap();
        assert!(matches!(
            entry.to_x509(),
            Err(CertwrightError::ExtensionEncodingError(_))
        ));
        assert!(ExtensionEntry::from_oid_str("not-an-oid", false, vec![]).is_err());
    }

    #[test]
    fn test_entry_decodes_only_matching_type() {
        let entry = ExtensionEntry::from_extension(&SubjectAltName::dns(["x.example"]), false)
            .unwrap();
        assert_eq!(entry.oid(), SubjectAltName::OID);
        assert!(entry.to_extension::<SubjectAltName>().is_ok());
        assert!(matches!(
            entry.to_extension::<BasicConstraints>(),
            Err(CertwrightError::TypeMismatch(_))
        ));
    }
}
