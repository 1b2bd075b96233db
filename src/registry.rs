//! Lookup tables handed to a [`Certificate`](crate::cert::Certificate) at
//! construction time.
//!
//! Two capabilities live here:
//!
//! - [`ExtensionFactory`] decides which extensions of a parsed certificate
//!   are loaded into the builder.
//! - [`OidResolver`] turns a signature algorithm OID into a readable name.
//!
//! Both are injected through [`CertificateConfig`](crate::config::CertificateConfig)
//! so tests can swap in fixed tables.

use std::collections::HashMap;

use const_oid::ObjectIdentifier;

use crate::cert::extensions::ExtensionEntry;
use crate::cert::signed::SignedCertificate;

/// Builds an [`ExtensionEntry`] for one extension OID of a decoded certificate.
pub trait ExtensionFactory: Send + Sync {
    /// Returns `None` when the extension is unknown or absent; the parser
    /// skips it in that case.
    fn build(
        &self,
        oid: &ObjectIdentifier,
        certificate: &SignedCertificate,
        critical: bool,
    ) -> Option<ExtensionEntry>;
}

/// Resolves an OID to a human readable name.
pub trait OidResolver: Send + Sync {
    fn resolve(&self, oid: &ObjectIdentifier) -> Option<String>;
}

const fn oid(s: &str) -> ObjectIdentifier {
    ObjectIdentifier::new_unwrap(s)
}

/// Extensions defined by RFC 5280, the PKIX profile, Netscape and
/// Certificate Transparency.
pub const KNOWN_EXTENSIONS: &[ObjectIdentifier] = &[
    oid("2.5.29.9"),                 // subjectDirectoryAttributes
    oid("2.5.29.14"),                // subjectKeyIdentifier
    oid("2.5.29.15"),                // keyUsage
    oid("2.5.29.16"),                // privateKeyUsagePeriod
    oid("2.5.29.17"),                // subjectAltName
    oid("2.5.29.18"),                // issuerAltName
    oid("2.5.29.19"),                // basicConstraints
    oid("2.5.29.30"),                // nameConstraints
    oid("2.5.29.31"),                // cRLDistributionPoints
    oid("2.5.29.32"),                // certificatePolicies
    oid("2.5.29.33"),                // policyMappings
    oid("2.5.29.35"),                // authorityKeyIdentifier
    oid("2.5.29.36"),                // policyConstraints
    oid("2.5.29.37"),                // extKeyUsage
    oid("2.5.29.46"),                // freshestCRL
    oid("2.5.29.54"),                // inhibitAnyPolicy
    oid("1.3.6.1.5.5.7.1.1"),        // authorityInfoAccess
    oid("1.3.6.1.5.5.7.1.11"),       // subjectInfoAccess
    oid("1.3.6.1.5.5.7.1.24"),       // tlsfeature
    oid("1.3.6.1.4.1.11129.2.4.2"),  // ct_precert_scts
    oid("2.16.840.1.113730.1.1"),    // nsCertType
    oid("2.16.840.1.113730.1.13"),   // nsComment
];

/// Loads the extensions listed in [`KNOWN_EXTENSIONS`] and skips the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardExtensionFactory;

impl ExtensionFactory for StandardExtensionFactory {
    fn build(
        &self,
        oid: &ObjectIdentifier,
        certificate: &SignedCertificate,
        critical: bool,
    ) -> Option<ExtensionEntry> {
        if !KNOWN_EXTENSIONS.contains(oid) {
            return None;
        }
        OpaqueExtensionFactory.build(oid, certificate, critical)
    }
}

/// Keeps every extension, known or not, as raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueExtensionFactory;

impl ExtensionFactory for OpaqueExtensionFactory {
    fn build(
        &self,
        oid: &ObjectIdentifier,
        certificate: &SignedCertificate,
        critical: bool,
    ) -> Option<ExtensionEntry> {
        let value = certificate.extension_value(oid)?;
        Some(ExtensionEntry::new(*oid, critical, value.to_vec()))
    }
}

/// Resolver backed by the `const-oid` database.
#[derive(Debug, Clone, Copy, Default)]
pub struct OidDatabase;

impl OidResolver for OidDatabase {
    fn resolve(&self, oid: &ObjectIdentifier) -> Option<String> {
        const_oid::db::DB.by_oid(oid).map(str::to_string)
    }
}

/// Fixed OID to name table.
#[derive(Debug, Clone, Default)]
pub struct OidTable {
    names: HashMap<ObjectIdentifier, String>,
}

impl OidTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, oid: ObjectIdentifier, name: impl Into<String>) -> Self {
        self.names.insert(oid, name.into());
        self
    }
}

impl FromIterator<(ObjectIdentifier, String)> for OidTable {
    fn from_iter<T: IntoIterator<Item = (ObjectIdentifier, String)>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

impl OidResolver for OidTable {
    fn resolve(&self, oid: &ObjectIdentifier) -> Option<String> {
        self.names.get(oid).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA256_WITH_RSA: ObjectIdentifier = oid("1.2.840.113549.1.1.11");

    #[test]
    fn test_database_resolves_signature_algorithms() {
        assert_eq!(
            OidDatabase.resolve(&SHA256_WITH_RSA).as_deref(),
            Some("sha256WithRSAEncryption")
        );
        assert_eq!(OidDatabase.resolve(&oid("1.2.3.4.5.6.7")), None);
    }

    #[test]
    fn test_table_only_knows_what_it_was_given() {
        let table = OidTable::new().with(SHA256_WITH_RSA, "SHA256WITHRSA");
        assert_eq!(
            table.resolve(&SHA256_WITH_RSA).as_deref(),
            Some("SHA256WITHRSA")
        );
        assert_eq!(table.resolve(&oid("1.2.840.10045.4.3.2")), None);
    }
}
