//! Loading an existing certificate into a builder.

use std::sync::Arc;

use super::{Certificate, SignedCertificate};
use crate::config::CertificateConfig;
use crate::error::{CertwrightError, Result};
use crate::pem_utils::{CERTIFICATE_LABELS, read_possible_pem};

impl Certificate {
    /// Parses a PEM or DER certificate with the default configuration.
    pub fn parse(input: &[u8]) -> Result<Self> {
        Self::parse_with_config(input, CertificateConfig::default())
    }

    /// Parses a PEM or DER certificate.
    ///
    /// The builder is filled from the decoded fields and is clean afterwards.
    /// The public key is kept encoded until first use. Extensions are offered
    /// to the configured [`ExtensionFactory`](crate::registry::ExtensionFactory),
    /// critical ones first; those it declines are dropped.
    pub fn parse_with_config(input: &[u8], config: CertificateConfig) -> Result<Self> {
        let der = read_possible_pem(input, &CERTIFICATE_LABELS)
            .map_err(|e| CertwrightError::CertificateDecodeError(e.to_string()))?;
        let signed = SignedCertificate::from_der(&der)?;

        let mut cert = Certificate::with_config(config);
        cert.set_serial(signed.serial());
        cert.set_not_before(signed.not_before());
        cert.set_not_after(signed.not_after());
        cert.set_subject(signed.subject());
        cert.set_issuer(signed.issuer());
        let public_key_der = signed
            .public_key_der()
            .map_err(|e| CertwrightError::CertificateDecodeError(e.to_string()))?;
        cert.set_deferred_public_key(signed.public_key_algorithm(), public_key_der);

        let factory = Arc::clone(&cert.config.extension_factory);
        let ordered = [
            (signed.critical_extension_oids(), true),
            (signed.non_critical_extension_oids(), false),
        ];
        for (oids, critical) in ordered {
            for oid in oids {
                match factory.build(&oid, &signed, critical) {
                    Some(extension) => cert
                        .add_extension(extension)
                        .map_err(|e| CertwrightError::CertificateDecodeError(e.to_string()))?,
                    None => log::trace!("skipping extension {oid}"),
                }
            }
        }

        let oid = signed.signature_algorithm_oid();
        cert.signature_algorithm = Some(
            cert.config
                .oid_resolver
                .resolve(&oid)
                .unwrap_or_else(|| oid.to_string()),
        );
        cert.version = Some(signed.version());
        log::debug!(
            "parsed certificate {} with {} extensions",
            signed.subject(),
            cert.extensions.len()
        );
        cert.signed = Some(signed);
        cert.dirty = false;
        Ok(cert)
    }

    /// Parses a DER certificate with the default configuration.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        Self::parse(der)
    }

    /// Parses a PEM certificate with the default configuration.
    pub fn from_pem(pem: &str) -> Result<Self> {
        Self::parse(pem.as_bytes())
    }
}
