//! Human readable rendering in the layout of `openssl x509 -text`.
//!
//! The output is meant for people; it is not a stable format.

use const_oid::ObjectIdentifier;
use num_bigint::Sign;
use time::OffsetDateTime;

use super::SignedCertificate;
use super::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption, KeyUsage,
    KeyUsages, SubjectAltName, SubjectKeyIdentifier, ToAndFromX509Extension,
};
use crate::error::Result;
use crate::key::PublicKey;
use crate::registry::OidResolver;

fn hex_line(bytes: &[u8], upper: bool) -> String {
    bytes
        .iter()
        .map(|b| {
            if upper {
                format!("{b:02X}")
            } else {
                format!("{b:02x}")
            }
        })
        .collect::<Vec<_>>()
        .join(":")
}

/// Colon separated hex, `per_line` bytes per line, each line indented.
fn hex_block(out: &mut String, bytes: &[u8], indent: usize, per_line: usize) {
    let chunks: Vec<&[u8]> = bytes.chunks(per_line).collect();
    for (i, chunk) in chunks.iter().enumerate() {
        let separator = if i + 1 < chunks.len() { ":" } else { "" };
        out.push_str(&format!(
            "{:indent$}{}{}\n",
            "",
            hex_line(chunk, false),
            separator
        ));
    }
}

/// `Oct 17 19:52:04 2026 GMT`
fn format_time(value: OffsetDateTime) -> String {
    let month = value.month().to_string();
    format!(
        "{} {:>2} {:02}:{:02}:{:02} {} GMT",
        &month[..3],
        value.day(),
        value.hour(),
        value.minute(),
        value.second(),
        value.year()
    )
}

fn extension_label(oid: &ObjectIdentifier) -> Option<&'static str> {
    let label = match oid.to_string().as_str() {
        "2.5.29.14" => "X509v3 Subject Key Identifier",
        "2.5.29.15" => "X509v3 Key Usage",
        "2.5.29.17" => "X509v3 Subject Alternative Name",
        "2.5.29.18" => "X509v3 Issuer Alternative Name",
        "2.5.29.19" => "X509v3 Basic Constraints",
        "2.5.29.31" => "X509v3 CRL Distribution Points",
        "2.5.29.32" => "X509v3 Certificate Policies",
        "2.5.29.35" => "X509v3 Authority Key Identifier",
        "2.5.29.37" => "X509v3 Extended Key Usage",
        "1.3.6.1.5.5.7.1.1" => "Authority Information Access",
        _ => return None,
    };
    Some(label)
}

fn key_usage_name(usage: KeyUsages) -> &'static str {
    match usage {
        KeyUsages::DigitalSignature => "Digital Signature",
        KeyUsages::NonRepudiation => "Non Repudiation",
        KeyUsages::KeyEncipherment => "Key Encipherment",
        KeyUsages::DataEncipherment => "Data Encipherment",
        KeyUsages::KeyAgreement => "Key Agreement",
        KeyUsages::KeyCertSign => "Certificate Sign",
        KeyUsages::CRLSign => "CRL Sign",
        KeyUsages::EncipherOnly => "Encipher Only",
        KeyUsages::DecipherOnly => "Decipher Only",
    }
}

fn extended_key_usage_name(usage: &ExtendedKeyUsageOption) -> String {
    match usage {
        ExtendedKeyUsageOption::ServerAuth => "TLS Web Server Authentication".to_string(),
        ExtendedKeyUsageOption::ClientAuth => "TLS Web Client Authentication".to_string(),
        ExtendedKeyUsageOption::CodeSigning => "Code Signing".to_string(),
        ExtendedKeyUsageOption::EmailProtection => "E-mail Protection".to_string(),
        ExtendedKeyUsageOption::TimeStamping => "Time Stamping".to_string(),
        ExtendedKeyUsageOption::OcspSigning => "OCSP Signing".to_string(),
        ExtendedKeyUsageOption::Other(oid) => oid.to_string(),
    }
}

/// Decoded rendering of the well-known extensions; `None` falls back to a
/// hex dump.
fn describe_extension(oid: &ObjectIdentifier, value: &[u8]) -> Option<String> {
    let text = if *oid == BasicConstraints::OID {
        let bc = BasicConstraints::from_x509_extension_value(value).ok()?;
        let mut text = format!("CA:{}", if bc.is_ca { "TRUE" } else { "FALSE" });
        if let Some(len) = bc.max_path_length {
            text.push_str(&format!(", pathlen:{len}"));
        }
        text
    } else if *oid == KeyUsage::OID {
        let ku = KeyUsage::from_x509_extension_value(value).ok()?;
        ku.0.into_iter()
            .map(key_usage_name)
            .collect::<Vec<_>>()
            .join(", ")
    } else if *oid == ExtendedKeyUsage::OID {
        let eku = ExtendedKeyUsage::from_x509_extension_value(value).ok()?;
        eku.usage
            .iter()
            .map(extended_key_usage_name)
            .collect::<Vec<_>>()
            .join(", ")
    } else if *oid == SubjectAltName::OID {
        let san = SubjectAltName::from_x509_extension_value(value).ok()?;
        san.names
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    } else if *oid == SubjectKeyIdentifier::OID {
        hex_line(&SubjectKeyIdentifier::from_x509_extension_value(value).ok()?.0, true)
    } else if *oid == AuthorityKeyIdentifier::OID {
        let aki = AuthorityKeyIdentifier::from_x509_extension_value(value).ok()?;
        format!("keyid:{}", hex_line(&aki.key_identifier, true))
    } else {
        return None;
    };
    Some(text)
}

impl SignedCertificate {
    /// Renders the certificate the way `openssl x509 -noout -text` does,
    /// naming algorithms through `resolver`.
    pub fn to_text(&self, resolver: &dyn OidResolver) -> Result<String> {
        let name_of =
            |oid: &ObjectIdentifier| resolver.resolve(oid).unwrap_or_else(|| oid.to_string());
        let signature_algorithm = name_of(&self.signature_algorithm_oid());
        let serial = self.serial();

        let mut out = String::new();
        let mut line = |indent: usize, text: &str| {
            out.push_str(&format!("{:indent$}{text}\n", ""));
        };

        line(0, "Certificate:");
        line(4, "Data:");
        let version = self.version();
        line(8, &format!("Version: {} (0x{version:x})", version + 1));
        if serial.bits() <= 64 && serial.sign() != Sign::Minus {
            line(8, &format!("Serial Number: {serial} (0x{serial:x})"));
        } else {
            line(8, "Serial Number:");
            let (_, magnitude) = serial.to_bytes_be();
            line(12, &hex_line(&magnitude, false));
        }
        line(8, &format!("Signature Algorithm: {signature_algorithm}"));
        line(8, &format!("Issuer: {}", self.issuer().to_oneline()));
        line(8, "Validity");
        line(12, &format!("Not Before: {}", format_time(self.not_before())));
        line(12, &format!("Not After : {}", format_time(self.not_after())));
        line(8, &format!("Subject: {}", self.subject().to_oneline()));
        line(8, "Subject Public Key Info:");
        line(
            12,
            &format!(
                "Public Key Algorithm: {}",
                name_of(&self.public_key_algorithm_oid())
            ),
        );
        let public_key_der = self.public_key_der()?;
        if let Ok(key) = PublicKey::from_public_key_der(&public_key_der) {
            line(16, &format!("Public-Key: ({} bit)", key.bits()));
        }

        if !self.extensions().is_empty() {
            line(8, "X509v3 extensions:");
            for extension in self.extensions() {
                let label = extension_label(&extension.extn_id)
                    .map(str::to_string)
                    .unwrap_or_else(|| name_of(&extension.extn_id));
                let critical = if extension.critical { " critical" } else { "" };
                line(12, &format!("{label}:{critical}"));
                let value = extension.extn_value.as_bytes();
                match describe_extension(&extension.extn_id, value) {
                    Some(text) => line(16, &text),
                    None => line(16, &hex_line(value, false)),
                }
            }
        }

        line(4, &format!("Signature Algorithm: {signature_algorithm}"));
        line(4, "Signature Value:");
        hex_block(&mut out, self.signature(), 8, 18);
        Ok(out)
    }
}
