#![allow(dead_code)]

use certwright::cert::Certificate;
use certwright::cert::extensions::{BasicConstraints, ExtensionEntry, SubjectAltName};
use certwright::cert::params::DistinguishedName;
use certwright::key::KeyPair;
use time::macros::datetime;

pub const RSA_KEY: &str = include_str!("data/rsa.pem");
pub const RSA_OTHER_KEY: &str = include_str!("data/rsa_other.pem");
pub const DSA_KEY: &str = include_str!("data/dsa.pem");
pub const EC_KEY: &str = include_str!("data/ec.pem");
pub const EC384_KEY: &str = include_str!("data/ec384.pem");

pub const RSA_CERT_PEM: &str = include_str!("data/rsa_cert.pem");
pub const RSA_CERT_DER: &[u8] = include_bytes!("data/rsa_cert.der");
pub const DSA_CERT_PEM: &str = include_str!("data/dsa_cert.pem");
pub const EC_CERT_PEM: &str = include_str!("data/ec_cert.pem");
pub const EC384_SHA1_CERT_PEM: &str = include_str!("data/ec384_sha1_cert.pem");
pub const ED25519_CERT_PEM: &str = include_str!("data/ed25519_cert.pem");

pub fn rsa_key() -> KeyPair {
    KeyPair::from_pkcs8_pem(RSA_KEY).unwrap()
}

pub fn rsa_other_key() -> KeyPair {
    KeyPair::from_pkcs8_pem(RSA_OTHER_KEY).unwrap()
}

pub fn dsa_key() -> KeyPair {
    KeyPair::from_pkcs8_pem(DSA_KEY).unwrap()
}

pub fn ec_key() -> KeyPair {
    KeyPair::from_pkcs8_pem(EC_KEY).unwrap()
}

pub fn ec384_key() -> KeyPair {
    KeyPair::from_pkcs8_pem(EC384_KEY).unwrap()
}

/// A self-issued draft for `key` with a CA basic constraint and one SAN,
/// ready to sign.
pub fn draft_certificate(key: &KeyPair, common_name: &str) -> Certificate {
    let name = DistinguishedName::builder()
        .common_name(common_name)
        .organization("Certwright Test")
        .country("US")
        .build()
        .to_name()
        .unwrap();

    let mut cert = Certificate::new();
    cert.set_serial(4096u32.into());
    cert.set_subject(name.clone());
    cert.set_issuer(name);
    cert.set_not_before(datetime!(2026-01-01 00:00:00 UTC));
    cert.set_not_after(datetime!(2027-01-01 00:00:00 UTC));
    cert.set_public_key(key).unwrap();
    cert.add_extension(
        ExtensionEntry::from_extension(
            &BasicConstraints {
                is_ca: true,
                max_path_length: None,
            },
            true,
        )
        .unwrap(),
    )
    .unwrap();
    cert.add_extension(
        ExtensionEntry::from_extension(&SubjectAltName::dns([common_name]), false).unwrap(),
    )
    .unwrap();
    cert
}
