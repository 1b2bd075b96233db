mod util;

use std::sync::Arc;

use certwright::cert::extensions::{ExtensionEntry, SubjectAltName, ToAndFromX509Extension};
use certwright::cert::name::Name;
use certwright::cert::{Certificate, CertificateState};
use certwright::config::CertificateConfig;
use certwright::digest::MessageDigest;
use certwright::error::CertwrightError;
use certwright::key::{KeyPair, PublicKey, PublicKeyHolder};
use certwright::registry::OidTable;
use num_bigint::BigInt;
use time::macros::datetime;

fn oid_set(cert: &Certificate) -> Vec<String> {
    let mut oids: Vec<String> = cert
        .extensions()
        .iter()
        .map(|e| e.oid().to_string())
        .collect();
    oids.sort();
    oids
}

#[test]
fn signed_certificate_round_trips_through_der() {
    for (key, digest) in [
        (util::rsa_key(), MessageDigest::Sha256),
        (util::dsa_key(), MessageDigest::Sha256),
        (util::ec_key(), MessageDigest::Sha384),
    ] {
        let mut original = util::draft_certificate(&key, "roundtrip.example");
        original.sign(&key, digest).unwrap();

        let parsed = Certificate::from_der(&original.to_der().unwrap()).unwrap();
        assert_eq!(parsed.subject(), original.subject());
        assert_eq!(parsed.issuer(), original.issuer());
        assert_eq!(parsed.serial(), original.serial());
        assert_eq!(parsed.not_before(), original.not_before());
        assert_eq!(parsed.not_after(), original.not_after());
        assert_eq!(
            parsed.signed().unwrap().public_key_der().unwrap(),
            key.to_public_key().to_public_key_der().unwrap()
        );
        assert_eq!(oid_set(&parsed), oid_set(&original));
        assert!(parsed.verify(&key).unwrap());
    }
}

#[test]
fn signing_leaves_a_clean_verifiable_certificate() {
    let key = util::rsa_key();
    let mut cert = util::draft_certificate(&key, "clean.example");
    assert_eq!(cert.state(), CertificateState::Draft);

    cert.sign(&key, MessageDigest::Sha256).unwrap();
    assert!(!cert.is_dirty());
    assert_eq!(cert.state(), CertificateState::Signed);
    assert!(cert.verify(&key).unwrap());
    assert_eq!(cert.signature_algorithm(), Some("sha256WithRSAEncryption"));

    let subject = cert.subject().cloned().unwrap();
    cert.set_subject(subject);
    cert.set_serial(4096u32.into());
    assert!(!cert.is_dirty());

    let not_before = cert.not_before().unwrap();
    cert.set_not_before(not_before);
    assert!(cert.is_dirty());
}

#[test]
fn serial_zero_is_generated_as_one() {
    let key = util::ec_key();
    let mut cert = util::draft_certificate(&key, "zero.example");
    cert.set_serial(BigInt::from(0));
    assert_eq!(cert.serial(), &BigInt::from(1));

    cert.sign(&key, MessageDigest::Sha256).unwrap();
    assert_eq!(cert.signed().unwrap().serial(), BigInt::from(1));
}

#[test]
fn negative_serial_is_generated_as_its_magnitude() {
    let key = util::ec_key();
    let mut cert = util::draft_certificate(&key, "negative.example");
    cert.set_serial(BigInt::from(-77));
    cert.sign(&key, MessageDigest::Sha256).unwrap();
    assert_eq!(cert.serial(), &BigInt::from(-77));
    assert_eq!(cert.signed().unwrap().serial(), BigInt::from(77));
}

#[test]
fn subject_alt_names_accumulate_into_one_extension() {
    let key = util::ec_key();
    let mut cert = util::draft_certificate(&key, "a.example");
    for name in ["b.example", "c.example"] {
        cert.add_extension(
            ExtensionEntry::from_extension(&SubjectAltName::dns([name]), false).unwrap(),
        )
        .unwrap();
    }
    cert.sign(&key, MessageDigest::Sha256).unwrap();

    let parsed = Certificate::parse(cert.to_pem().unwrap().as_bytes()).unwrap();
    let sans: Vec<&ExtensionEntry> = parsed
        .extensions()
        .iter()
        .filter(|e| e.oid() == SubjectAltName::OID)
        .collect();
    assert_eq!(sans.len(), 1);
    assert_eq!(
        sans[0].to_extension::<SubjectAltName>().unwrap(),
        SubjectAltName::dns(["a.example", "b.example", "c.example"])
    );
}

#[test]
fn dsa_with_md5_is_refused_without_side_effects() {
    let key = util::dsa_key();
    let mut cert = util::draft_certificate(&key, "dsa.example");
    cert.sign(&key, MessageDigest::Sha256).unwrap();
    let signed_before = cert.to_der().unwrap();

    cert.set_subject(Name::parse("/CN=changed.example").unwrap());
    let err = cert.sign(&key, MessageDigest::Md5).unwrap_err();
    assert!(matches!(err, CertwrightError::UnsupportedSignatureAlgorithm(_)));
    assert!(cert.is_dirty());
    assert_eq!(cert.to_der().unwrap(), signed_before);
}

#[test]
fn rsa_with_dss1_is_refused_but_dsa_accepts_it() {
    let rsa = util::rsa_key();
    let mut cert = util::draft_certificate(&rsa, "rsa.example");
    assert!(matches!(
        cert.sign(&rsa, MessageDigest::Dss1),
        Err(CertwrightError::UnsupportedSignatureAlgorithm(_))
    ));
    assert!(cert.signed().is_none());

    let dsa = util::dsa_key();
    let mut cert = util::draft_certificate(&dsa, "dsa.example");
    cert.sign(&dsa, MessageDigest::Dss1).unwrap();
    assert!(cert.verify(&dsa).unwrap());
}

#[test]
fn edits_after_signing_make_verify_false() {
    let key = util::rsa_key();
    let mut cert = util::draft_certificate(&key, "gate.example");
    cert.sign(&key, MessageDigest::Sha256).unwrap();
    let signed = cert.to_der().unwrap();

    cert.set_subject(Name::parse("/CN=other.example").unwrap());
    assert!(!cert.verify(&key).unwrap());
    assert_eq!(cert.to_der().unwrap(), signed);

    cert.sign(&key, MessageDigest::Sha256).unwrap();
    assert!(cert.verify(&key).unwrap());
    assert_ne!(cert.to_der().unwrap(), signed);
}

#[test]
fn verify_is_false_for_foreign_keys() {
    let key = util::rsa_key();
    let mut cert = util::draft_certificate(&key, "foreign.example");
    cert.sign(&key, MessageDigest::Sha1).unwrap();

    assert!(!cert.verify(&util::rsa_other_key()).unwrap());
    assert!(!cert.verify(&util::ec_key()).unwrap());
    assert!(cert.verify(&key.to_public_key()).unwrap());
}

#[test]
fn unsigned_certificate_does_not_verify_or_serialize() {
    let key = util::ec_key();
    let cert = util::draft_certificate(&key, "unsigned.example");
    assert!(!cert.verify(&key).unwrap());
    assert!(!cert.check_private_key(&key).unwrap());
    assert_eq!(cert.to_pem(), Err(CertwrightError::NotSigned));
    assert_eq!(cert.to_text(), Err(CertwrightError::NotSigned));
}

#[test]
fn incomplete_certificate_cannot_be_signed() {
    let key = util::ec_key();
    let mut cert = Certificate::new();
    cert.set_public_key(&key).unwrap();
    cert.set_serial(7u32.into());
    assert!(matches!(
        cert.sign(&key, MessageDigest::Sha256),
        Err(CertwrightError::CertificateSigningError(_))
    ));
    assert!(cert.is_dirty());
}

#[test]
fn malformed_extension_value_aborts_signing() {
    let key = util::ec_key();
    let mut cert = util::draft_certificate(&key, "broken.example");
    cert.add_extension(ExtensionEntry::from_oid_str("1.2.3.4", false, vec![0x04, 0x09, 0x00]).unwrap())
        .unwrap();
    assert!(matches!(
        cert.sign(&key, MessageDigest::Sha256),
        Err(CertwrightError::ExtensionEncodingError(_))
    ));
    assert!(cert.is_dirty());
    assert!(cert.signed().is_none());
}

#[test]
fn holder_without_public_key_is_a_type_mismatch() {
    struct SecretOnly;

    impl PublicKeyHolder for SecretOnly {
        fn public_key(&self) -> Option<PublicKey> {
            None
        }

        fn algorithm_name(&self) -> &str {
            "HMAC"
        }
    }

    let mut cert = Certificate::new();
    assert!(matches!(
        cert.set_public_key(&SecretOnly),
        Err(CertwrightError::TypeMismatch(_))
    ));
    assert!(matches!(
        cert.check_private_key(&SecretOnly),
        Err(CertwrightError::TypeMismatch(_))
    ));
}

#[test]
fn signature_algorithm_name_falls_back_to_oid() {
    let config = CertificateConfig::default().with_oid_resolver(Arc::new(OidTable::new()));
    let key = util::ec_key();
    let draft = util::draft_certificate(&key, "table.example");

    let mut cert = Certificate::with_config(config);
    cert.set_serial(draft.serial().clone());
    cert.set_subject(draft.subject().cloned().unwrap());
    cert.set_issuer(draft.issuer().cloned().unwrap());
    cert.set_not_before(datetime!(2026-01-01 00:00:00 UTC));
    cert.set_not_after(datetime!(2026-06-01 00:00:00 UTC));
    cert.set_public_key(&key).unwrap();
    cert.sign(&key, MessageDigest::Sha256).unwrap();
    assert_eq!(cert.signature_algorithm(), Some("1.2.840.10045.4.3.2"));
}

#[test]
fn check_private_key_compares_public_halves() {
    let key = util::rsa_key();
    let mut cert = util::draft_certificate(&key, "pair.example");
    cert.sign(&key, MessageDigest::Sha512).unwrap();
    assert!(cert.check_private_key(&key).unwrap());
    assert!(!cert.check_private_key(&util::rsa_other_key()).unwrap());
}

#[test]
fn signing_with_another_key_keeps_the_subject_key() {
    let subject_key = util::ec_key();
    let issuer_key: KeyPair = util::rsa_key();
    let mut cert = util::draft_certificate(&subject_key, "issued.example");
    cert.sign(&issuer_key, MessageDigest::Sha256).unwrap();

    assert!(cert.verify(&issuer_key).unwrap());
    assert!(!cert.verify(&subject_key).unwrap());
    assert!(cert.check_private_key(&subject_key).unwrap());
}

#[test]
fn digest_without_a_dsa_signature_algorithm_fails_to_sign() {
    let key = util::dsa_key();
    let mut cert = util::draft_certificate(&key, "sha512.example");
    assert!(matches!(
        cert.sign(&key, MessageDigest::Sha512),
        Err(CertwrightError::CertificateSigningError(_))
    ));
    assert!(cert.is_dirty());
}

#[test]
fn parsed_certificate_resigns_with_its_recorded_key() {
    let key = util::rsa_key();
    let mut cert = Certificate::from_pem(util::RSA_CERT_PEM).unwrap();
    cert.set_serial_str("1001").unwrap();
    assert!(cert.is_dirty());

    cert.sign(&key, MessageDigest::Sha384).unwrap();
    assert!(!cert.is_dirty());
    assert!(cert.verify(&key).unwrap());
    assert_eq!(cert.public_key().unwrap(), key.to_public_key());

    let reparsed = Certificate::from_der(&cert.to_der().unwrap()).unwrap();
    assert_eq!(reparsed.serial(), &BigInt::from(1001));
    assert_eq!(reparsed.signature_algorithm(), Some("sha384WithRSAEncryption"));
    assert_eq!(reparsed.extensions().len(), 4);
}

#[test]
fn parsed_ec_certificate_cannot_resign_without_a_key() {
    let key = util::ec_key();
    let mut cert = Certificate::from_pem(util::EC_CERT_PEM).unwrap();
    cert.set_serial(100u32.into());
    assert_eq!(
        cert.sign(&key, MessageDigest::Sha256).unwrap_err(),
        CertwrightError::UnsupportedAlgorithm {
            algorithm: Some("EC".to_string())
        }
    );

    cert.set_public_key(&key).unwrap();
    cert.sign(&key, MessageDigest::Sha256).unwrap();
    assert!(cert.verify(&key).unwrap());
}

#[test]
fn p384_signs_and_verifies_with_sha1() {
    let key = util::ec384_key();
    let mut cert = util::draft_certificate(&key, "p384.example");
    cert.sign(&key, MessageDigest::Sha1).unwrap();
    assert_eq!(cert.signature_algorithm(), Some("1.2.840.10045.4.1"));
    assert!(cert.verify(&key).unwrap());

    let parsed = Certificate::from_der(&cert.to_der().unwrap()).unwrap();
    assert!(parsed.verify(&key).unwrap());
    assert!(!parsed.verify(&util::ec_key()).unwrap());
}

#[test]
fn openssl_signed_p384_sha1_certificate_verifies() {
    let cert = Certificate::from_pem(util::EC384_SHA1_CERT_PEM).unwrap();
    assert_eq!(cert.serial(), &BigInt::from(384));
    assert_eq!(cert.signature_algorithm(), Some("1.2.840.10045.4.1"));
    assert!(cert.verify(&util::ec384_key()).unwrap());
    assert!(cert.check_private_key(&util::ec384_key()).unwrap());
}
