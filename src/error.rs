//! use certwright::error::CertwrightError;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CertwrightError>;

/// Represents errors that can occur while building, parsing, signing or
/// verifying certificates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CertwrightError {
    /// Input bytes could not be decoded as an X.509 certificate.
    #[error("Failed to decode certificate: {0}")]
    CertificateDecodeError(String),

    /// A value did not provide the capability an operation requires.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Public key algorithm cannot be turned into a key object.
    #[error("unsupported algorithm{}", describe_algorithm(.algorithm))]
    UnsupportedAlgorithm { algorithm: Option<String> },

    /// Key and digest cannot be combined into a signature algorithm.
    #[error("signature_algorithm not supported: {0}")]
    UnsupportedSignatureAlgorithm(String),

    /// An extension value could not be encoded.
    #[error("Failed to encode extension: {0}")]
    ExtensionEncodingError(String),

    /// The certificate could not be generated or signed.
    #[error("Failed to sign certificate: {0}")]
    CertificateSigningError(String),

    /// Signature verification could not be set up.
    #[error("Failed to set up verification: {0}")]
    VerificationSetupError(String),

    /// The certificate has never been signed or parsed.
    #[error("Certificate has not been signed")]
    NotSigned,

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

fn describe_algorithm(algorithm: &Option<String>) -> String {
    match algorithm {
        Some(name) => format!(" '{name}'"),
        None => String::new(),
    }
}

impl From<der::Error> for CertwrightError {
    /// Converts a `der::Error` into a `CertwrightError`.
    fn from(err: der::Error) -> Self {
        CertwrightError::DecodingError(err.to_string())
    }
}

impl From<pkcs8::Error> for CertwrightError {
    fn from(err: pkcs8::Error) -> Self {
        CertwrightError::DecodingError(err.to_string())
    }
}

impl From<pkcs8::spki::Error> for CertwrightError {
    fn from(err: pkcs8::spki::Error) -> Self {
        CertwrightError::DecodingError(err.to_string())
    }
}

impl From<pem::PemError> for CertwrightError {
    fn from(err: pem::PemError) -> Self {
        CertwrightError::DecodingError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_algorithm_names_the_algorithm_when_known() {
        let known = CertwrightError::UnsupportedAlgorithm {
            algorithm: Some("EC".to_string()),
        };
        assert_eq!(known.to_string(), "unsupported algorithm 'EC'");

        let unknown = CertwrightError::UnsupportedAlgorithm { algorithm: None };
        assert_eq!(unknown.to_string(), "unsupported algorithm");
    }
}
