//! Message digests that can be paired with a key to sign a certificate.

use core::fmt;
use core::str::FromStr;

use sha2::Digest;

use crate::error::CertwrightError;

/// A digest algorithm, named the way OpenSSL names it.
///
/// `Dss1` is the legacy name for SHA-1 when used with DSA keys. It hashes
/// exactly like `Sha1` but keeps its own [`name`](Self::name) so signers can
/// refuse it for RSA keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageDigest {
    Md5,
    Sha1,
    Dss1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl MessageDigest {
    /// Full name of the digest, e.g. `"DSS1"`.
    pub fn name(&self) -> &'static str {
        match self {
            MessageDigest::Md5 => "MD5",
            MessageDigest::Sha1 => "SHA1",
            MessageDigest::Dss1 => "DSS1",
            MessageDigest::Sha224 => "SHA224",
            MessageDigest::Sha256 => "SHA256",
            MessageDigest::Sha384 => "SHA384",
            MessageDigest::Sha512 => "SHA512",
        }
    }

    /// Name of the underlying hash, used to build signature algorithm names
    /// such as `SHA256WITHRSA`.
    pub fn short_name(&self) -> &'static str {
        match self {
            MessageDigest::Dss1 => "SHA1",
            other => other.name(),
        }
    }

    /// Output length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            MessageDigest::Md5 => 16,
            MessageDigest::Sha1 | MessageDigest::Dss1 => 20,
            MessageDigest::Sha224 => 28,
            MessageDigest::Sha256 => 32,
            MessageDigest::Sha384 => 48,
            MessageDigest::Sha512 => 64,
        }
    }

    /// Hashes `data` in one shot.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            MessageDigest::Md5 => md5::Md5::digest(data).to_vec(),
            MessageDigest::Sha1 | MessageDigest::Dss1 => sha1::Sha1::digest(data).to_vec(),
            MessageDigest::Sha224 => sha2::Sha224::digest(data).to_vec(),
            MessageDigest::Sha256 => sha2::Sha256::digest(data).to_vec(),
            MessageDigest::Sha384 => sha2::Sha384::digest(data).to_vec(),
            MessageDigest::Sha512 => sha2::Sha512::digest(data).to_vec(),
        }
    }
}

impl fmt::Display for MessageDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MessageDigest {
    type Err = CertwrightError;

    /// Accepts OpenSSL style names case-insensitively (`sha256`, `SHA-256`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "MD5" => Ok(MessageDigest::Md5),
            "SHA1" => Ok(MessageDigest::Sha1),
            "DSS1" => Ok(MessageDigest::Dss1),
            "SHA224" => Ok(MessageDigest::Sha224),
            "SHA256" => Ok(MessageDigest::Sha256),
            "SHA384" => Ok(MessageDigest::Sha384),
            "SHA512" => Ok(MessageDigest::Sha512),
            _ => Err(CertwrightError::InvalidInput(format!(
                "unknown digest algorithm '{s}'"
            ))),
        }
    }
}
