use crate::error::{CertwrightError, Result};

/// PEM labels accepted for certificates.
pub const CERTIFICATE_LABELS: [&str; 2] = ["CERTIFICATE", "X509 CERTIFICATE"];

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Convert a PEM‑encoded string to DER‑encoded bytes.
pub fn pem_to_der(pem_str: &str) -> Result<Vec<u8>> {
    let pem = pem::parse(pem_str)?;
    Ok(pem.contents().to_vec())
}

/// Strips PEM framing from `input` if present.
///
/// Input with no PEM header anywhere in it is assumed to be DER and returned
/// unchanged. Text before the first header, such as the `subject=` lines
/// `openssl x509` prints, is skipped. A PEM block whose label is not one of
/// `labels` is rejected.
pub fn read_possible_pem(input: &[u8], labels: &[&str]) -> Result<Vec<u8>> {
    const PEM_HEADER: &[u8] = b"-----BEGIN ";
    let Some(start) = input
        .windows(PEM_HEADER.len())
        .position(|window| window == PEM_HEADER)
    else {
        return Ok(input.to_vec());
    };
    let pem = pem::parse(&input[start..])?;
    if !labels.contains(&pem.tag()) {
        return Err(CertwrightError::DecodingError(format!(
            "unexpected PEM label {}",
            pem.tag()
        )));
    }
    Ok(pem.contents().to_vec())
}
