//! PEM / bare base64 text adapter (RFC 7468)
//!
//! ```text
//! -----BEGIN <LABEL>-----
//! <Base64-encoded data, typically 64 chars per line>
//! -----END <LABEL>-----
//! ```
//!
//! Decoding yields raw DER bytes for the schema binder; nothing here looks
//! at the ASN.1 content.

use asn1kit_core::{Asn1Error, Asn1Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const LINE_WIDTH: usize = 64;

/// A single PEM block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemBlock {
    /// The label (e.g., "CERTIFICATE", "X509 CRL")
    pub label: String,
    /// The decoded binary data
    pub data: Vec<u8>,
}

impl PemBlock {
    pub fn new(label: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            data,
        }
    }

    /// Encode to PEM text with 64-character lines
    pub fn encode(&self) -> String {
        let body = STANDARD.encode(&self.data);
        let mut result = format!("-----BEGIN {}-----\n", self.label);
        for line in body.as_bytes().chunks(LINE_WIDTH) {
            // base64 output is ASCII
            result.push_str(&String::from_utf8_lossy(line));
            result.push('\n');
        }
        result.push_str(&format!("-----END {}-----\n", self.label));
        result
    }
}

/// Decode base64 text, ignoring whitespace and any `-----` armour lines
///
/// Accepts both a bare base64 dump and a single PEM block.
pub fn read_base64_from_text(text: &str) -> Asn1Result<Vec<u8>> {
    let body: String = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("-----"))
        .flat_map(|line| line.chars().filter(|c| !c.is_whitespace()))
        .collect();
    decode_body(&body)
}

/// Decode every PEM block in `text`
///
/// # Error Handling
/// Returns `MalformedEncoding` for a BEGIN line without its END line, or a
/// body that is not valid base64.
pub fn decode_all(text: &str) -> Asn1Result<Vec<PemBlock>> {
    const BEGIN: &str = "-----BEGIN ";

    let mut blocks = Vec::new();
    let mut remaining = text;

    while let Some(begin_pos) = remaining.find(BEGIN) {
        remaining = &remaining[begin_pos + BEGIN.len()..];

        let label_end = remaining
            .find("-----")
            .ok_or_else(|| Asn1Error::MalformedEncoding("Unterminated PEM BEGIN line".to_string()))?;
        let label = remaining[..label_end].trim().to_string();
        remaining = &remaining[label_end + 5..];

        let end_marker = format!("-----END {}-----", label);
        let end_pos = remaining.find(&end_marker).ok_or_else(|| {
            Asn1Error::MalformedEncoding(format!("Missing PEM END line for {}", label))
        })?;

        let body: String = remaining[..end_pos]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let data = decode_body(&body)?;
        log::trace!("PEM block {} with {} bytes", label, data.len());
        blocks.push(PemBlock { label, data });

        remaining = &remaining[end_pos + end_marker.len()..];
    }

    Ok(blocks)
}

/// Decode the bodies of all PEM blocks carrying `label`
pub fn read_pem_blocks(text: &str, label: &str) -> Asn1Result<Vec<Vec<u8>>> {
    Ok(decode_all(text)?
        .into_iter()
        .filter(|block| block.label == label)
        .map(|block| block.data)
        .collect())
}

fn decode_body(body: &str) -> Asn1Result<Vec<u8>> {
    STANDARD
        .decode(body)
        .map_err(|e| Asn1Error::MalformedEncoding(format!("Invalid base64: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_base64_from_text() {
        let text = "  MAMC\n  AQU=\n";
        assert_eq!(read_base64_from_text(text).unwrap(), vec![0x30, 0x03, 0x02, 0x01, 0x05]);

        let armoured = "-----BEGIN THING-----\nMAMCAQU=\n-----END THING-----\n";
        assert_eq!(read_base64_from_text(armoured).unwrap(), vec![0x30, 0x03, 0x02, 0x01, 0x05]);
    }

    #[test]
    fn test_read_pem_blocks() {
        let text = concat!(
            "preamble\n",
            "-----BEGIN CERTIFICATE-----\nMAA=\n-----END CERTIFICATE-----\n",
            "-----BEGIN X509 CRL-----\nMQA=\n-----END X509 CRL-----\n",
            "-----BEGIN CERTIFICATE-----\nBQA=\n-----END CERTIFICATE-----\n",
        );
        assert_eq!(
            read_pem_blocks(text, "CERTIFICATE").unwrap(),
            vec![vec![0x30, 0x00], vec![0x05, 0x00]]
        );
        assert_eq!(read_pem_blocks(text, "X509 CRL").unwrap(), vec![vec![0x31, 0x00]]);
        assert!(read_pem_blocks(text, "PUBLIC KEY").unwrap().is_empty());
    }

    #[test]
    fn test_missing_end() {
        let text = "-----BEGIN CERTIFICATE-----\nMAA=\n";
        assert!(matches!(decode_all(text), Err(Asn1Error::MalformedEncoding(_))));
    }

    #[test]
    fn test_invalid_base64() {
        assert!(matches!(
            read_base64_from_text("not*base64"),
            Err(Asn1Error::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_encode_wraps_lines() {
        let block = PemBlock::new("CERTIFICATE", vec![0xAB; 100]);
        let text = block.encode();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "-----BEGIN CERTIFICATE-----");
        assert_eq!(lines[1].len(), 64);
        assert_eq!(lines.last().copied(), Some("-----END CERTIFICATE-----"));
        assert_eq!(decode_all(&text).unwrap(), vec![block]);
    }
}
