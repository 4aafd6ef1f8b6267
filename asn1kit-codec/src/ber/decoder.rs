//! BER TLV reader
//!
//! [`BerDecoder`] walks one content region (a whole input buffer, or the
//! contents of a constructed encoding) TLV by TLV. It frames elements only;
//! interpreting contents is the job of [`crate::ber::content`] and the
//! schema binder.
//!
//! # Usage Example
//!
//! ```rust
//! use asn1kit_codec::ber::{BerDecoder, Tag};
//! use asn1kit_core::CodecConfig;
//!
//! let data = [0x02, 0x01, 0x05, 0xFF];
//! let config = CodecConfig::der();
//! let mut decoder = BerDecoder::new(&data, &config);
//! let tlv = decoder.read_tlv().unwrap();
//! assert_eq!(tlv.header.tag, Tag::INTEGER);
//! assert_eq!(tlv.content, &[0x05]);
//! assert_eq!(decoder.rest(), &[0xFF]);
//! ```

use crate::ber::types::{Header, Length, read_tag_and_length};
use asn1kit_core::{Asn1Error, Asn1Result, CodecConfig};

/// One framed TLV borrowed from the region being decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tlv<'a> {
    pub header: Header,
    /// Contents octets (for indefinite length: everything before the
    /// end-of-contents marker)
    pub content: &'a [u8],
    /// The complete encoding including header and end-of-contents marker
    pub encoded: &'a [u8],
}

/// BER TLV reader over one content region
///
/// # Position Tracking
///
/// The decoder maintains a position pointer that advances as TLVs are read.
/// The region never grows: an element whose declared length runs past the
/// end of the region is reported as `TruncatedContent`, even when the
/// underlying input buffer has more bytes.
pub struct BerDecoder<'a> {
    buffer: &'a [u8],
    position: usize,
    config: CodecConfig,
}

impl<'a> BerDecoder<'a> {
    /// Create a new BER decoder over `buffer`
    pub fn new(buffer: &'a [u8], config: &CodecConfig) -> Self {
        Self {
            buffer,
            position: 0,
            config: *config,
        }
    }

    /// Get current position in the region
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get remaining byte count
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Check if there is more data to decode
    pub fn has_remaining(&self) -> bool {
        self.position < self.buffer.len()
    }

    /// Get the unconsumed suffix of the region
    pub fn rest(&self) -> &'a [u8] {
        &self.buffer[self.position..]
    }

    /// Get the whole region
    pub fn region(&self) -> &'a [u8] {
        self.buffer
    }

    /// Decode the next header without consuming it
    pub fn peek_header(&self) -> Asn1Result<Header> {
        read_tag_and_length(self.rest(), self.config.rules)
    }

    /// Decode the next header and advance to the start of its contents
    pub fn read_header(&mut self) -> Asn1Result<Header> {
        let header = self.peek_header()?;
        self.position += header.header_len;
        Ok(header)
    }

    /// Decode the next TLV and advance past it
    ///
    /// # Error Handling
    /// - Header errors from [`read_tag_and_length`]
    /// - `LimitExceeded` if the declared length is above `max_length`
    /// - `TruncatedContent` if the contents run past the region, or an
    ///   indefinite-length encoding has no end-of-contents marker
    pub fn read_tlv(&mut self) -> Asn1Result<Tlv<'a>> {
        let start = self.position;
        let header = self.peek_header()?;
        let content_start = start + header.header_len;

        let (content_len, total_len) = match header.length {
            Length::Definite(length) => {
                if length > self.config.max_length {
                    return Err(Asn1Error::LimitExceeded(format!(
                        "Declared length {} of {} exceeds limit {}",
                        length, header.tag, self.config.max_length
                    )));
                }
                let available = self.buffer.len() - content_start;
                if length > available {
                    return Err(Asn1Error::TruncatedContent(format!(
                        "{} declares {} content bytes, only {} available",
                        header.tag, length, available
                    )));
                }
                (length, header.header_len + length)
            }
            Length::Indefinite => {
                let content_len =
                    find_end_of_contents(&self.buffer[content_start..], &self.config, 1)?;
                (content_len, header.header_len + content_len + 2)
            }
        };

        self.position = start + total_len;
        Ok(Tlv {
            header,
            content: &self.buffer[content_start..content_start + content_len],
            encoded: &self.buffer[start..start + total_len],
        })
    }

    /// Skip a TLV (useful for skipping unknown fields)
    ///
    /// # Returns
    /// Returns the number of bytes skipped.
    pub fn skip_tlv(&mut self) -> Asn1Result<usize> {
        Ok(self.read_tlv()?.encoded.len())
    }
}

/// Locate the end-of-contents marker closing an indefinite-length encoding
///
/// `data` starts right after the indefinite length octet. Returns the length
/// of the contents, not counting the marker itself. Nested indefinite
/// encodings are followed recursively up to `max_depth`.
fn find_end_of_contents(data: &[u8], config: &CodecConfig, depth: usize) -> Asn1Result<usize> {
    if depth > config.max_depth {
        return Err(Asn1Error::LimitExceeded(format!(
            "Indefinite-length nesting deeper than {}",
            config.max_depth
        )));
    }

    let mut pos = 0;
    loop {
        let rest = &data[pos..];
        if rest.len() < 2 {
            return Err(Asn1Error::TruncatedContent(
                "Missing end-of-contents marker".to_string(),
            ));
        }
        let header = read_tag_and_length(rest, config.rules)?;
        if header.is_end_of_contents() {
            return Ok(pos);
        }
        if header.tag == crate::ber::types::Tag::END_OF_CONTENTS {
            return Err(Asn1Error::MalformedEncoding(
                "Malformed end-of-contents marker".to_string(),
            ));
        }

        let body = &rest[header.header_len..];
        let consumed = match header.length {
            Length::Definite(length) => {
                if length > body.len() {
                    return Err(Asn1Error::TruncatedContent(format!(
                        "{} declares {} content bytes, only {} available",
                        header.tag,
                        length,
                        body.len()
                    )));
                }
                length
            }
            Length::Indefinite => find_end_of_contents(body, config, depth + 1)? + 2,
        };
        pos += header.header_len + consumed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::types::Tag;

    #[test]
    fn test_read_tlv_definite() {
        let data = [0x30, 0x03, 0x02, 0x01, 0x07, 0x05, 0x00];
        let config = CodecConfig::der();
        let mut decoder = BerDecoder::new(&data, &config);

        let tlv = decoder.read_tlv().unwrap();
        assert_eq!(tlv.header.tag, Tag::SEQUENCE);
        assert_eq!(tlv.content, &[0x02, 0x01, 0x07]);
        assert_eq!(tlv.encoded.len(), 5);
        assert_eq!(decoder.rest(), &[0x05, 0x00]);

        assert_eq!(decoder.skip_tlv().unwrap(), 2);
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn test_read_header_enters_contents() {
        let data = [0x30, 0x03, 0x02, 0x01, 0x07];
        let config = CodecConfig::der();
        let mut decoder = BerDecoder::new(&data, &config);

        let header = decoder.read_header().unwrap();
        assert!(header.constructed);
        assert_eq!(header.length, Length::Definite(3));
        assert_eq!(decoder.position(), 2);
        assert_eq!(decoder.read_tlv().unwrap().content, &[0x07]);
    }

    #[test]
    fn test_read_tlv_indefinite() {
        // SEQUENCE (indefinite) { SEQUENCE (indefinite) { INTEGER 1 } } then NULL
        let data = [
            0x30, 0x80, 0x30, 0x80, 0x02, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x05, 0x00,
        ];
        let config = CodecConfig::ber();
        let mut decoder = BerDecoder::new(&data, &config);

        let tlv = decoder.read_tlv().unwrap();
        assert_eq!(tlv.header.length, Length::Indefinite);
        assert_eq!(tlv.content, &data[2..9]);
        assert_eq!(tlv.encoded, &data[..11]);
        assert_eq!(decoder.rest(), &[0x05, 0x00]);
    }

    #[test]
    fn test_read_tlv_indefinite_rejected_under_der() {
        let data = [0x30, 0x80, 0x00, 0x00];
        let config = CodecConfig::der();
        let mut decoder = BerDecoder::new(&data, &config);
        assert!(matches!(
            decoder.read_tlv(),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));
    }

    #[test]
    fn test_read_tlv_missing_end_of_contents() {
        let data = [0x30, 0x80, 0x02, 0x01, 0x01];
        let config = CodecConfig::ber();
        let mut decoder = BerDecoder::new(&data, &config);
        assert!(matches!(
            decoder.read_tlv(),
            Err(Asn1Error::TruncatedContent(_))
        ));
    }

    #[test]
    fn test_read_tlv_overrun() {
        let data = [0x04, 0x05, 0x01, 0x02];
        let config = CodecConfig::der();
        let mut decoder = BerDecoder::new(&data, &config);
        assert!(matches!(
            decoder.read_tlv(),
            Err(Asn1Error::TruncatedContent(_))
        ));
        assert_eq!(decoder.position(), 0);
    }

    #[test]
    fn test_read_tlv_length_limit() {
        let data = [0x04, 0x82, 0x01, 0x00];
        let config = CodecConfig::builder().max_length(255).build().unwrap();
        let mut decoder = BerDecoder::new(&data, &config);
        assert!(matches!(
            decoder.read_tlv(),
            Err(Asn1Error::LimitExceeded(_))
        ));
    }
}
