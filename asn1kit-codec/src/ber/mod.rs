//! BER/CER/DER framing and contents codec (ITU-T X.690)
//!
//! Each ASN.1 value is encoded as a TLV (Tag-Length-Value) triplet:
//!
//! ```text
//! [Tag] [Length] [Value]
//! ```
//!
//! ## Tag Encoding
//!
//! ```text
//! Bits: 8 7 6 5 4 3 2 1
//!       C C P T T T T T
//! ```
//! - CC = Class (00=Universal, 01=Application, 10=Context, 11=Private)
//! - P = Primitive (0) or Constructed (1)
//! - TTTTT = Tag number (0-30), or 11111 followed by base-128 octets
//!
//! ## Length Encoding
//!
//! - **Short form**: one octet, lengths 0-127
//! - **Long form**: `0x80 | n`, then `n` big-endian octets
//! - **Indefinite form**: `0x80`, constructed only, closed by `00 00`
//!
//! ## Rule Sets
//!
//! BER accepts every form above. DER allows only minimal definite lengths
//! and canonical values; CER allows canonical values with indefinite
//! lengths on constructed encodings. The checks live next to the code that
//! parses each field ([`types`], [`content`]) plus the ordering and time
//! rules in [`canonical`].
//!
//! - [`types`]: tags, lengths, headers
//! - [`decoder`]: TLV reader over a bounded region
//! - [`encoder`]: TLV writer
//! - [`content`]: primitive contents octets
//! - [`canonical`]: SET/SET OF ordering and time formats

pub mod canonical;
pub mod content;
pub mod decoder;
pub mod encoder;
pub mod types;

pub use decoder::{BerDecoder, Tlv};
pub use encoder::BerEncoder;
pub use types::{Header, Length, Tag, TagClass, read_tag_and_length};
