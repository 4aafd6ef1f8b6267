use thiserror::Error;

/// Main error type for asn1kit operations
///
/// Every decode or encode failure surfaces as exactly one of these variants.
/// Decoding is deterministic, so none of them is retryable: a failure
/// anywhere in the tree aborts the whole call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Asn1Error {
    /// Truncated tag/length header or otherwise unparseable structure
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    /// Valid BER that violates the canonical form required by DER/CER
    #[error("Non-canonical encoding: {0}")]
    NonCanonicalEncoding(String),

    /// Declared length exceeds the available bytes or the enclosing region
    #[error("Truncated content: {0}")]
    TruncatedContent(String),

    /// No CHOICE alternative carries the tag found on the wire
    #[error("No matching alternative: {0}")]
    NoMatchingAlternative(String),

    /// Encoding or value does not fit the schema
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Malformed object identifier
    #[error("Invalid object identifier: {0}")]
    InvalidOid(String),

    /// Value violates the constraints of its type
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Nesting depth or declared length above the configured limit
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
}

/// Fieldless discriminant of [`Asn1Error`], convenient for matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedEncoding,
    NonCanonicalEncoding,
    TruncatedContent,
    NoMatchingAlternative,
    SchemaMismatch,
    InvalidOid,
    InvalidValue,
    LimitExceeded,
}

impl Asn1Error {
    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Asn1Error::MalformedEncoding(_) => ErrorKind::MalformedEncoding,
            Asn1Error::NonCanonicalEncoding(_) => ErrorKind::NonCanonicalEncoding,
            Asn1Error::TruncatedContent(_) => ErrorKind::TruncatedContent,
            Asn1Error::NoMatchingAlternative(_) => ErrorKind::NoMatchingAlternative,
            Asn1Error::SchemaMismatch(_) => ErrorKind::SchemaMismatch,
            Asn1Error::InvalidOid(_) => ErrorKind::InvalidOid,
            Asn1Error::InvalidValue(_) => ErrorKind::InvalidValue,
            Asn1Error::LimitExceeded(_) => ErrorKind::LimitExceeded,
        }
    }
}

/// Result type alias for asn1kit operations
pub type Asn1Result<T> = Result<T, Asn1Error>;
