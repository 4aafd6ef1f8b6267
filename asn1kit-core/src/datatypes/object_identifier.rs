use crate::error::{Asn1Error, Asn1Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static DOTTED_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)+$").expect("valid OID pattern"));

/// ASN.1 OBJECT IDENTIFIER
///
/// An OID is a sequence of non-negative arcs, e.g. `1.2.840.113549.1.1.11`.
/// The first arc is 0, 1 or 2; below 0 and 1 the second arc is less than 40.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "ObjectIdentifierRepr")]
pub struct ObjectIdentifier {
    arcs: Vec<u64>,
}

#[derive(Deserialize)]
struct ObjectIdentifierRepr {
    arcs: Vec<u64>,
}

impl TryFrom<ObjectIdentifierRepr> for ObjectIdentifier {
    type Error = Asn1Error;

    fn try_from(repr: ObjectIdentifierRepr) -> Asn1Result<Self> {
        Self::new(repr.arcs)
    }
}

impl ObjectIdentifier {
    /// Create an OID from its arcs
    ///
    /// # Errors
    ///
    /// Returns `InvalidOid` if there are fewer than two arcs or the first two
    /// arcs cannot be combined as `40 * X + Y`.
    pub fn new(arcs: Vec<u64>) -> Asn1Result<Self> {
        if arcs.len() < 2 {
            return Err(Asn1Error::InvalidOid(format!(
                "Object identifier needs at least 2 arcs, got {}",
                arcs.len()
            )));
        }
        if arcs[0] > 2 {
            return Err(Asn1Error::InvalidOid(format!(
                "First arc must be 0, 1 or 2, got {}",
                arcs[0]
            )));
        }
        if arcs[0] < 2 && arcs[1] >= 40 {
            return Err(Asn1Error::InvalidOid(format!(
                "Second arc must be below 40 under {}, got {}",
                arcs[0], arcs[1]
            )));
        }
        if arcs[0] == 2 && arcs[1] > u64::MAX - 80 {
            return Err(Asn1Error::InvalidOid("Second arc too large".to_string()));
        }
        Ok(Self { arcs })
    }

    /// Parse an OID from its dotted form, e.g. "1.2.840.113549"
    pub fn from_string(s: &str) -> Asn1Result<Self> {
        if !DOTTED_FORM.is_match(s) {
            return Err(Asn1Error::InvalidOid(format!(
                "Invalid object identifier format: {}",
                s
            )));
        }

        let arcs = s
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| Asn1Error::InvalidOid(format!("Invalid arc value: {}", part)))
            })
            .collect::<Asn1Result<Vec<_>>>()?;
        Self::new(arcs)
    }

    /// Get the arcs
    pub fn arcs(&self) -> &[u64] {
        &self.arcs
    }
}

impl FromStr for ObjectIdentifier {
    type Err = Asn1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.arcs.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oid_from_string() {
        let oid = ObjectIdentifier::from_string("1.2.840.113549.1.1.11").unwrap();
        assert_eq!(oid.arcs(), &[1, 2, 840, 113549, 1, 1, 11]);
        assert_eq!(oid.to_string(), "1.2.840.113549.1.1.11");
    }

    #[test]
    fn test_oid_rejects_bad_format() {
        for s in ["", "1", "1..2", "1.2.", "a.b", "1.2.-3"] {
            assert!(
                matches!(ObjectIdentifier::from_string(s), Err(Asn1Error::InvalidOid(_))),
                "accepted {:?}",
                s
            );
        }
    }

    #[test]
    fn test_oid_arc_rules() {
        assert!(ObjectIdentifier::new(vec![3, 1]).is_err());
        assert!(ObjectIdentifier::new(vec![1, 40]).is_err());
        assert!(ObjectIdentifier::new(vec![2, 999, 3]).is_ok());
    }

    #[test]
    fn test_oid_deserialize_validates() {
        let oid: ObjectIdentifier = serde_json::from_str(r#"{"arcs":[2,5,29,19]}"#).unwrap();
        assert_eq!(oid.to_string(), "2.5.29.19");

        for json in [r#"{"arcs":[]}"#, r#"{"arcs":[1]}"#, r#"{"arcs":[1,40]}"#, r#"{"arcs":[3,1]}"#] {
            assert!(serde_json::from_str::<ObjectIdentifier>(json).is_err(), "accepted {}", json);
        }
    }
}
