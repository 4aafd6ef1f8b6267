//! Canonical-form rules shared by DER and CER
//!
//! - SET members appear in ascending tag order (X.690 10.3 / 9.3)
//! - SET OF elements appear in ascending order of their encodings, the
//!   shorter one padded with trailing zero octets (X.690 11.6)
//! - UTCTime and GeneralizedTime use the restricted forms of X.690 11.7 / 11.8

use crate::ber::types::{Tag, read_tag_and_length};
use asn1kit_core::{Asn1Error, Asn1Result, EncodingRules};
use regex::bytes::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static UTC_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{12}Z$").expect("valid UTCTime pattern"));

static GENERALIZED_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{14}(\.[0-9]*[1-9])?Z$").expect("valid GeneralizedTime pattern")
});

/// Compare two SET OF element encodings in X.690 11.6 order
pub fn compare_set_of(a: &[u8], b: &[u8]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Sort SET OF element encodings into canonical order
pub fn sort_set_of(encodings: &mut [Vec<u8>]) {
    encodings.sort_by(|a, b| compare_set_of(a, b));
}

/// Check that SET OF element encodings are in canonical order
pub fn check_set_of_order(previous: &[u8], current: &[u8]) -> Asn1Result<()> {
    if compare_set_of(previous, current) == Ordering::Greater {
        return Err(Asn1Error::NonCanonicalEncoding(
            "SET OF elements are not in ascending order".to_string(),
        ));
    }
    Ok(())
}

/// Sort encoded SET members by their outer tag
pub fn sort_set_members(members: &mut [Vec<u8>]) -> Asn1Result<()> {
    let mut keyed = Vec::with_capacity(members.len());
    for member in members.iter() {
        keyed.push(outer_tag(member)?);
    }
    let mut order: Vec<usize> = (0..members.len()).collect();
    order.sort_by_key(|&i| keyed[i]);

    let mut sorted: Vec<Vec<u8>> = order.iter().map(|&i| std::mem::take(&mut members[i])).collect();
    members.swap_with_slice(&mut sorted);
    Ok(())
}

/// Check that a SET member tag follows the previous one in canonical order
pub fn check_set_member_order(previous: Tag, current: Tag) -> Asn1Result<()> {
    if current <= previous {
        return Err(Asn1Error::NonCanonicalEncoding(format!(
            "SET member {} follows {}; members must be in ascending tag order",
            current, previous
        )));
    }
    Ok(())
}

/// Check the restricted time formats required by canonical rules
///
/// `generalized` selects GeneralizedTime, otherwise UTCTime. Under BER any
/// contents are accepted.
pub fn check_time(content: &[u8], generalized: bool, rules: EncodingRules) -> Asn1Result<()> {
    if !rules.is_canonical() {
        return Ok(());
    }
    let (pattern, name) = if generalized {
        (&*GENERALIZED_TIME, "GeneralizedTime")
    } else {
        (&*UTC_TIME, "UTCTime")
    };
    if !pattern.is_match(content) {
        return Err(Asn1Error::NonCanonicalEncoding(format!(
            "{} {:?} is not in the form required by {}",
            name,
            String::from_utf8_lossy(content),
            rules
        )));
    }
    Ok(())
}

fn outer_tag(encoding: &[u8]) -> Asn1Result<Tag> {
    Ok(read_tag_and_length(encoding, EncodingRules::Ber)?.tag)
}
